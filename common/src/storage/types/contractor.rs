use uuid::Uuid;

use crate::{error::AppError, storage::db::SurrealDbClient, stored_object};

stored_object!(Contractor, "contractor", {
    name: String,
    bid_package_id: String,
    store_handle: Option<String>
});

impl Contractor {
    pub fn new(name: String, bid_package_id: String) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            name,
            bid_package_id,
            store_handle: None,
        }
    }

    pub async fn get_by_bid_package(
        bid_package_id: &str,
        db: &SurrealDbClient,
    ) -> Result<Vec<Self>, AppError> {
        let contractors: Vec<Self> = db
            .client
            .query("SELECT * FROM contractor WHERE bid_package_id = $bid_package_id")
            .bind(("bid_package_id", bid_package_id.to_string()))
            .await?
            .take(0)?;

        Ok(contractors)
    }

    /// Compare-and-set of the store handle: the write only lands while the
    /// field is still absent, so of two racing store creations exactly one
    /// wins. Returns whether this call was the winner.
    pub async fn set_store_handle_if_absent(
        id: &str,
        handle: &str,
        db: &SurrealDbClient,
    ) -> Result<bool, AppError> {
        let updated: Vec<Self> = db
            .client
            .query(
                "UPDATE type::thing('contractor', $id) \
                 SET store_handle = $handle, updated_at = time::now() \
                 WHERE store_handle IS NONE RETURN AFTER",
            )
            .bind(("id", id.to_string()))
            .bind(("handle", handle.to_string()))
            .await?
            .take(0)?;

        Ok(!updated.is_empty())
    }
}
