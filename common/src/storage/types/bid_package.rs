use uuid::Uuid;

use crate::stored_object;

stored_object!(BidPackage, "bid_package", {
    name: String,
    description: Option<String>
});

impl BidPackage {
    pub fn new(name: String, description: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            name,
            description,
        }
    }
}
