use uuid::Uuid;

use crate::stored_object;

// A named, reusable list of evaluation prompts.
stored_object!(CriteriaSet, "criteria_set", {
    name: String,
    prompts: Vec<String>
});

impl CriteriaSet {
    pub fn new(name: String, prompts: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
            name,
            prompts,
        }
    }
}
