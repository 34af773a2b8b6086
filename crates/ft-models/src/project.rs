//! Project reference model

use serde::{Deserialize, Serialize};

/// Project reference row, mirrored locally for display names
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Project {
    pub project_id: i64,
    pub name: String,
}

impl Project {
    pub fn new(project_id: i64, name: impl Into<String>) -> Self {
        Self {
            project_id,
            name: name.into(),
        }
    }
}
