//! ORM registry configuration.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct OrmConfig {
    /// Path to a TOML catalog of additional ORM descriptors.
    pub custom_descriptors: Option<String>,
    /// Built-in descriptors to disable, by ORM name.
    pub disabled: Vec<String>,
}

impl OrmConfig {
    pub fn is_disabled(&self, orm: &str) -> bool {
        self.disabled.iter().any(|d| d.eq_ignore_ascii_case(orm))
    }
}
