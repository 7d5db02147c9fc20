use serde::{Deserialize, Serialize};

use equipstock_core::{LocationId, ValueObject};

/// A location as reported by the external location service.
///
/// Read-only to this system and never cached: it is fetched on every
/// validation or enrichment path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRef {
    pub id: LocationId,
    #[serde(alias = "display_name", alias = "displayName", alias = "nombre")]
    pub name: String,
}

impl ValueObject for LocationRef {}

impl LocationRef {
    pub fn new(id: LocationId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}
