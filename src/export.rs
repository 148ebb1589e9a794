use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::secure_store::SecureStore;
use crate::segments::MASTER_RECORD_KEY;
use crate::storage::StorageBackend;

/// Downloadable JSON document wrapping the full master record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportDocument {
    pub version: String,
    #[serde(rename = "exportDate")]
    pub export_date: DateTime<Utc>,
    pub data: Map<String, Value>,
}

impl ExportDocument {
    pub fn new(data: Map<String, Value>) -> Self {
        ExportDocument {
            version: "1.0".to_string(),
            export_date: Utc::now(),
            data,
        }
    }

    /// Build the export from the stored master record. None when no
    /// assessment data exists yet.
    pub fn from_store<B: StorageBackend>(store: &SecureStore<B>) -> Option<Self> {
        let master = store.get(MASTER_RECORD_KEY, "")?;
        Some(ExportDocument::new(master.as_object()?.clone()))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
