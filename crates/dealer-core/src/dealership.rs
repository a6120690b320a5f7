//! # Dealership Documents
//!
//! Only the fields the service filters on are typed. Descriptive fields
//! (name, address, coordinates, ...) ride along in `details` untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::identity::{DealerNumericId, StoreId};

/// Collection holding dealership documents.
pub const DEALERSHIPS: &str = "dealerships";

/// A dealership as stored and served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dealership {
    #[serde(rename = "_id")]
    pub store_id: StoreId,
    pub id: DealerNumericId,
    pub state: String,
    #[serde(flatten)]
    pub details: Map<String, Value>,
}

impl Dealership {
    /// Decode a stored document.
    pub fn from_document(doc: Map<String, Value>) -> Result<Self, CoreError> {
        Ok(serde_json::from_value(Value::Object(doc))?)
    }

    /// Check a fixture entry and return the document to store.
    ///
    /// Everything but `_id` must decode as a dealership: an integer `id`
    /// and a string `state`. Descriptive fields pass through unchanged.
    pub fn fixture_document(mut doc: Map<String, Value>) -> Result<Map<String, Value>, CoreError> {
        #[derive(Deserialize)]
        struct Fields {
            id: DealerNumericId,
            state: String,
            #[serde(flatten)]
            details: Map<String, Value>,
        }

        let store_id = doc.remove("_id");
        let Fields { id, state, mut details } = serde_json::from_value(Value::Object(doc))?;
        details.insert("id".to_string(), Value::from(id.0));
        details.insert("state".to_string(), Value::String(state));
        if let Some(store_id) = store_id {
            details.insert("_id".to_string(), store_id);
        }
        Ok(details)
    }
}
