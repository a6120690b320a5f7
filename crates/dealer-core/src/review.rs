//! # Review Documents

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::CoreError;
use crate::identity::{ReviewId, StoreId};

/// Collection holding review documents.
pub const REVIEWS: &str = "reviews";

/// Reference from a review to a dealership's numeric id.
///
/// Fixtures and clients send either a number or a numeric string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DealerRef {
    Numeric(i64),
    Text(String),
}

impl DealerRef {
    /// Textual form used for dealer filtering; `15` and `"15"` both give `"15"`.
    pub fn as_text(&self) -> String {
        match self {
            Self::Numeric(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }

    /// Store numeric strings as numbers.
    pub fn normalized(self) -> Self {
        match self {
            Self::Text(s) => match s.trim().parse::<i64>() {
                Ok(n) => Self::Numeric(n),
                Err(_) => Self::Text(s),
            },
            numeric => numeric,
        }
    }
}

impl fmt::Display for DealerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

/// Review content as submitted by a client.
///
/// `name`, `dealership`, `review` and `purchase` must be present; unknown
/// fields are dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewReview {
    pub name: String,
    pub dealership: DealerRef,
    pub review: String,
    pub purchase: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_make: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_model: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_year: Option<i64>,
}

impl NewReview {
    /// Parse a raw request body.
    pub fn from_json(body: &[u8]) -> Result<Self, CoreError> {
        let mut review: Self = serde_json::from_slice(body)?;
        review.dealership = review.dealership.normalized();
        Ok(review)
    }

    /// Document to insert, carrying the assigned review id. The store adds `_id`.
    pub fn into_document(self, id: ReviewId) -> Result<Map<String, Value>, CoreError> {
        match serde_json::to_value(self)? {
            Value::Object(mut map) => {
                map.insert("id".to_string(), Value::from(id.0));
                Ok(map)
            }
            _ => Err(CoreError::NotAnObject(REVIEWS)),
        }
    }
}

/// A stored review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(rename = "_id")]
    pub store_id: StoreId,
    pub id: ReviewId,
    #[serde(flatten)]
    pub content: NewReview,
}

impl Review {
    /// Decode a stored document.
    pub fn from_document(doc: Map<String, Value>) -> Result<Self, CoreError> {
        Ok(serde_json::from_value(Value::Object(doc))?)
    }

    /// Check a fixture entry and return the document to store.
    ///
    /// Everything but `_id` must decode as a review; `_id` is carried over
    /// as given. Unknown fields are dropped and a numeric-string
    /// `dealership` becomes a number.
    pub fn fixture_document(mut doc: Map<String, Value>) -> Result<Map<String, Value>, CoreError> {
        #[derive(Deserialize)]
        struct Fields {
            id: ReviewId,
            #[serde(flatten)]
            content: NewReview,
        }

        let store_id = doc.remove("_id");
        let Fields { id, content } = serde_json::from_value(Value::Object(doc))?;
        let content = NewReview {
            dealership: content.dealership.normalized(),
            ..content
        };

        let mut stored = content.into_document(id)?;
        if let Some(store_id) = store_id {
            stored.insert("_id".to_string(), store_id);
        }
        Ok(stored)
    }
}
