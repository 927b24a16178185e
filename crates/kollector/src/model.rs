//! # Domain Model: Collectibles and Their Wire Format
//!
//! This module defines [`Collectible`] and its parts, plus the decoding rules that
//! turn whatever the lookup service (or an older on-disk file) hands us into a
//! canonical value.
//!
//! ## The Problem
//!
//! The recognition backend is loose about its payloads:
//! - Array fields are sometimes `null`, sometimes missing, sometimes `[]`.
//! - The estimated value range mixes numbers, numeric strings and `null`s.
//! - Older records only carry a scalar `estimatedValue` string.
//!
//! Code downstream (display formatting, stores) should never have to care.
//!
//! ## Decoding Rules
//!
//! 1. **Nullable arrays**: `gallery`, `relatedSubjects`, `productionStatus` and
//!    `userPhotos` decode `null` or absent as an empty list.
//! 2. **Positional range**: `estimatedValueRange` keeps one slot per raw element.
//!    Numbers and numeric strings become `Some(n)`, everything else becomes a
//!    hole (`None`). Holes are never dropped: `[null, 25]` is *not* `[25]`.
//! 3. **Ownership flag**: `inCollection` defaults to `true`.
//! 4. **Unknown subject tags** decode as [`SubjectKind::Other`] instead of failing.
//!
//! ## Wire Shape
//!
//! ```text
//! {
//!   "id": "abc",
//!   "attributes": {
//!     "name": "...",
//!     "images": { "main": "...", "search": "...", "searchNoBg": "...", "gallery": [] },
//!     "estimatedValue": "40",
//!     "estimatedValueRange": [12, null],
//!     "relatedSubjects": [{ "name": "...", "type": "ai_classified" }],
//!     "productionDate": "2019", "productionStatus": ["Vaulted"], "refNumber": "#01"
//!   },
//!   "customAttributes": { "purchasePrice": 10.0, "sale": { "sold": true } },
//!   "inCollection": true
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::normalize;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Collectible {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: Attributes,
    /// Local-only extension. The backend never sends it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_attributes: Option<CustomAttributes>,
    #[serde(default = "default_in_collection")]
    pub in_collection: bool,
}

fn default_in_collection() -> bool {
    true
}

impl Collectible {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: Attributes {
                name: name.into(),
                ..Default::default()
            },
            custom_attributes: None,
            in_collection: true,
        }
    }

    pub fn with_gallery(mut self, gallery: Vec<String>) -> Self {
        self.attributes.images.gallery = gallery;
        self
    }

    pub fn name(&self) -> &str {
        &self.attributes.name
    }

    pub fn gallery(&self) -> &[String] {
        &self.attributes.images.gallery
    }

    pub fn estimated_value_display(&self) -> Option<String> {
        normalize::estimated_value_display(&self.attributes)
    }

    pub fn primary_subject(&self) -> String {
        normalize::primary_subject(&self.attributes)
    }

    pub fn query_subject(&self) -> Option<String> {
        normalize::query_subject(&self.attributes)
    }

    pub fn is_sold(&self) -> bool {
        self.custom_attributes
            .as_ref()
            .and_then(|c| c.sale.as_ref())
            .is_some_and(|s| s.sold)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attributes {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Images,
    /// Legacy scalar value, e.g. `"40"` or `"$40"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_value: Option<String>,
    #[serde(default, deserialize_with = "positional_amounts")]
    pub estimated_value_range: Vec<Option<f64>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub related_subjects: Vec<RelatedSubject>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub production_date: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub production_status: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_number: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Images {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_no_bg: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub gallery: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelatedSubject {
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: SubjectKind,
}

impl RelatedSubject {
    pub fn new(name: impl Into<String>, kind: SubjectKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubjectKind {
    /// Tagged by the recognition model.
    AiClassified,
    /// Picked by the user as the item's main subject.
    UserSelectedPrimary,
    #[default]
    #[serde(other)]
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomAttributes {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchase_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_photos: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sale: Option<Sale>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sold_platform: Option<String>,
    #[serde(default)]
    pub sold: bool,
}

/// Decodes `null` the same way as an absent field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn positional_amounts<'de, D>(deserializer: D) -> Result<Vec<Option<f64>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<Vec<Value>> = Option::deserialize(deserializer)?;
    Ok(decode_amount_range(&raw.unwrap_or_default()))
}

/// Decodes a raw estimated-value-range array, one slot per element.
pub fn decode_amount_range(raw: &[Value]) -> Vec<Option<f64>> {
    raw.iter().map(amount_from_value).collect()
}

fn amount_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .trim()
            .trim_start_matches('$')
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite()),
        _ => None,
    }
}
