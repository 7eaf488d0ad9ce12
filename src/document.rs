//! Documents as dynamic field maps.

use crate::error::{Result, SearchError};
use crate::schema::Schema;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use std::collections::BTreeMap;

/// A document: a mapping from field names to typed values.
///
/// The shape of a document is driven by the index [`Schema`] rather than a
/// fixed Rust type, so fields are held as JSON values in declaration-stable
/// order. Optional fields may simply be omitted. A document is identified by
/// the value of its schema's key field.
///
/// Static Rust types bridge in and out through serde:
///
/// ```rust
/// use searchlight::Document;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize, Deserialize)]
/// struct Hotel {
///     #[serde(rename = "hotelId")]
///     hotel_id: String,
///     #[serde(rename = "baseRate")]
///     base_rate: f64,
/// }
///
/// let doc = Document::from_typed(&Hotel { hotel_id: "1".into(), base_rate: 199.0 }).unwrap();
/// assert_eq!(doc.get_str("hotelId"), Some("1"));
/// let hotel: Hotel = doc.to_typed().unwrap();
/// assert_eq!(hotel.base_rate, 199.0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(BTreeMap<String, Value>);

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field value, builder style.
    pub fn field(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Set a field value in place.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Get a field value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Get a field as a string.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Get a field as a number.
    pub fn get_f64(&self, name: &str) -> Option<f64> {
        self.0.get(name).and_then(Value::as_f64)
    }

    /// Get a field as a boolean.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.0.get(name).and_then(Value::as_bool)
    }

    /// Get a date-time field, parsing its RFC 3339 representation.
    pub fn get_datetime(&self, name: &str) -> Option<DateTime<Utc>> {
        self.get_str(name)
            .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
            .map(|dt| dt.with_timezone(&Utc))
    }

    /// Iterate over field names and values.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Number of fields present.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the document has no fields.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Extract the key value for this document under the given schema.
    ///
    /// Key values are unique strings and may never be null, so a missing or
    /// non-string key is a schema error.
    pub fn key_value(&self, schema: &Schema) -> Result<String> {
        let key_field = schema.key_field();
        match self.get_str(&key_field.name) {
            Some(key) if !key.is_empty() => Ok(key.to_string()),
            _ => Err(SearchError::Schema(format!(
                "document is missing a value for key field '{}'",
                key_field.name
            ))),
        }
    }

    /// Build a document from a JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        Ok(serde_json::from_value(value)?)
    }

    /// Build a document from any serializable type.
    pub fn from_typed<T: Serialize>(value: &T) -> Result<Self> {
        Ok(serde_json::from_value(serde_json::to_value(value)?)?)
    }

    /// Decode this document into a typed value.
    pub fn to_typed<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value(serde_json::to_value(&self.0)?)?)
    }
}

impl FromIterator<(String, Value)> for Document {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        Document(iter.into_iter().collect())
    }
}

/// A geographic point, latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub latitude: f64,
    /// Longitude in degrees.
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a geo-point.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

impl From<GeoPoint> for Value {
    fn from(point: GeoPoint) -> Self {
        serde_json::json!({
            "latitude": point.latitude,
            "longitude": point.longitude,
        })
    }
}
