//! Field schema model driving index definitions.
//!
//! A [`Schema`] is an ordered set of named fields, each carrying capability
//! flags that constrain which query operations may reference it. Schemas are
//! built declaratively through [`SchemaBuilder`] and validated once; an index
//! keeps its schema for its whole lifetime, so changing a field means
//! recreating the index.

use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Field value types supported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FieldType {
    /// Unicode text.
    String,
    /// Double precision number.
    Number,
    /// Boolean.
    Boolean,
    /// Timestamp with offset, carried as RFC 3339 text.
    DateTime,
    /// Geographic point (latitude/longitude).
    GeoPoint,
    /// Collection of strings.
    StringCollection,
}

impl FieldType {
    /// Wire name of the type.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Boolean => "boolean",
            FieldType::DateTime => "date-time",
            FieldType::GeoPoint => "geo-point",
            FieldType::StringCollection => "string-collection",
        }
    }
}

/// A named field with capability flags.
///
/// Capabilities mirror the declarative attributes a document model would
/// carry: `key` identifies the document, `searchable` admits the field to
/// free-text search, `filterable`/`sortable`/`facetable` admit it to the
/// corresponding query operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Field {
    /// Field name as it appears on the wire.
    pub name: String,
    /// Value type.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Uniquely identifies the document. Exactly one field per schema.
    #[serde(default)]
    pub key: bool,
    /// Participates in free-text search.
    #[serde(default)]
    pub searchable: bool,
    /// May be referenced by filter expressions.
    #[serde(default)]
    pub filterable: bool,
    /// May be referenced by order-by clauses.
    #[serde(default)]
    pub sortable: bool,
    /// May be used for faceted navigation.
    #[serde(default)]
    pub facetable: bool,
}

impl Field {
    /// Create a field with no capabilities.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            field_type,
            key: false,
            searchable: false,
            filterable: false,
            sortable: false,
            facetable: false,
        }
    }

    /// Create a string field.
    pub fn string(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::String)
    }

    /// Create a number field.
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Number)
    }

    /// Create a boolean field.
    pub fn boolean(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::Boolean)
    }

    /// Create a date-time field.
    pub fn datetime(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::DateTime)
    }

    /// Create a geo-point field.
    pub fn geo_point(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::GeoPoint)
    }

    /// Create a string-collection field.
    pub fn string_collection(name: impl Into<String>) -> Self {
        Self::new(name, FieldType::StringCollection)
    }

    /// Mark this field as the document key.
    pub fn key(mut self) -> Self {
        self.key = true;
        self
    }

    /// Mark this field as searchable.
    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    /// Mark this field as filterable.
    pub fn filterable(mut self) -> Self {
        self.filterable = true;
        self
    }

    /// Mark this field as sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    /// Mark this field as facetable.
    pub fn facetable(mut self) -> Self {
        self.facetable = true;
        self
    }

    fn validate(&self) -> Result<()> {
        if self.key && self.field_type != FieldType::String {
            return Err(SearchError::Schema(format!(
                "key field '{}' must be of type string, not {}",
                self.name,
                self.field_type.as_str()
            )));
        }
        if self.searchable
            && !matches!(
                self.field_type,
                FieldType::String | FieldType::StringCollection
            )
        {
            return Err(SearchError::Schema(format!(
                "field '{}' of type {} cannot be searchable",
                self.name,
                self.field_type.as_str()
            )));
        }
        if self.sortable && self.field_type == FieldType::StringCollection {
            return Err(SearchError::Schema(format!(
                "collection field '{}' cannot be sortable",
                self.name
            )));
        }
        if self.facetable && self.field_type == FieldType::GeoPoint {
            return Err(SearchError::Schema(format!(
                "geo-point field '{}' cannot be facetable",
                self.name
            )));
        }
        Ok(())
    }
}

/// An ordered, validated set of fields defining what an index supports.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Start building a schema.
    pub fn builder() -> SchemaBuilder {
        SchemaBuilder::new()
    }

    /// All fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Look up a field by name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The key field. Guaranteed to exist by construction.
    pub fn key_field(&self) -> &Field {
        self.fields
            .iter()
            .find(|f| f.key)
            .expect("validated schema always has a key field")
    }

    /// Serialize the schema as an index definition body.
    pub(crate) fn to_definition(&self, index_name: &str) -> Value {
        json!({
            "name": index_name,
            "fields": self.fields,
        })
    }

    /// Rebuild a schema from stored field definitions, revalidating them.
    pub(crate) fn from_fields(fields: Vec<Field>) -> Result<Self> {
        SchemaBuilder { fields }.build()
    }
}

/// Builder for [`Schema`].
#[derive(Debug, Clone, Default)]
pub struct SchemaBuilder {
    fields: Vec<Field>,
}

impl SchemaBuilder {
    /// Create an empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a field.
    pub fn field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }

    /// Validate the declared fields and produce a [`Schema`].
    ///
    /// Fails when no field (or more than one) is marked as key, when two
    /// fields share a name, or when a capability is requested on a type that
    /// cannot support it.
    pub fn build(self) -> Result<Schema> {
        {
            let mut seen = std::collections::BTreeSet::new();
            for field in &self.fields {
                if !seen.insert(field.name.as_str()) {
                    return Err(SearchError::Schema(format!(
                        "duplicate field name '{}'",
                        field.name
                    )));
                }
                field.validate()?;
            }
        }

        let key_count = self.fields.iter().filter(|f| f.key).count();
        if key_count != 1 {
            return Err(SearchError::Schema(format!(
                "schema must declare exactly one key field, found {key_count}"
            )));
        }

        Ok(Schema {
            fields: self.fields,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hotel_schema() -> SchemaBuilder {
        Schema::builder()
            .field(Field::string("hotelId").key().filterable())
            .field(Field::number("baseRate").filterable())
            .field(Field::string("hotelName").searchable())
            .field(Field::datetime("lastRenovationDate").sortable())
    }

    #[test]
    fn builds_valid_schema() {
        let schema = hotel_schema().build().unwrap();
        assert_eq!(schema.fields().len(), 4);
        assert_eq!(schema.key_field().name, "hotelId");
        assert!(schema.field("baseRate").unwrap().filterable);
        assert!(schema.field("missing").is_none());
    }

    #[test]
    fn rejects_missing_key() {
        let err = Schema::builder()
            .field(Field::string("name").searchable())
            .build()
            .unwrap_err();
        assert!(matches!(err, SearchError::Schema(_)));
    }

    #[test]
    fn rejects_multiple_keys() {
        let err = Schema::builder()
            .field(Field::string("a").key())
            .field(Field::string("b").key())
            .build()
            .unwrap_err();
        assert!(matches!(err, SearchError::Schema(_)));
    }

    #[test]
    fn rejects_duplicate_field_names() {
        let err = Schema::builder()
            .field(Field::string("id").key())
            .field(Field::number("rating"))
            .field(Field::boolean("rating"))
            .build()
            .unwrap_err();
        assert!(matches!(err, SearchError::Schema(m) if m.contains("rating")));
    }

    #[test]
    fn rejects_sortable_collection() {
        let err = Schema::builder()
            .field(Field::string("id").key())
            .field(Field::string_collection("tags").sortable())
            .build()
            .unwrap_err();
        assert!(matches!(err, SearchError::Schema(m) if m.contains("tags")));
    }

    #[test]
    fn rejects_searchable_number() {
        let err = Schema::builder()
            .field(Field::string("id").key())
            .field(Field::number("rate").searchable())
            .build()
            .unwrap_err();
        assert!(matches!(err, SearchError::Schema(_)));
    }

    #[test]
    fn rejects_non_string_key() {
        let err = Schema::builder()
            .field(Field::number("id").key())
            .build()
            .unwrap_err();
        assert!(matches!(err, SearchError::Schema(_)));
    }

    #[test]
    fn definition_carries_fields_in_order() {
        let schema = hotel_schema().build().unwrap();
        let def = schema.to_definition("hotels");
        assert_eq!(def["name"], "hotels");
        let fields = def["fields"].as_array().unwrap();
        assert_eq!(fields[0]["name"], "hotelId");
        assert_eq!(fields[0]["key"], true);
        assert_eq!(fields[1]["type"], "number");
        assert_eq!(fields[3]["sortable"], true);
    }
}
