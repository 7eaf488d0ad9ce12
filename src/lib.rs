//! Client for hosted full-text search services.
//!
//! This crate manages a remote search index end to end:
//! - Schema-driven index definition with per-field capabilities
//! - Index lifecycle management (create, delete, existence checks)
//! - Batched document mutations with per-document outcomes
//! - Parameterized queries: free text, filters, ordering, projection
//!
//! # Example
//!
//! ```rust,no_run
//! use searchlight::{
//!     Batch, Document, Field, Filter, QuerySpec, Schema, SearchClient, SearchConfig,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SearchConfig::new("https://search.example.net", "admin-key", "query-key");
//!     let client = SearchClient::new(config)?;
//!
//!     // Define an index
//!     let schema = Schema::builder()
//!         .field(Field::string("hotelId").key().filterable())
//!         .field(Field::number("baseRate").filterable())
//!         .field(Field::string("hotelName").searchable())
//!         .field(Field::datetime("lastRenovationDate").sortable())
//!         .build()?;
//!
//!     client.indexes().delete_if_exists("hotels").await?;
//!     client.indexes().create("hotels", &schema).await?;
//!
//!     // Upload documents
//!     let hotels = client.index("hotels", schema);
//!     let batch = Batch::upload_all([
//!         Document::new()
//!             .field("hotelId", "1")
//!             .field("baseRate", 199.0)
//!             .field("hotelName", "Fancy Stay"),
//!         Document::new()
//!             .field("hotelId", "2")
//!             .field("baseRate", 79.99)
//!             .field("hotelName", "Roach Motel"),
//!     ]);
//!     let outcome = hotels.upload_batch(&batch).await?;
//!     assert!(outcome.all_succeeded());
//!
//!     // Query
//!     let results = hotels
//!         .search(
//!             &QuerySpec::builder()
//!                 .filter(Filter::lt("baseRate", 150))
//!                 .select(["hotelId", "hotelName"])
//!                 .build(),
//!         )
//!         .await?;
//!
//!     for doc in &results {
//!         println!("{:?}", doc.get_str("hotelName"));
//!     }
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod action;
mod client;
mod config;
mod document;
mod error;
mod index;
mod query;
mod schema;
mod search;
mod transport;

pub use action::{Batch, BatchResult, IndexAction, IndexingResult};
pub use client::{IndexClient, SearchClient};
pub use config::{ConsistencyPolicy, SearchConfig};
pub use document::{Document, GeoPoint};
pub use error::{Result, SearchError};
pub use index::{IndexDefinition, IndexInfo, IndexManager};
pub use query::{ComparisonOp, Filter, QueryBuilder, QuerySpec, SortOrder};
pub use schema::{Field, FieldType, Schema, SchemaBuilder};
pub use search::SearchResults;
pub use transport::{ApiRequest, ApiResponse, HttpTransport, KeyRole, Method, Transport};

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        Batch, Document, Field, Filter, IndexAction, QueryBuilder, QuerySpec, Result, Schema,
        SearchClient, SearchConfig, SearchError, SortOrder,
    };
}
