//! fabric-query: read-only query resolution over a `GraphStore`.
//!
//! Seven query shapes (direct lookups, three breadth-first walks, and a flat
//! cross-engine search), each followed by requester scope filtering and an
//! optional node-count cap.

pub mod filter;
pub mod resolver;
pub mod traversal;
pub mod types;

pub use resolver::QueryResolver;
pub use traversal::Direction;
pub use types::{
    CrossReference, FabricQuery, QueryFilters, QueryRequest, QueryResult, QueryType, Resolution,
};
