//! CLI command implementations.
//!
//! Commands orchestrate the various library components to perform user tasks.

pub mod query;

// Re-export main command functions
pub use query::{execute_query, validate_args, InsightsService, QueryArgs, QueryRequest, QueryResponse};
