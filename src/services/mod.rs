pub mod ingestion;
pub mod search;

pub use ingestion::{IngestionReport, IngestionService};
pub use search::{SearchResult, SearchService};
