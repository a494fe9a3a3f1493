pub mod catalog_entry;
pub mod file_candidate;
pub mod ranked_result;
pub mod search_response;

pub use catalog_entry::{default_header_art, CatalogEntry, MappingRecord, StoreApp};
pub use file_candidate::FileCandidate;
pub use ranked_result::{Candidate, RankedResult, ScoredCandidate};
pub use search_response::{AppDetailsResponse, SearchResponse, SearchSource};
