pub mod discover;
pub mod error;
pub mod extract;
pub mod pipeline;
pub mod record;
pub mod session;

mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use discover::normalize_profile_url;
pub use error::ScrapeError;
pub use extract::{ExtractStrategy, ExtractedFields, MarkerExtractor, SelectorExtractor};
pub use pipeline::{ProgressCallback, RecordStream, ScrapeConfig, Scraper};
pub use record::{EXPORT_COLUMNS, ProfileRecord, profile_id, validate_export_columns};
pub use session::{Session, SessionConfig, SessionFactory, SessionProvider};
