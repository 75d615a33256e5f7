//! Data ingestion
//!
//! Retrieval of the API documents and the HTML report, normalization of the
//! feed, and the per-game participant directory.

pub mod directory;
pub mod report;
pub mod scrapers;
pub mod source;

pub use directory::Directory;
pub use report::{parse_report, ReportRow};
pub use scrapers::{GameSource, NhlClient};
pub use source::{GameFeed, GameMeta};
