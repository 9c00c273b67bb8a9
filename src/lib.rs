pub mod aggregator;
pub mod config;
pub mod delay_manager;
pub mod error;
pub mod exporter;
pub mod fetcher;
pub mod identity;
pub mod logger;
pub mod normalizer;
pub mod record;
pub mod source;
pub mod sources;
pub mod validator;

// Exporting types for convenience
pub use aggregator::{Aggregator, ResultSet, RunState};
pub use config::Settings;
pub use fetcher::{Fetch, HttpFetcher};
pub use identity::identity;
pub use normalizer::{normalize_city, normalize_phone};
pub use record::{Record, Row};
pub use source::{RecordStream, Source};
