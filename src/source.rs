use async_trait::async_trait;

use crate::error::SourceError;
use crate::record::Record;

pub type RecordStream = Box<dyn Iterator<Item = Record> + Send>;

#[async_trait]
pub trait Source: Send + Sync {
    fn name(&self) -> &str;

    async fn seed_urls(&self) -> Result<Vec<String>, SourceError>;

    // Records found in `content`, which was fetched from `origin_url`.
    fn parse(&self, content: &str, origin_url: &str) -> Result<RecordStream, SourceError>;
}
