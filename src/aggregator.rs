use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::{debug, error, info};
use tokio::sync::Semaphore;

use crate::config::Settings;
use crate::error::FetchError;
use crate::fetcher::{Fetch, HttpFetcher};
use crate::identity::identity;
use crate::record::Record;
use crate::source::Source;

// Deduplicated records keyed by identity. Last write wins; a key keeps the position of
// its first insertion so iteration order is stable.
#[derive(Debug, Default, Clone)]
pub struct ResultSet {
    order: Vec<String>,
    records: HashMap<String, Record>,
}

impl ResultSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: String, record: Record) -> Option<Record> {
        match self.records.insert(key.clone(), record) {
            Some(previous) => Some(previous),
            None => {
                self.order.push(key);
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Record> {
        self.records.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.records.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Record)> {
        self.order
            .iter()
            .filter_map(|key| self.records.get(key).map(|record| (key.as_str(), record)))
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.iter().map(|(_, record)| record)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Running,
    Draining,
    Done,
}

#[derive(Debug, Default)]
struct SourceStats {
    pages: usize,
    skipped: usize,
    records: usize,
}

pub struct Aggregator<F: Fetch = HttpFetcher> {
    fetcher: Arc<F>,
    gate: Arc<Semaphore>,
    results: Arc<Mutex<ResultSet>>,
    state: RunState,
}

impl Aggregator<HttpFetcher> {
    pub fn from_settings(settings: &Settings) -> Result<Self, FetchError> {
        Ok(Self::new(HttpFetcher::new(settings)?, settings.concurrency))
    }
}

impl<F: Fetch> Aggregator<F> {
    pub fn new(fetcher: F, concurrency: usize) -> Self {
        Aggregator {
            fetcher: Arc::new(fetcher),
            gate: Arc::new(Semaphore::new(concurrency.max(1))),
            results: Arc::new(Mutex::new(ResultSet::new())),
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn transition(&mut self, next: RunState) {
        debug!("Aggregator {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    pub async fn run(mut self, sources: Vec<Arc<dyn Source>>) -> ResultSet {
        self.transition(RunState::Running);

        let mut handles = Vec::with_capacity(sources.len());
        for source in sources {
            let name = source.name().to_string();
            let fetcher = Arc::clone(&self.fetcher);
            let gate = Arc::clone(&self.gate);
            let results = Arc::clone(&self.results);

            let handle = tokio::spawn(async move {
                // A closed gate is impossible here; the aggregator never closes it.
                let _permit = match gate.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return,
                };
                harvest_source(source.as_ref(), fetcher.as_ref(), &results).await;
            });
            handles.push((name, handle));
        }

        self.transition(RunState::Draining);
        for (name, handle) in handles {
            if let Err(e) = handle.await {
                error!("Source {} task aborted: {}", name, e);
            }
        }

        self.transition(RunState::Done);

        let Aggregator { fetcher, results, .. } = self;
        match Arc::try_unwrap(fetcher) {
            Ok(fetcher) => fetcher.close(),
            Err(_) => error!("HTTP session still shared after all sources finished; not closed"),
        }

        let results = match Arc::try_unwrap(results) {
            Ok(mutex) => mutex.into_inner().unwrap_or_else(|poisoned| poisoned.into_inner()),
            Err(shared) => {
                let snapshot = lock(&shared).clone();
                snapshot
            }
        };
        debug!("Aggregator finished with {} unique records", results.len());
        results
    }
}

fn lock(results: &Mutex<ResultSet>) -> MutexGuard<'_, ResultSet> {
    results.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn harvest_source<F: Fetch>(source: &dyn Source, fetcher: &F, results: &Mutex<ResultSet>) {
    let name = source.name();
    let seeds = match source.seed_urls().await {
        Ok(seeds) => seeds,
        Err(e) => {
            error!("{}", e);
            return;
        }
    };
    info!("Source {}: {} seed URLs", name, seeds.len());

    let mut stats = SourceStats::default();
    for url in &seeds {
        let content = match fetcher.fetch(url).await {
            Some(content) => content,
            None => {
                stats.skipped += 1;
                continue;
            }
        };
        stats.pages += 1;

        let stream = match source.parse(&content, url) {
            Ok(stream) => stream,
            Err(e) => {
                error!("{}", e);
                stats.skipped += 1;
                continue;
            }
        };

        let mut guard = lock(results);
        for record in stream {
            let key = identity(&record);
            guard.insert(key, record);
            stats.records += 1;
        }
    }

    info!(
        "Source {} done: {} pages fetched, {} skipped, {} records",
        name, stats.pages, stats.skipped, stats.records
    );
}
