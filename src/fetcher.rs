use async_trait::async_trait;
use log::{debug, error, info, warn};
use rand::seq::SliceRandom;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT_LANGUAGE, USER_AGENT};
use reqwest::{Client, Proxy, StatusCode};
use std::time::Duration;

use crate::config::Settings;
use crate::delay_manager;
use crate::error::FetchError;

const UA_POOL: [&str; 4] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.0 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/118.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

// Retrieval of raw page content. Every fault degrades to `None`.
#[async_trait]
pub trait Fetch: Send + Sync + 'static {
    async fn fetch(&self, url: &str) -> Option<String>;

    fn close(self)
    where
        Self: Sized;
}

pub struct HttpFetcher {
    direct: Client,
    proxied: Vec<Client>,
    delay: Duration,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self, FetchError> {
        let user_agent = settings
            .user_agent
            .clone()
            .unwrap_or_else(|| random_user_agent().to_string());
        debug!("Using User-Agent: {}", user_agent);

        let direct = build_client(settings, &user_agent, None)?;
        let proxied = settings
            .proxies
            .iter()
            .map(|proxy| build_client(settings, &user_agent, Some(proxy)))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(HttpFetcher {
            direct,
            proxied,
            delay: settings.delay(),
        })
    }

    fn pick_client(&self) -> &Client {
        self.proxied
            .choose(&mut rand::thread_rng())
            .unwrap_or(&self.direct)
    }
}

fn random_user_agent() -> &'static str {
    UA_POOL
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(UA_POOL[0])
}

fn build_client(settings: &Settings, user_agent: &str, proxy: Option<&str>) -> Result<Client, FetchError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9,ar;q=0.8"));
    if let Ok(ua) = HeaderValue::from_str(user_agent) {
        headers.insert(USER_AGENT, ua);
    } else {
        warn!("Ignoring User-Agent with invalid header characters");
    }

    let mut builder = Client::builder()
        .timeout(settings.timeout())
        .default_headers(headers)
        .cookie_store(true);
    if let Some(proxy) = proxy {
        builder = builder.proxy(Proxy::all(proxy)?);
    }
    Ok(builder.build()?)
}

#[async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Option<String> {
        let client = self.pick_client();
        delay_manager::polite_delay(self.delay).await;

        let resp = match client.get(url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                error!("GET failed for {}: {}", url, e);
                return None;
            }
        };

        let status = resp.status();
        if status != StatusCode::OK {
            warn!("Non-200 for {}: {}", url, status);
            return None;
        }

        match resp.text().await {
            Ok(body) if !body.is_empty() => Some(body),
            Ok(_) => {
                warn!("Empty body for {}", url);
                None
            }
            Err(e) => {
                error!("Failed to read body of {}: {}", url, e);
                None
            }
        }
    }

    fn close(self) {
        info!("Closing HTTP session ({} proxied clients).", self.proxied.len());
        drop(self);
    }
}
