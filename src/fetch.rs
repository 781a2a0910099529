// src/fetch.rs - Shared HTTP collaborator for all source adapters
use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{Error, Result};

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.4 Safari/605.1.15",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/123.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:126.0) Gecko/20100101 Firefox/126.0",
];

/// Issues all outbound requests for the pipeline. Holds one client per
/// configured proxy plus a direct client; every request picks a client and a
/// user-agent at random. Adapters call `pause()` between dependent requests
/// to the same site.
pub struct Fetcher {
    clients: Vec<Client>,
    delay: Duration,
}

impl Fetcher {
    pub fn new(proxies: &[String], timeout_seconds: u64, delay: Duration) -> Result<Self> {
        let mut clients = Vec::new();

        for proxy_url in proxies {
            match reqwest::Proxy::all(proxy_url) {
                Ok(proxy) => {
                    let client = Client::builder()
                        .proxy(proxy)
                        .timeout(Duration::from_secs(timeout_seconds))
                        .build()?;
                    clients.push(client);
                }
                Err(e) => {
                    warn!("Skipping invalid proxy {}: {}", proxy_url, e);
                }
            }
        }

        // Direct client is the fallback when no proxies are configured
        if clients.is_empty() {
            let client = Client::builder()
                .timeout(Duration::from_secs(timeout_seconds))
                .build()?;
            clients.push(client);
        }

        Ok(Self { clients, delay })
    }

    fn pick_client(&self) -> &Client {
        &self.clients[fastrand::usize(..self.clients.len())]
    }

    fn pick_user_agent(&self) -> &'static str {
        USER_AGENTS[fastrand::usize(..USER_AGENTS.len())]
    }

    /// Minimum pause between dependent calls to the same source.
    pub async fn pause(&self) {
        tokio::time::sleep(self.delay).await;
    }

    pub async fn get_text(&self, url: &str) -> Result<String> {
        debug!("GET {}", url);
        let response = self
            .pick_client()
            .get(url)
            .header(reqwest::header::USER_AGENT, self.pick_user_agent())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::adapter(url, format!("HTTP {}", status)));
        }

        let body = response.text().await?;
        debug!("Fetched {} bytes from {}", body.len(), url);
        Ok(body)
    }

    pub async fn get_json(&self, url: &str, api_key_header: Option<(&str, &str)>) -> Result<serde_json::Value> {
        debug!("GET (json) {}", url);
        let mut request = self
            .pick_client()
            .get(url)
            .header(reqwest::header::USER_AGENT, self.pick_user_agent())
            .header(reqwest::header::ACCEPT, "application/json");

        if let Some((name, value)) = api_key_header {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::adapter(url, format!("HTTP {}", status)));
        }

        Ok(response.json().await?)
    }

    pub async fn post_json(&self, url: &str, body: &serde_json::Value) -> Result<serde_json::Value> {
        debug!("POST (json) {}", url);
        let response = self
            .pick_client()
            .post(url)
            .header(reqwest::header::USER_AGENT, self.pick_user_agent())
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::adapter(url, format!("HTTP {}", status)));
        }

        Ok(response.json().await?)
    }
}
