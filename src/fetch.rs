use std::time::Duration;

use anyhow::Context as _;
use reqwest::header::{ACCEPT, USER_AGENT};

use crate::error::ScrapeError;

const USER_AGENT_VALUE: &str = concat!("mensa-on/", env!("CARGO_PKG_VERSION"));
const ACCEPT_VALUE: &str = "text/html,application/xhtml+xml;q=0.9,*/*;q=0.8";

/// Blocking HTTP client for the operator's pages. One instance is shared
/// across the fetches of a single build.
pub struct Fetcher {
    client: reqwest::blocking::Client,
}

impl Fetcher {
    pub fn new() -> anyhow::Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build http client")?;

        Ok(Self { client })
    }

    /// Fetches a page body. Transport failures and non-success statuses are
    /// both fatal; there is no retry.
    pub fn get_text(&self, url: &str) -> Result<String, ScrapeError> {
        let wrap = |source: reqwest::Error| ScrapeError::Fetch {
            url: url.to_owned(),
            source,
        };

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, USER_AGENT_VALUE)
            .header(ACCEPT, ACCEPT_VALUE)
            .send()
            .map_err(wrap)?;
        let response = response.error_for_status().map_err(wrap)?;
        response.text().map_err(wrap)
    }
}
