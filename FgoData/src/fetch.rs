//! Page fetching
//!
//! The pipeline only needs `url -> text`; [`Fetch`] is that seam. The HTTP
//! implementation is behind the `http` feature.

use crate::error::Result;

/// Source of page text
pub trait Fetch {
    fn fetch(&self, url: &str) -> Result<String>;
}

impl<F> Fetch for F
where
    F: Fn(&str) -> Result<String>,
{
    fn fetch(&self, url: &str) -> Result<String> {
        self(url)
    }
}

#[cfg(feature = "http")]
pub use http::HttpFetcher;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use reqwest::blocking::Client;

    use super::Fetch;
    use crate::config::RequestConfig;
    use crate::error::{Error, Result};

    /// Blocking HTTP client with a fixed user agent and timeout
    pub struct HttpFetcher {
        client: Client,
    }

    impl HttpFetcher {
        pub fn new(user_agent: &str, timeout: Duration) -> Result<Self> {
            let client = Client::builder()
                .user_agent(user_agent)
                .timeout(timeout)
                .build()
                .map_err(|e| Error::FetchFailed {
                    url: String::new(),
                    message: format!("failed to build HTTP client: {e}"),
                })?;
            Ok(Self { client })
        }

        pub fn from_config(config: &RequestConfig) -> Result<Self> {
            Self::new(&config.user_agent, config.timeout())
        }
    }

    impl Fetch for HttpFetcher {
        fn fetch(&self, url: &str) -> Result<String> {
            tracing::info!("request {}", url);
            let fetch_failed = |e: reqwest::Error| Error::FetchFailed {
                url: url.to_string(),
                message: e.to_string(),
            };
            let response = self.client.get(url).send().map_err(fetch_failed)?;
            let status = response.status();
            if !status.is_success() {
                return Err(Error::HttpStatus {
                    url: url.to_string(),
                    status: status.as_u16(),
                });
            }
            response.text().map_err(fetch_failed)
        }
    }
}
