//! In-memory `Transport` used by the crawler's unit tests

use crate::crawler::fetcher::{FetchResponse, Transport, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Debug, Clone)]
enum Route {
    Respond {
        status: u16,
        content_type: Option<String>,
        body: String,
    },
    Fail,
}

/// A fake website keyed by absolute URL. Unknown URLs answer 404.
#[derive(Debug, Default)]
pub struct FakeSite {
    routes: HashMap<String, Route>,
    delay: Duration,
    fetches: Mutex<HashMap<String, usize>>,
    active: Mutex<HashMap<String, usize>>,
    max_overlap_per_url: AtomicUsize,
    max_overlap_total: AtomicUsize,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn html(self, url: &str, body: &str) -> Self {
        self.typed(url, 200, Some("text/html"), body)
    }

    pub fn status(self, url: &str, status: u16) -> Self {
        self.typed(url, status, Some("text/html"), "")
    }

    pub fn typed(mut self, url: &str, status: u16, content_type: Option<&str>, body: &str) -> Self {
        self.routes.insert(
            url.to_string(),
            Route::Respond {
                status,
                content_type: content_type.map(str::to_string),
                body: body.to_string(),
            },
        );
        self
    }

    pub fn fail(mut self, url: &str) -> Self {
        self.routes.insert(url.to_string(), Route::Fail);
        self
    }

    /// Every fetch sleeps this long before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn fetch_count(&self, url: &str) -> usize {
        self.fetches.lock().get(url).copied().unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.fetches.lock().values().sum()
    }

    /// Highest number of simultaneous fetches seen for any single URL
    pub fn max_overlap_per_url(&self) -> usize {
        self.max_overlap_per_url.load(Ordering::SeqCst)
    }

    /// Highest number of simultaneous fetches seen overall
    pub fn max_overlap_total(&self) -> usize {
        self.max_overlap_total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for FakeSite {
    async fn fetch(&self, url: &str) -> Result<FetchResponse, TransportError> {
        *self.fetches.lock().entry(url.to_string()).or_insert(0) += 1;
        {
            let mut active = self.active.lock();
            let running = active.entry(url.to_string()).or_insert(0);
            *running += 1;
            let running = *running;
            let total: usize = active.values().sum();
            self.max_overlap_per_url.fetch_max(running, Ordering::SeqCst);
            self.max_overlap_total.fetch_max(total, Ordering::SeqCst);
        }

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if let Some(running) = self.active.lock().get_mut(url) {
            *running -= 1;
        }

        match self.routes.get(url) {
            Some(Route::Respond {
                status,
                content_type,
                body,
            }) => Ok(FetchResponse {
                status: *status,
                content_type: content_type.clone(),
                body: body.clone(),
            }),
            Some(Route::Fail) => Err(TransportError::Connect {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
            None => Ok(FetchResponse {
                status: 404,
                content_type: Some("text/html".to_string()),
                body: String::new(),
            }),
        }
    }
}

/// Builds an HTML page whose body is one anchor per href
pub fn page(hrefs: &[&str]) -> String {
    let anchors: String = hrefs
        .iter()
        .map(|href| format!("<a href=\"{}\">link</a>\n", href))
        .collect();
    format!("<html><head><title>Test</title></head><body>\n{}</body></html>", anchors)
}
