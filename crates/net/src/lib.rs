use std::sync::Arc;
use std::thread;
use std::time::Instant;

use core_types::ProductId;
use thiserror::Error;
pub use url::Url;
use url::Position;

mod traffic;
mod transport;

pub use traffic::{Traffic, TrafficReport, TrafficStats};
pub use transport::{HttpResponse, ReqwestTransport, Transport};

pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com";

#[derive(Clone, Debug)]
pub struct FetchConfig {
    pub base_url: String,
    /// Honour `HTTP_PROXY`/`HTTPS_PROXY` from the environment.
    pub system_proxy: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            system_proxy: true,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("invalid URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("{0}")]
    Transport(String),
    #[error("empty response body")]
    EmptyBody,
    #[error("response body is not valid UTF-8")]
    UndecodableBody,
}

impl FetchError {
    /// True when the request itself succeeded but produced nothing displayable.
    pub fn is_no_data(&self) -> bool {
        matches!(self, FetchError::EmptyBody | FetchError::UndecodableBody)
    }
}

#[derive(Debug)]
pub struct FetchResult {
    pub product: ProductId,
    pub url: String,
    pub status: Option<u16>,
    /// Body bytes received.
    pub bytes: usize,
    /// Request head bytes sent; zero when no response came back.
    pub sent_bytes: usize,
    pub duration_ms: u128,
    pub body: Result<String, FetchError>,
}

impl FetchResult {
    /// The text the output region shows for this completion.
    pub fn display_message(&self) -> String {
        match &self.body {
            Ok(text) => text.clone(),
            Err(err) if err.is_no_data() => {
                format!("No data received for product {}", self.product)
            }
            Err(err) => format!("Error fetching product {}: {err}", self.product),
        }
    }
}

pub type FetchCallback = Arc<dyn Fn(FetchResult) + Send + Sync>;

pub fn todo_url(base_url: &str, product: ProductId) -> Result<Url, FetchError> {
    let raw = format!("{}/todos/{product}", base_url.trim_end_matches('/'));
    Url::parse(&raw).map_err(|e| FetchError::InvalidUrl {
        url: raw.clone(),
        reason: e.to_string(),
    })
}

/// Body bytes become display text only when non-empty and valid UTF-8.
/// No JSON parsing happens here; the text is passed through verbatim.
pub fn decode_body(body: Vec<u8>) -> Result<String, FetchError> {
    if body.is_empty() {
        return Err(FetchError::EmptyBody);
    }
    String::from_utf8(body).map_err(|_| FetchError::UndecodableBody)
}

/// Request line plus Host header. Client-added headers are not counted.
fn request_head_len(url: &Url) -> usize {
    let target = &url[Position::BeforePath..Position::AfterQuery];
    let host = &url[Position::BeforeHost..Position::AfterPort];
    format!("GET {target} HTTP/1.1\r\nHost: {host}\r\n\r\n").len()
}

/// Runs one GET on the calling thread.
pub fn fetch_blocking(transport: &dyn Transport, config: &FetchConfig, product: ProductId) -> FetchResult {
    let start = Instant::now();

    let url = match todo_url(&config.base_url, product) {
        Ok(url) => url,
        Err(err) => {
            return FetchResult {
                product,
                url: config.base_url.clone(),
                status: None,
                bytes: 0,
                sent_bytes: 0,
                duration_ms: 0,
                body: Err(err),
            };
        }
    };
    log::debug!("GET {url}");

    match transport.get(&url) {
        Ok(resp) => {
            let bytes = resp.body.len();
            let body = decode_body(resp.body);
            let duration_ms = start.elapsed().as_millis();
            log::info!(
                "product {product}: {} - {bytes} bytes - {duration_ms} ms - {url}",
                resp.status
            );
            FetchResult {
                product,
                url: url.to_string(),
                status: Some(resp.status),
                bytes,
                sent_bytes: request_head_len(&url),
                duration_ms,
                body,
            }
        }
        Err(err) => {
            log::warn!("product {product}: {err}");
            FetchResult {
                product,
                url: url.to_string(),
                status: None,
                bytes: 0,
                sent_bytes: 0,
                duration_ms: start.elapsed().as_millis(),
                body: Err(err),
            }
        }
    }
}

/// Runs one GET on a fresh worker thread and hands the result to `cb` there.
pub fn fetch_product(
    transport: Arc<dyn Transport>,
    config: FetchConfig,
    product: ProductId,
    cb: FetchCallback,
) {
    thread::spawn(move || {
        let result = fetch_blocking(transport.as_ref(), &config, product);
        cb(result);
    });
}
