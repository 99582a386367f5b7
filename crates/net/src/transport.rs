use std::error::Error as _;

use url::Url;

use crate::{FetchConfig, FetchError};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

/// A single blocking GET. Implementations are shared across worker threads.
pub trait Transport: Send + Sync {
    fn get(&self, url: &Url) -> Result<HttpResponse, FetchError>;
}

pub struct ReqwestTransport {
    client: reqwest::blocking::Client,
}

impl ReqwestTransport {
    pub fn new(config: &FetchConfig) -> Result<Self, FetchError> {
        let mut builder = reqwest::blocking::Client::builder();
        if !config.system_proxy {
            builder = builder.no_proxy();
        }
        let client = builder
            .build()
            .map_err(|e| FetchError::Transport(format!("client build error: {}", describe(&e))))?;
        Ok(Self { client })
    }
}

impl Transport for ReqwestTransport {
    fn get(&self, url: &Url) -> Result<HttpResponse, FetchError> {
        // Status codes are not errors; a 404 page is still text to show.
        let resp = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| FetchError::Transport(describe(&e)))?;
        let status = resp.status().as_u16();
        let body = resp
            .bytes()
            .map_err(|e| FetchError::Transport(describe(&e)))?;
        Ok(HttpResponse {
            status,
            body: body.to_vec(),
        })
    }
}

/// reqwest's top-level message is generic ("error sending request"); the
/// cause (DNS, refused, TLS) lives further down the source chain.
fn describe(err: &reqwest::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let cause_text = cause.to_string();
        if !out.contains(&cause_text) {
            out.push_str(": ");
            out.push_str(&cause_text);
        }
        source = cause.source();
    }
    out
}
