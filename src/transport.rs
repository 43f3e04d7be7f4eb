//! The HTTP transport boundary (§6, §4.F). Kept behind a trait so the
//! discovery/fetch logic in `crate::discovery` can be exercised against a
//! fake in tests without reaching the network.

use crate::error::{GitError, Result};

const ADVERTISEMENT_CONTENT_TYPE: &str = "application/x-git-upload-pack-advertisement";
const UPLOAD_PACK_REQUEST_CONTENT_TYPE: &str = "application/x-git-upload-pack-request";

/// The two HTTP round-trips the protocol needs (§4.F): fetch the ref
/// advertisement, then POST the want-list and get the bundle back.
pub trait Transport {
    fn get_advertisement(&self, repo_url: &str) -> Result<Vec<u8>>;
    fn post_upload_pack(&self, repo_url: &str, body: Vec<u8>) -> Result<Vec<u8>>;
}

/// The default transport, backed by a blocking `reqwest` client.
#[derive(Debug, Default)]
pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::blocking::Client::new(),
        }
    }
}

impl Transport for HttpTransport {
    fn get_advertisement(&self, repo_url: &str) -> Result<Vec<u8>> {
        let url = format!("{repo_url}/info/refs?service=git-upload-pack");
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| GitError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(GitError::Transport(format!(
                "GET {url} returned status {}",
                resp.status()
            )));
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|h| h.to_str().ok())
            .unwrap_or("");
        if content_type != ADVERTISEMENT_CONTENT_TYPE {
            tracing::warn!(
                content_type,
                expected = ADVERTISEMENT_CONTENT_TYPE,
                "remote advertised an unexpected content type"
            );
        }

        resp.bytes()
            .map(|b| b.to_vec())
            .map_err(|e| GitError::Transport(e.to_string()))
    }

    fn post_upload_pack(&self, repo_url: &str, body: Vec<u8>) -> Result<Vec<u8>> {
        let url = format!("{repo_url}/git-upload-pack");
        let resp = self
            .client
            .post(&url)
            .header(reqwest::header::CONTENT_TYPE, UPLOAD_PACK_REQUEST_CONTENT_TYPE)
            .body(body)
            .send()
            .map_err(|e| GitError::Transport(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(GitError::Transport(format!(
                "POST {url} returned status {}",
                resp.status()
            )));
        }

        resp.bytes()
            .map(|b| b.to_vec())
            .map_err(|e| GitError::Transport(e.to_string()))
    }
}
