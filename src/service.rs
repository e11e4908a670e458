//! Boundary to the remote texts service.

use crate::authoring::{NoteDraft, SourceDraft, TextDraft};
use crate::cancellation::CancellationToken;
use crate::commentary::RawRecord;
use crate::document::DocumentRecord;
use crate::reference::Reference;
use anyhow::{Context, Result, anyhow};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info};

/// Fetches documents by reference.
pub trait TextSource {
    fn fetch(&self, reference: &Reference, cancel: &CancellationToken) -> Result<DocumentRecord>;
}

/// Creates, updates and deletes links and notes, and stores new texts.
/// Link and note saves return the stored record as the service echoes it
/// back.
pub trait MutationService {
    fn save_link(&self, draft: &SourceDraft) -> Result<RawRecord>;
    fn save_note(&self, draft: &NoteDraft) -> Result<RawRecord>;
    fn save_text(&self, draft: &TextDraft) -> Result<()>;
    fn delete_link(&self, id: &str) -> Result<()>;
    fn delete_note(&self, id: &str) -> Result<()>;
}

/// Blocking HTTP client for the texts API.
#[derive(Debug, Clone)]
pub struct HttpTextSource {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl HttpTextSource {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut builder = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent("layered-reader");
        if base_url.starts_with("http://127.0.0.1") || base_url.starts_with("http://localhost") {
            builder = builder.no_proxy();
        }
        let client = builder.build().context("failed to build HTTP client")?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, collection: &str, key: Option<&str>) -> Result<reqwest::Url> {
        let mut url = reqwest::Url::parse(&format!("{}/api/{collection}/", self.base_url))
            .with_context(|| format!("invalid base url {}", self.base_url))?;
        if let Some(key) = key {
            url.path_segments_mut()
                .map_err(|_| anyhow!("cannot build a path on {}", self.base_url))?
                .pop_if_empty()
                .push(key);
        }
        Ok(url)
    }

    fn post_json<T: serde::Serialize, R: DeserializeOwned>(
        &self,
        collection: &str,
        key: Option<&str>,
        payload: &T,
    ) -> Result<R> {
        let url = self.endpoint(collection, key)?;
        let body = serde_json::to_string(payload)?;
        let response = self
            .client
            .post(url.clone())
            .form(&[("json", body)])
            .send()
            .with_context(|| format!("POST {url} failed"))?
            .error_for_status()?;
        decode(&response.text()?)
    }

    fn delete(&self, collection: &str, id: &str) -> Result<()> {
        let url = self.endpoint(collection, Some(id))?;
        let response = self
            .client
            .delete(url.clone())
            .send()
            .with_context(|| format!("DELETE {url} failed"))?
            .error_for_status()?;
        let _: Value = decode(&response.text()?)?;
        info!(%url, "Deleted record");
        Ok(())
    }
}

impl TextSource for HttpTextSource {
    fn fetch(&self, reference: &Reference, cancel: &CancellationToken) -> Result<DocumentRecord> {
        cancel.check_cancelled("before_fetch")?;
        let url = self.endpoint("texts", Some(&reference.url()))?;
        debug!(%url, "Fetching text");
        let response = self
            .client
            .get(url.clone())
            .send()
            .with_context(|| format!("GET {url} failed"))?
            .error_for_status()?;
        let body = response.text()?;
        cancel.check_cancelled("after_fetch")?;
        decode(&body)
    }
}

impl MutationService for HttpTextSource {
    fn save_link(&self, draft: &SourceDraft) -> Result<RawRecord> {
        self.post_json("links", draft.id.as_deref(), draft)
    }

    fn save_note(&self, draft: &NoteDraft) -> Result<RawRecord> {
        self.post_json("links", draft.id.as_deref(), draft)
    }

    fn save_text(&self, draft: &TextDraft) -> Result<()> {
        let _: Value = self.post_json("texts", Some(&draft.reference.url()), draft)?;
        info!(reference = %draft.reference, "Saved text");
        Ok(())
    }

    fn delete_link(&self, id: &str) -> Result<()> {
        self.delete("links", id)
    }

    fn delete_note(&self, id: &str) -> Result<()> {
        self.delete("notes", id)
    }
}

/// Parse a service response; a top-level `error` field becomes an error.
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<T> {
    let value: Value = serde_json::from_str(body).context("service returned invalid JSON")?;
    if let Some(message) = value.get("error").and_then(Value::as_str) {
        return Err(anyhow!("{message}"));
    }
    serde_json::from_value(value).context("unexpected response shape")
}
