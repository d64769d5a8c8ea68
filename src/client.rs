//! Blocking CouchDB client for the LiveSync database.
//!
//! Thin wrapper over `reqwest::blocking` with basic auth. Every operation
//! is a single attempt; any non-2xx response becomes a [`RequestError`]
//! carrying the status and the raw body so the user sees exactly what the
//! server said. No retries, no pooling beyond what reqwest does itself.

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// A CouchDB document body. `_id` is always present; `_rev` after the
/// first read. Everything else is passthrough LiveSync data.
pub type Document = serde_json::Map<String, Value>;

/// Connection parameters for one invocation. Never persisted.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub base_url: String,
    pub user: String,
    pub password: String,
    pub db: String,
}

#[derive(Debug, Error)]
pub enum RequestError {
    /// HTTP 404 - unknown document id or database.
    #[error("not found (HTTP 404 {reason}): {body}")]
    NotFound { reason: String, body: String },

    /// HTTP 409 - stale or missing `_rev` on update/delete.
    #[error("revision conflict (HTTP 409 {reason}): {body}")]
    Conflict { reason: String, body: String },

    /// Any other non-2xx response.
    #[error("HTTP {status} {reason}: {body}")]
    Http {
        status: u16,
        reason: String,
        body: String,
    },

    /// Connection, TLS or body-read failures below the HTTP layer.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// 2xx response whose body was not the expected JSON shape.
    #[error("unexpected response shape: {0}")]
    BadResponse(String),
}

/// Body of a `POST /{db}/_find` request.
#[derive(Debug, Serialize)]
struct FindQuery<'a> {
    selector: &'a Value,
    limit: usize,
    fields: &'a [&'a str],
}

pub struct DocStoreClient {
    http: reqwest::blocking::Client,
    creds: Credentials,
}

impl DocStoreClient {
    pub fn new(creds: Credentials) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            creds,
        }
    }

    /// Build `{base}/{db}[/{id}][suffix]` with percent-encoded segments.
    fn url(&self, doc_id: Option<&str>, suffix: Option<&str>) -> String {
        let mut out = format!(
            "{}/{}",
            self.creds.base_url.trim_end_matches('/'),
            urlencoding::encode(&self.creds.db)
        );
        if let Some(id) = doc_id {
            out.push('/');
            out.push_str(&urlencoding::encode(id));
        }
        if let Some(suffix) = suffix {
            out.push_str(suffix);
        }
        out
    }

    fn request(
        &self,
        method: reqwest::Method,
        url: &str,
        payload: Option<&Value>,
    ) -> Result<Value, RequestError> {
        debug!(%method, %url, "couchdb request");

        let mut req = self
            .http
            .request(method, url)
            .basic_auth(&self.creds.user, Some(&self.creds.password))
            .header("Content-Type", "application/json");
        if let Some(payload) = payload {
            req = req.json(payload);
        }

        let response = req.send()?;
        let status = response.status();
        debug!(status = status.as_u16(), "couchdb response");

        if !status.is_success() {
            let reason = status.canonical_reason().unwrap_or("").to_string();
            let body = response.text().unwrap_or_default();
            return Err(match status.as_u16() {
                404 => RequestError::NotFound { reason, body },
                409 => RequestError::Conflict { reason, body },
                code => RequestError::Http {
                    status: code,
                    reason,
                    body,
                },
            });
        }

        let raw = response.text()?;
        if raw.is_empty() {
            return Ok(Value::Object(Default::default()));
        }
        serde_json::from_str(&raw).map_err(|e| RequestError::BadResponse(e.to_string()))
    }

    /// Query documents via `_find`. Returns the matched documents with
    /// only the requested fields.
    pub fn find(
        &self,
        selector: &Value,
        limit: usize,
        fields: &[&str],
    ) -> Result<Vec<Document>, RequestError> {
        let query = FindQuery {
            selector,
            limit,
            fields,
        };
        let body = serde_json::to_value(&query)
            .map_err(|e| RequestError::BadResponse(e.to_string()))?;
        let result = self.request(
            reqwest::Method::POST,
            &self.url(None, Some("/_find")),
            Some(&body),
        )?;

        let docs = result
            .get("docs")
            .and_then(Value::as_array)
            .ok_or_else(|| RequestError::BadResponse("_find response has no docs array".into()))?;
        docs.iter()
            .map(|d| {
                d.as_object().cloned().ok_or_else(|| {
                    RequestError::BadResponse("_find returned a non-object doc".into())
                })
            })
            .collect()
    }

    /// Fetch one document by id.
    pub fn get(&self, id: &str) -> Result<Value, RequestError> {
        self.request(reqwest::Method::GET, &self.url(Some(id), None), None)
    }

    /// Fetch every document with full bodies, as the raw `_all_docs`
    /// response (`rows`, `total_rows`, `offset`) so backups are complete.
    pub fn all_docs(&self) -> Result<Value, RequestError> {
        self.request(
            reqwest::Method::GET,
            &self.url(None, Some("/_all_docs?include_docs=true")),
            None,
        )
    }

    /// Full-document overwrite. `doc` must carry the `_rev` being replaced.
    pub fn put(&self, id: &str, doc: &Value) -> Result<Value, RequestError> {
        self.request(reqwest::Method::PUT, &self.url(Some(id), None), Some(doc))
    }

    /// Tombstone a document at the given revision.
    pub fn delete(&self, id: &str, rev: &str) -> Result<Value, RequestError> {
        let suffix = format!("?rev={}", urlencoding::encode(rev));
        self.request(
            reqwest::Method::DELETE,
            &self.url(Some(id), Some(&suffix)),
            None,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn client(base: &str, db: &str) -> DocStoreClient {
        DocStoreClient::new(Credentials {
            base_url: base.to_string(),
            user: "admin".to_string(),
            password: "pw".to_string(),
            db: db.to_string(),
        })
    }

    #[test]
    fn test_url_basic() {
        let c = client("http://127.0.0.1:5984", "obsidian");
        assert_eq!(c.url(None, None), "http://127.0.0.1:5984/obsidian");
        assert_eq!(
            c.url(Some("doc1"), None),
            "http://127.0.0.1:5984/obsidian/doc1"
        );
        assert_eq!(
            c.url(None, Some("/_find")),
            "http://127.0.0.1:5984/obsidian/_find"
        );
    }

    #[test]
    fn test_url_trims_trailing_slash() {
        let c = client("http://127.0.0.1:5984/", "obsidian");
        assert_eq!(c.url(None, None), "http://127.0.0.1:5984/obsidian");
    }

    #[test]
    fn test_url_encodes_segments() {
        let c = client("http://127.0.0.1:5984", "my db");
        assert_eq!(
            c.url(Some("notes/daily.md"), None),
            "http://127.0.0.1:5984/my%20db/notes%2Fdaily.md"
        );
    }

    #[test]
    fn test_find_query_shape() {
        let selector = json!({"type": "newnote"});
        let query = FindQuery {
            selector: &selector,
            limit: 5,
            fields: &["_id", "_rev"],
        };
        assert_eq!(
            serde_json::to_value(&query).unwrap(),
            json!({
                "selector": {"type": "newnote"},
                "limit": 5,
                "fields": ["_id", "_rev"],
            })
        );
    }

    #[test]
    fn test_error_display_includes_body() {
        let err = RequestError::Http {
            status: 500,
            reason: "Internal Server Error".to_string(),
            body: "{\"error\":\"boom\"}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "HTTP 500 Internal Server Error: {\"error\":\"boom\"}"
        );

        let err = RequestError::Conflict {
            reason: "Conflict".to_string(),
            body: "{\"error\":\"conflict\"}".to_string(),
        };
        assert!(err.to_string().contains("HTTP 409"));
    }
}
