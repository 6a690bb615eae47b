//! HTTP-backed remote bookmark client.
//!
//! The actual HTTP stack is abstracted via a trait so different
//! implementations (reqwest, ureq, a platform webview bridge) can be
//! plugged in without touching the engine.

use crate::remote::{RemoteBookmarkClient, RemoteError, RemoteResult};
use parking_lot::RwLock;
use pinsync_protocol::{AckResponse, AddRequest, BookmarkId, ListResponse, ReplaceRequest, UserId};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};

/// HTTP client abstraction.
///
/// Implementations perform one request per call with a bounded timeout
/// and report failures as strings; a timeout should surface a message
/// containing `"timed out"` so it maps to [`RemoteError::Timeout`].
pub trait HttpClient: Send + Sync {
    /// Sends a GET request and returns the response body.
    fn get(&self, url: &str) -> Result<Vec<u8>, String>;

    /// Sends a POST request and returns the response body.
    fn post(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>, String>;

    /// Sends a PUT request and returns the response body.
    fn put(&self, url: &str, body: Vec<u8>) -> Result<Vec<u8>, String>;

    /// Sends a DELETE request and returns the response body.
    fn delete(&self, url: &str) -> Result<Vec<u8>, String>;
}

/// HTTP-based remote bookmark client.
///
/// Maps the four bookmark operations onto a JSON REST surface:
///
/// - `POST   {base}/users/{user}/bookmarks` with an [`AddRequest`]
/// - `DELETE {base}/users/{user}/bookmarks/{id}`
/// - `GET    {base}/users/{user}/bookmarks` returning a [`ListResponse`]
/// - `PUT    {base}/users/{user}/bookmarks` with a [`ReplaceRequest`]
pub struct HttpRemote<C: HttpClient> {
    /// Base URL of the bookmark service (e.g. "https://api.example.com").
    base_url: String,
    client: C,
    connected: AtomicBool,
    last_error: RwLock<Option<String>>,
}

impl<C: HttpClient> HttpRemote<C> {
    /// Creates a new HTTP remote.
    pub fn new(base_url: impl Into<String>, client: C) -> Self {
        Self {
            base_url: base_url.into(),
            client,
            connected: AtomicBool::new(true),
            last_error: RwLock::new(None),
        }
    }

    /// Returns the base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns true if the last request succeeded at the transport level.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// Returns the last transport error message.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    fn bookmarks_url(&self, user: &UserId) -> String {
        format!("{}/users/{}/bookmarks", self.base_url, user.as_str())
    }

    fn transport_error(&self, message: String) -> RemoteError {
        *self.last_error.write() = Some(message.clone());
        self.connected.store(false, Ordering::SeqCst);

        if message.contains("timed out") {
            RemoteError::Timeout
        } else {
            RemoteError::transport_retryable(message)
        }
    }

    fn decode<T: DeserializeOwned>(&self, body: &[u8]) -> RemoteResult<T> {
        serde_json::from_slice(body)
            .map_err(|err| RemoteError::Server(format!("malformed response: {err}")))
    }

    fn encode<T: Serialize>(&self, value: &T) -> RemoteResult<Vec<u8>> {
        serde_json::to_vec(value)
            .map_err(|err| RemoteError::Server(format!("malformed request: {err}")))
    }

    fn expect_ack(&self, body: &[u8]) -> RemoteResult<()> {
        let ack: AckResponse = self.decode(body)?;
        if ack.success {
            self.mark_connected();
            Ok(())
        } else {
            Err(RemoteError::Server(
                ack.error.unwrap_or_else(|| "request rejected".into()),
            ))
        }
    }

    fn mark_connected(&self) {
        self.connected.store(true, Ordering::SeqCst);
        *self.last_error.write() = None;
    }
}

impl<C: HttpClient> RemoteBookmarkClient for HttpRemote<C> {
    fn add(&self, user: &UserId, id: &BookmarkId) -> RemoteResult<()> {
        let body = self.encode(&AddRequest { id: id.clone() })?;
        let response = self
            .client
            .post(&self.bookmarks_url(user), body)
            .map_err(|err| self.transport_error(err))?;
        self.expect_ack(&response)
    }

    fn remove(&self, user: &UserId, id: &BookmarkId) -> RemoteResult<()> {
        let url = format!("{}/{}", self.bookmarks_url(user), id.as_str());
        let response = self
            .client
            .delete(&url)
            .map_err(|err| self.transport_error(err))?;
        self.expect_ack(&response)
    }

    fn list(&self, user: &UserId) -> RemoteResult<BTreeSet<BookmarkId>> {
        let response = self
            .client
            .get(&self.bookmarks_url(user))
            .map_err(|err| self.transport_error(err))?;
        let list: ListResponse = self.decode(&response)?;
        self.mark_connected();
        Ok(list.ids)
    }

    fn replace(&self, user: &UserId, ids: &BTreeSet<BookmarkId>) -> RemoteResult<()> {
        let body = self.encode(&ReplaceRequest { ids: ids.clone() })?;
        let response = self
            .client
            .put(&self.bookmarks_url(user), body)
            .map_err(|err| self.transport_error(err))?;
        self.expect_ack(&response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    /// Replays canned responses and records requests.
    #[derive(Default)]
    struct ScriptedClient {
        responses: Mutex<Vec<Result<Vec<u8>, String>>>,
        requests: Mutex<Vec<String>>,
    }

    impl ScriptedClient {
        fn push_response(&self, response: Result<Vec<u8>, String>) {
            self.responses.lock().push(response);
        }

        fn next(&self, request: String) -> Result<Vec<u8>, String> {
            self.requests.lock().push(request);
            let mut responses = self.responses.lock();
            if responses.is_empty() {
                Err("no scripted response".to_string())
            } else {
                responses.remove(0)
            }
        }
    }

    impl HttpClient for &ScriptedClient {
        fn get(&self, url: &str) -> Result<Vec<u8>, String> {
            self.next(format!("GET {url}"))
        }

        fn post(&self, url: &str, _body: Vec<u8>) -> Result<Vec<u8>, String> {
            self.next(format!("POST {url}"))
        }

        fn put(&self, url: &str, _body: Vec<u8>) -> Result<Vec<u8>, String> {
            self.next(format!("PUT {url}"))
        }

        fn delete(&self, url: &str) -> Result<Vec<u8>, String> {
            self.next(format!("DELETE {url}"))
        }
    }

    fn ack_ok() -> Vec<u8> {
        serde_json::to_vec(&AckResponse::success()).unwrap()
    }

    #[test]
    fn add_posts_to_bookmarks() {
        let client = ScriptedClient::default();
        client.push_response(Ok(ack_ok()));

        let remote = HttpRemote::new("https://api.example.com", &client);
        remote
            .add(&UserId::new("alice"), &BookmarkId::new("org-1"))
            .unwrap();

        assert_eq!(
            client.requests.lock().as_slice(),
            ["POST https://api.example.com/users/alice/bookmarks"]
        );
    }

    #[test]
    fn remove_deletes_by_id() {
        let client = ScriptedClient::default();
        client.push_response(Ok(ack_ok()));

        let remote = HttpRemote::new("https://api.example.com", &client);
        remote
            .remove(&UserId::new("alice"), &BookmarkId::new("org-1"))
            .unwrap();

        assert_eq!(
            client.requests.lock().as_slice(),
            ["DELETE https://api.example.com/users/alice/bookmarks/org-1"]
        );
    }

    #[test]
    fn list_parses_ids() {
        let client = ScriptedClient::default();
        client.push_response(Ok(br#"{"ids":["org-1","org-2"]}"#.to_vec()));

        let remote = HttpRemote::new("https://api.example.com", &client);
        let ids = remote.list(&UserId::new("alice")).unwrap();

        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&BookmarkId::new("org-2")));
    }

    #[test]
    fn transport_failure_is_retryable() {
        let client = ScriptedClient::default();
        client.push_response(Err("connection reset".to_string()));

        let remote = HttpRemote::new("https://api.example.com", &client);
        let err = remote.list(&UserId::new("alice")).unwrap_err();

        assert!(err.is_retryable());
        assert!(!remote.is_connected());
        assert_eq!(remote.last_error(), Some("connection reset".to_string()));
    }

    #[test]
    fn timeout_message_maps_to_timeout() {
        let client = ScriptedClient::default();
        client.push_response(Err("request timed out after 5s".to_string()));

        let remote = HttpRemote::new("https://api.example.com", &client);
        let err = remote.list(&UserId::new("alice")).unwrap_err();

        assert!(matches!(err, RemoteError::Timeout));
    }

    #[test]
    fn server_rejection_surfaces_message() {
        let client = ScriptedClient::default();
        client.push_response(Ok(
            serde_json::to_vec(&AckResponse::error("quota exceeded")).unwrap()
        ));

        let remote = HttpRemote::new("https://api.example.com", &client);
        let err = remote
            .add(&UserId::new("alice"), &BookmarkId::new("org-1"))
            .unwrap_err();

        assert!(matches!(err, RemoteError::Server(message) if message == "quota exceeded"));
    }

    #[test]
    fn malformed_response_is_server_error() {
        let client = ScriptedClient::default();
        client.push_response(Ok(b"not json".to_vec()));

        let remote = HttpRemote::new("https://api.example.com", &client);
        let err = remote.list(&UserId::new("alice")).unwrap_err();

        assert!(matches!(err, RemoteError::Server(_)));
    }

    #[test]
    fn success_restores_connected_state() {
        let client = ScriptedClient::default();
        client.push_response(Err("connection reset".to_string()));
        client.push_response(Ok(br#"{"ids":[]}"#.to_vec()));

        let remote = HttpRemote::new("https://api.example.com", &client);
        assert!(remote.list(&UserId::new("alice")).is_err());
        assert!(!remote.is_connected());

        remote.list(&UserId::new("alice")).unwrap();
        assert!(remote.is_connected());
        assert!(remote.last_error().is_none());
    }
}
