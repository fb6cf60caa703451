//! Firebase Realtime Database REST client.

use reqwest::{Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{DocumentStore, StoreError, path_segments};

/// Document store backed by the Realtime Database REST API.
///
/// Every path maps to `{base_url}/{path}.json`. When an auth token is
/// configured it is sent as the `auth` query parameter.
pub struct FirebaseStore {
    base_url: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl FirebaseStore {
    /// Creates a client for the database at `base_url`
    /// (e.g. `https://my-app.firebaseio.com`).
    #[must_use]
    pub fn new(base_url: &str, auth_token: Option<String>) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
            client: reqwest::Client::new(),
        }
    }

    /// The REST endpoint for `path`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::InvalidPath`] if the path is invalid.
    pub fn url_for(&self, path: &str) -> Result<String, StoreError> {
        let segments = path_segments(path)?;
        Ok(format!("{}/{}.json", self.base_url, segments.join("/")))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, StoreError> {
        let mut builder = self.client.request(method, self.url_for(path)?);
        if let Some(token) = &self.auth_token {
            builder = builder.query(&[("auth", token)]);
        }
        Ok(builder)
    }

    async fn send(builder: RequestBuilder) -> Result<Response, StoreError> {
        let resp = builder.send().await?;
        let status = resp.status();

        if status.is_success() {
            return Ok(resp);
        }

        let body = resp.text().await.unwrap_or_default();
        let message = serde_json::from_str::<FirebaseError>(&body)
            .map_or(body, |e| e.error);

        Err(StoreError::Status {
            status: status.as_u16(),
            message,
        })
    }
}

/// Error body returned by the REST API.
#[derive(Deserialize)]
struct FirebaseError {
    error: String,
}

/// Body returned by a `POST`.
#[derive(Deserialize)]
struct PushResponse {
    name: String,
}

#[async_trait::async_trait]
impl DocumentStore for FirebaseStore {
    async fn get(&self, path: &str) -> Result<Option<Value>, StoreError> {
        let resp = Self::send(self.request(Method::GET, path)?).await?;
        let body = resp.text().await?;

        let value: Value = serde_json::from_str(&body)?;
        Ok(if value.is_null() { None } else { Some(value) })
    }

    async fn set(&self, path: &str, value: Value) -> Result<(), StoreError> {
        Self::send(self.request(Method::PUT, path)?.json(&value)).await?;
        log::debug!("Set {path}");
        Ok(())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> Result<(), StoreError> {
        Self::send(self.request(Method::PATCH, path)?.json(&fields)).await?;
        log::debug!("Updated {path}");
        Ok(())
    }

    async fn push(&self, path: &str, value: Value) -> Result<String, StoreError> {
        let resp = Self::send(self.request(Method::POST, path)?.json(&value)).await?;
        let body = resp.text().await?;
        let pushed: PushResponse = serde_json::from_str(&body)?;
        log::debug!("Pushed {path}/{}", pushed.name);
        Ok(pushed.name)
    }

    async fn delete(&self, path: &str) -> Result<(), StoreError> {
        Self::send(self.request(Method::DELETE, path)?).await?;
        log::debug!("Deleted {path}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_end_in_json() {
        let store = FirebaseStore::new("https://kintr-demo.firebaseio.com/", None);
        assert_eq!(
            store.url_for("users").unwrap(),
            "https://kintr-demo.firebaseio.com/users.json"
        );
        assert_eq!(
            store.url_for("/users/abc/").unwrap(),
            "https://kintr-demo.firebaseio.com/users/abc.json"
        );
        assert_eq!(
            store.url_for("").unwrap(),
            "https://kintr-demo.firebaseio.com/.json"
        );
    }

    #[test]
    fn invalid_paths_fail_before_sending() {
        let store = FirebaseStore::new("https://kintr-demo.firebaseio.com", None);
        assert!(matches!(
            store.url_for("users/a.b"),
            Err(StoreError::InvalidPath { .. })
        ));
    }
}
