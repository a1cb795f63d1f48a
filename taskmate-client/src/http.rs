//! JSON-over-HTTP remote document store.
//!
//! Routes, relative to the base URL:
//!
//! | call   | request                         | success            |
//! |--------|---------------------------------|--------------------|
//! | list   | `GET    /{collection}`          | `[StoredDocument]` |
//! | get    | `GET    /{collection}/{id}`     | `StoredDocument`, 404 when absent |
//! | add    | `POST   /{collection}`          | `{"id": "..."}`    |
//! | set    | `PUT    /{collection}/{id}`     | any 2xx            |
//! | patch  | `PATCH  /{collection}/{id}`     | any 2xx, 404 when absent |
//! | delete | `DELETE /{collection}/{id}`     | any 2xx or 404     |
//!
//! Collection names and ids are percent-encoded as single path segments.

use crate::remote::RemoteTaskStore;
use async_trait::async_trait;
use reqwest::{Client as HttpClient, RequestBuilder, Response, StatusCode, Url};
use serde::Deserialize;
use std::time::Duration;
use taskmate_core::{FieldPatch, StoreError, StoredDocument, TaskDocument};

#[derive(Debug, Deserialize)]
struct AddResponse {
    id: String,
}

pub struct HttpStore {
    http: HttpClient,
    base_url: Url,
    token: Option<String>,
}

impl HttpStore {
    pub fn new(
        base_url: &str,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url.trim_end_matches('/'))
            .map_err(|e| StoreError::Transport(format!("invalid base URL {}: {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::Transport(format!(
                "invalid base URL {}: cannot hold a path",
                base_url
            )));
        }

        let http = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| StoreError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn url(&self, segments: &[&str]) -> Result<Url, StoreError> {
        // `.` and `..` would be dropped or resolved instead of sent as names.
        if let Some(bad) = segments.iter().find(|s| matches!(**s, "" | "." | "..")) {
            return Err(StoreError::Rejected(format!(
                "{:?} is not a valid document path segment",
                bad
            )));
        }

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| StoreError::Transport(format!("{} cannot hold a path", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn collection_url(&self, collection: &str) -> Result<Url, StoreError> {
        self.url(&[collection])
    }

    fn document_url(&self, collection: &str, id: &str) -> Result<Url, StoreError> {
        self.url(&[collection, id])
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, StoreError> {
        let request = match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        request
            .send()
            .await
            .map_err(|e| StoreError::Transport(e.to_string()))
    }
}

async fn status_error(response: Response) -> StoreError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
    StoreError::Status { status, message }
}

async fn expect_success(response: Response) -> Result<Response, StoreError> {
    if response.status().is_success() {
        Ok(response)
    } else {
        Err(status_error(response).await)
    }
}

async fn decode<T: serde::de::DeserializeOwned>(response: Response) -> Result<T, StoreError> {
    response
        .json::<T>()
        .await
        .map_err(|e| StoreError::Decode(e.to_string()))
}

#[async_trait]
impl RemoteTaskStore for HttpStore {
    async fn list(&self, collection: &str) -> Result<Vec<StoredDocument>, StoreError> {
        let response = self
            .send(self.http.get(self.collection_url(collection)?))
            .await?;
        decode(expect_success(response).await?).await
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Option<StoredDocument>, StoreError> {
        let response = self
            .send(self.http.get(self.document_url(collection, id)?))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        decode(expect_success(response).await?).await.map(Some)
    }

    async fn add(&self, collection: &str, document: TaskDocument) -> Result<String, StoreError> {
        let response = self
            .send(self.http.post(self.collection_url(collection)?).json(&document))
            .await?;
        let created: AddResponse = decode(expect_success(response).await?).await?;
        Ok(created.id)
    }

    async fn set(
        &self,
        collection: &str,
        id: &str,
        document: TaskDocument,
    ) -> Result<(), StoreError> {
        let response = self
            .send(self.http.put(self.document_url(collection, id)?).json(&document))
            .await?;
        expect_success(response).await?;
        Ok(())
    }

    async fn patch(&self, collection: &str, id: &str, patch: FieldPatch) -> Result<(), StoreError> {
        let response = self
            .send(self.http.patch(self.document_url(collection, id)?).json(&patch))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::NotFound(id.to_string()));
        }
        expect_success(response).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let response = self
            .send(self.http.delete(self.document_url(collection, id)?))
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        expect_success(response).await?;
        Ok(())
    }
}
