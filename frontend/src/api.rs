//! REST client for the community hub API.
//!
//! Every call enforces the envelope contract, and every payload is
//! id-normalized before it is decoded. Stores depend on the
//! [`CommentService`] and [`ResourceService`] traits rather than on the HTTP
//! client itself.

use async_trait::async_trait;
use community_hub_shared::{
    normalize_payload_ids, ApiEnvelope, Comment, CommentPatch, CommentQuery, ListQuery,
    NewComment, Pagination, Resource,
};
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::{config::ClientConfig, error::ClientError};

/// One page of a list response.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    /// Records of this page, ids normalized.
    pub items: Vec<T>,
    /// Normalized pagination metadata.
    pub pagination: Pagination,
}

/// Comment endpoints of the API.
#[async_trait]
pub trait CommentService: Send + Sync {
    /// `GET /comments` with the query as URL parameters.
    async fn list_comments(&self, query: &CommentQuery) -> Result<Page<Comment>, ClientError>;
    /// `GET /comments/:id/replies`.
    async fn list_replies(&self, parent_id: &str) -> Result<Vec<Comment>, ClientError>;
    /// `POST /comments`.
    async fn create_comment(&self, comment: &NewComment) -> Result<Comment, ClientError>;
    /// `PUT /comments/:id`.
    async fn update_comment(&self, id: &str, patch: CommentPatch)
        -> Result<Comment, ClientError>;
    /// `DELETE /comments/:id`.
    async fn delete_comment(&self, id: &str) -> Result<(), ClientError>;
}

/// CRUD over one REST collection. Bodies are pre-serialized JSON so the trait
/// stays object safe.
#[async_trait]
pub trait ResourceService<R: Resource>: Send + Sync {
    /// `GET /{path}`.
    async fn list(&self, query: &ListQuery) -> Result<Page<R>, ClientError>;
    /// `GET /{path}/:id`.
    async fn get(&self, id: &str) -> Result<R, ClientError>;
    /// `POST /{path}`.
    async fn create(&self, body: &Value) -> Result<R, ClientError>;
    /// `PUT /{path}/:id`.
    async fn update(&self, id: &str, body: &Value) -> Result<R, ClientError>;
    /// `DELETE /{path}/:id`.
    async fn delete(&self, id: &str) -> Result<(), ClientError>;
}

/// HTTP implementation of every service trait.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    api_base: String,
    api_token: Option<String>,
}

impl ApiClient {
    /// Build a client with its own connection pool.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = Client::builder()
            .user_agent(concat!("community-hub/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self::with_client(http, config))
    }

    /// Reuse an existing `reqwest` client.
    pub fn with_client(http: Client, config: &ClientConfig) -> Self {
        Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        }
    }

    /// Base URL without a trailing slash.
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    fn url(&self, segments: &[&str]) -> String {
        let mut url = self.api_base.clone();
        for segment in segments {
            url.push('/');
            url.push_str(&urlencoding::encode(segment));
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header("Cache-Control", "no-cache");
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    /// Send a request and validate the response envelope.
    ///
    /// `success: false` always fails, whatever the status code. A body that
    /// is not an envelope is an HTTP error on non-2xx and a protocol error
    /// otherwise.
    async fn execute(&self, request: RequestBuilder) -> Result<ApiEnvelope, ClientError> {
        let response = self.authorize(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        let envelope: ApiEnvelope = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(err) if status.is_success() => {
                return Err(ClientError::Protocol(format!("invalid response envelope: {err}")));
            },
            Err(_) => {
                return Err(ClientError::Http {
                    status: status.as_u16(),
                });
            },
        };

        if !envelope.success {
            tracing::debug!("api reported failure ({status}): {:?}", envelope.message);
            let field_errors = envelope.field_errors().into();
            return Err(ClientError::application(envelope.message, field_errors));
        }
        if !status.is_success() {
            return Err(ClientError::Http {
                status: status.as_u16(),
            });
        }
        Ok(envelope)
    }

    /// Like [`Self::execute`] but requires `data` and normalizes its ids.
    async fn execute_data(&self, request: RequestBuilder) -> Result<Value, ClientError> {
        let envelope = self.execute(request).await?;
        let mut data = envelope
            .data
            .ok_or_else(|| ClientError::Protocol("response is missing `data`".to_string()))?;
        normalize_payload_ids(&mut data);
        Ok(data)
    }

    async fn fetch_page<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        key: &str,
    ) -> Result<Page<T>, ClientError> {
        let mut data = self.execute_data(request).await?;
        let items: Vec<T> = take_field(&mut data, key)?;
        let pagination = match data.get_mut("pagination").map(Value::take) {
            Some(Value::Null) | None => Pagination::single_page(items.len() as u64),
            Some(raw) => serde_json::from_value::<Pagination>(raw)
                .map_err(|err| ClientError::Protocol(format!("invalid pagination: {err}")))?
                .normalized(),
        };
        Ok(Page {
            items,
            pagination,
        })
    }

    async fn fetch_item<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        key: &str,
    ) -> Result<T, ClientError> {
        let mut data = self.execute_data(request).await?;
        take_field(&mut data, key)
    }
}

fn take_field<T: DeserializeOwned>(data: &mut Value, key: &str) -> Result<T, ClientError> {
    let raw = data
        .get_mut(key)
        .map(Value::take)
        .ok_or_else(|| ClientError::Protocol(format!("response data is missing `{key}`")))?;
    serde_json::from_value(raw)
        .map_err(|err| ClientError::Protocol(format!("invalid `{key}` payload: {err}")))
}

#[async_trait]
impl CommentService for ApiClient {
    async fn list_comments(&self, query: &CommentQuery) -> Result<Page<Comment>, ClientError> {
        let url = self.url(&[Comment::PATH]);
        tracing::debug!("GET {url} {:?}", query);
        let request = self.http.get(&url).query(&query.to_query_pairs());
        self.fetch_page(request, Comment::COLLECTION_KEY).await
    }

    async fn list_replies(&self, parent_id: &str) -> Result<Vec<Comment>, ClientError> {
        let url = self.url(&[Comment::PATH, parent_id, "replies"]);
        tracing::debug!("GET {url}");
        let page: Page<Comment> =
            self.fetch_page(self.http.get(&url), Comment::COLLECTION_KEY).await?;
        Ok(page.items)
    }

    async fn create_comment(&self, comment: &NewComment) -> Result<Comment, ClientError> {
        let url = self.url(&[Comment::PATH]);
        tracing::debug!("POST {url}");
        self.fetch_item(self.http.post(&url).json(comment), Comment::ITEM_KEY)
            .await
    }

    async fn update_comment(
        &self,
        id: &str,
        patch: CommentPatch,
    ) -> Result<Comment, ClientError> {
        let url = self.url(&[Comment::PATH, id]);
        tracing::debug!("PUT {url} {:?}", patch);
        self.fetch_item(self.http.put(&url).json(&patch), Comment::ITEM_KEY)
            .await
    }

    async fn delete_comment(&self, id: &str) -> Result<(), ClientError> {
        let url = self.url(&[Comment::PATH, id]);
        tracing::debug!("DELETE {url}");
        self.execute(self.http.delete(&url)).await.map(|_| ())
    }
}

#[async_trait]
impl<R: Resource> ResourceService<R> for ApiClient {
    async fn list(&self, query: &ListQuery) -> Result<Page<R>, ClientError> {
        let url = self.url(&[R::PATH]);
        tracing::debug!("GET {url} {:?}", query);
        let request = self.http.get(&url).query(&query.to_query_pairs());
        self.fetch_page(request, R::COLLECTION_KEY).await
    }

    async fn get(&self, id: &str) -> Result<R, ClientError> {
        let url = self.url(&[R::PATH, id]);
        tracing::debug!("GET {url}");
        self.fetch_item(self.http.get(&url), R::ITEM_KEY).await
    }

    async fn create(&self, body: &Value) -> Result<R, ClientError> {
        let url = self.url(&[R::PATH]);
        tracing::debug!("POST {url}");
        self.fetch_item(self.http.post(&url).json(body), R::ITEM_KEY)
            .await
    }

    async fn update(&self, id: &str, body: &Value) -> Result<R, ClientError> {
        let url = self.url(&[R::PATH, id]);
        tracing::debug!("PUT {url}");
        self.fetch_item(self.http.put(&url).json(body), R::ITEM_KEY)
            .await
    }

    async fn delete(&self, id: &str) -> Result<(), ClientError> {
        let url = self.url(&[R::PATH, id]);
        tracing::debug!("DELETE {url}");
        self.execute(self.http.delete(&url)).await.map(|_| ())
    }
}
