//! Feed Backend REST Client
//!
//! HTTP client for the feed backend's REST endpoints.

use async_trait::async_trait;
use reqwest::{multipart, Client, Response};

use super::dto::{ErrorBody, NewComment, NewView, View, ViewsPage};
use super::error::{ApiError, ApiResult};
use crate::config::BackendConfig;

/// Operations the feed client needs from its backend
#[async_trait]
pub trait FeedBackend: Send + Sync {
    /// `GET /views?page=&page_size=`
    async fn fetch_views(&self, page: u32, page_size: u32) -> ApiResult<Vec<View>>;

    /// `POST /submit` (multipart)
    async fn submit_view(&self, view: NewView) -> ApiResult<()>;

    /// `POST /upvote/{id}`
    async fn upvote(&self, view_id: &str) -> ApiResult<()>;

    /// `POST /downvote/{id}`
    async fn downvote(&self, view_id: &str) -> ApiResult<()>;

    /// `POST /comment/{id}`
    async fn add_comment(&self, view_id: &str, text: &str) -> ApiResult<()>;
}

/// reqwest-backed implementation of [`FeedBackend`]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a new client for the configured backend
    pub fn new(config: &BackendConfig) -> ApiResult<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.request_timeout_secs {
            builder = builder.timeout(std::time::Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Backend base URL without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn view_url(&self, action: &str, view_id: &str) -> String {
        self.url(&format!("/{}/{}", action, urlencoding::encode(view_id)))
    }

    async fn post_empty(&self, url: String) -> ApiResult<()> {
        let response = self.client.post(&url).send().await?;
        check_status(response).await.map(|_| ())
    }
}

/// Pass 2xx responses through; turn anything else into an [`ApiError`]
async fn check_status(response: Response) -> ApiResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.bytes().await.unwrap_or_default();
    match serde_json::from_slice::<ErrorBody>(&body) {
        Ok(error) => Err(ApiError::Rejected {
            status: status.as_u16(),
            detail: error.message(),
        }),
        Err(_) => Err(ApiError::UnexpectedStatus {
            status: status.as_u16(),
        }),
    }
}

#[async_trait]
impl FeedBackend for ApiClient {
    async fn fetch_views(&self, page: u32, page_size: u32) -> ApiResult<Vec<View>> {
        let response = self
            .client
            .get(self.url("/views"))
            .query(&[("page", page), ("page_size", page_size)])
            .send()
            .await?;

        let body = check_status(response).await?.bytes().await?;
        let page: ViewsPage =
            serde_json::from_slice(&body).map_err(|e| ApiError::Decode(e.to_string()))?;

        Ok(page.views)
    }

    async fn submit_view(&self, view: NewView) -> ApiResult<()> {
        let mut form = multipart::Form::new().text("text", view.text);

        if let Some(media) = view.media {
            let part = multipart::Part::bytes(media.bytes)
                .file_name(media.file_name)
                .mime_str(&media.mime)?;
            form = form.part("file", part);
        }

        let response = self
            .client
            .post(self.url("/submit"))
            .multipart(form)
            .send()
            .await?;

        check_status(response).await.map(|_| ())
    }

    async fn upvote(&self, view_id: &str) -> ApiResult<()> {
        self.post_empty(self.view_url("upvote", view_id)).await
    }

    async fn downvote(&self, view_id: &str) -> ApiResult<()> {
        self.post_empty(self.view_url("downvote", view_id)).await
    }

    async fn add_comment(&self, view_id: &str, text: &str) -> ApiResult<()> {
        let response = self
            .client
            .post(self.view_url("comment", view_id))
            .json(&NewComment { text })
            .send()
            .await?;

        check_status(response).await.map(|_| ())
    }
}
