//! # Viewfeed
//!
//! Client for a small social feed of "views": text posts with optional
//! media, live updates over a WebSocket, per-view likes and comments.
//!
//! ## Features
//!
//! - **Feed loading**: first page of views, newest on top
//! - **Posting**: multipart upload of text and an optional media file
//! - **Likes**: local liked-set mirrored onto upvote/downvote calls
//! - **Comments**: optimistic append of the locally typed text
//! - **Real-time**: push events for new views and comments
//!
//! ## Modules
//!
//! - [`api`]: REST client for the feed backend
//! - [`feed`]: document model, rendering and user actions
//! - [`realtime`]: push channel listener
//! - [`config`]: TOML and environment configuration
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use viewfeed::{ApiClient, Config, FeedClient, Notifier, RealtimeListener, ReconnectPolicy};
//!
//! struct Stderr;
//!
//! impl Notifier for Stderr {
//!     fn alert(&self, message: &str) {
//!         eprintln!("{}", message);
//!     }
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load_default();
//!     let api = ApiClient::new(&config.backend)?;
//!     let base = api.base_url().to_string();
//!
//!     let client = FeedClient::new(Arc::new(api), Arc::new(Stderr), base, config.backend.page_size);
//!     client.load_feed().await;
//!
//!     let listener = RealtimeListener::new(config.ws_url(), ReconnectPolicy::never())?;
//!     listener.spawn(Arc::new(client.clone()));
//!
//!     client.compose("hello from rust", None).await;
//!     client.post_view().await;
//!
//!     println!("{}", client.render_text().await);
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod config;
pub mod feed;
pub mod realtime;

pub use api::{ApiClient, ApiError, ApiResult, Comment, FeedBackend, MediaFile, NewView, View};

pub use config::{
    BackendConfig, Config, ConfigError, LoggingConfig, RealtimeConfig, generate_default_config,
};

pub use feed::{
    CommentOutcome, FeedClient, FeedDocument, FeedLoad, FeedState, LikeOutcome, LikeState,
    Notifier, PostOutcome, Session, ViewNode,
};

pub use realtime::{CommentAdded, PushEvent, PushSink, RealtimeError, RealtimeListener, ReconnectPolicy};
