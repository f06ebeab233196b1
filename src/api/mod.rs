//! Feed Backend API
//!
//! Client side of the feed backend's REST interface.
//!
//! # Endpoints
//!
//! - `GET /views?page=&page_size=` - Page of views
//! - `POST /submit` - New view (multipart: `text`, optional `file`)
//! - `POST /upvote/{id}` - Increment a view's upvotes
//! - `POST /downvote/{id}` - Decrement a view's upvotes
//! - `POST /comment/{id}` - Add a comment (JSON `{ text }`)
//!
//! Non-2xx responses carry a JSON body `{ "detail": ... }`.

pub mod client;
pub mod dto;
pub mod error;

pub use client::{ApiClient, FeedBackend};
pub use dto::{Comment, MediaFile, NewView, View};
pub use error::{ApiError, ApiResult};
