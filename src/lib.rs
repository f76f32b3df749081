//! # ttl-session: server-side sessions with storage-enforced expiry
//!
//! `ttl-session` keeps per-client state on the server, keyed by an
//! unguessable session id that travels in a cookie. Expiry is delegated to the
//! storage engine's TTL, so an expired session and an unknown one look exactly
//! the same and no background sweeper is needed.
//!
//! # Quick Start
//!
//! Here's a basic example with [Axum](https://docs.rs/axum/latest/axum/).
//!
//! ```rust,no_run
//! use axum::{Router, routing::get};
//! use serde::{Deserialize, Serialize};
//! use tower_cookies::{CookieManagerLayer, Cookies};
//! use ttl_session::{Config, SessionContext, SessionLayer, SessionStore};
//!
//! #[derive(Clone, Debug, Serialize, Deserialize)]
//! struct User {
//!     id: i64,
//!     name: String,
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     // Sessions are kept in ./session_data/sessions.db
//!     let store = SessionStore::open(Config::build()).unwrap();
//!
//!     let login_store = store.clone();
//!     let app = Router::new()
//!         .route("/login", get(move |cookies: Cookies| async move {
//!             let user = User { id: 1, name: "Jane".to_string() };
//!             login_store.create_with_cookie(&cookies, &user).await.unwrap();
//!             "logged in"
//!         }))
//!         .route("/", get(|context: SessionContext| async move {
//!             match context.get::<User>("session") {
//!                 Some(user) => format!("hello {}", user.name),
//!                 None => "hello stranger".to_string(),
//!             }
//!         }))
//!         .layer(SessionLayer::<User>::new(store))
//!         .layer(CookieManagerLayer::new()); // CookieManagerLayer must be after
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await.unwrap();
//!     axum::serve(listener, app).await.unwrap();
//! }
//! ```
//!
//! # Session Lifecycle
//!
//! ```rust,no_run
//! use ttl_session::{Config, Error, SessionStore};
//!
//! # async fn run() -> ttl_session::Result<()> {
//! let store = SessionStore::open(Config::build().in_memory(true))?;
//!
//! // Create a session; it expires `session_length` from now.
//! let id = store.create(&"hello").await?;
//!
//! // Read it back. With `extend_sessions` (the default) every successful
//! // read pushes the expiry forward by `session_length`.
//! let value: String = store.get(&id).await?;
//!
//! // Delete it. Deleting twice is fine.
//! store.delete(&id).await?;
//! assert!(matches!(store.get::<String>(&id).await, Err(Error::NotFound)));
//!
//! // Release the engine on shutdown.
//! store.close().await?;
//! # Ok(())
//! # }
//! ```
//!
//! With a `tower_cookies::Cookies` jar at hand, the `*_with_cookie` variants
//! ([`create_with_cookie`](SessionStore::create_with_cookie),
//! [`get_with_cookie`](SessionStore::get_with_cookie),
//! [`delete_with_cookie`](SessionStore::delete_with_cookie)) read the session
//! id from the request cookie and write the refreshed or cleared cookie to the
//! response.
//!
//! # Storage Engines
//!
//! [`SessionStore::open`] picks a local engine from the [`Config`]:
//!
//! - `in_memory(false)` (default): a SQLite database at
//!   `{directory}/sessions.db`. Sessions survive restarts.
//! - `in_memory(true)`: a concurrent in-process map. Nothing is persisted.
//!
//! Any other [`StorageEngine`](engine::StorageEngine) can be plugged in with
//! [`SessionStore::with_engine`]. The `redis-store` feature provides
//! [`RedisEngine`](engine::RedisEngine):
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use fred::clients::Client;
//! use ttl_session::engine::RedisEngine;
//! use ttl_session::{Config, SessionStore};
//!
//! let client = Client::default();
//! let store = SessionStore::with_engine(RedisEngine::new(Arc::new(client)), Config::build())?;
//! ```
//!
//! ## Serialization
//! Payloads are stored as opaque bytes produced by one of two serde backends:
//!
//! - [`bincode`](https://crates.io/crates/bincode) (default) - Fast, compact binary serialization.
//! - [`rmp-serde`](https://crates.io/crates/rmp-serde) (MessagePack) - Cross-language compatible serialization.
//!
//! ```toml
//! [dependencies]
//! ttl-session = { version = "0.1", default-features = false, features = ["axum", "messagepack"] }
//! ```
//!
//! ## Cookie Configuration
//!
//! ```rust
//! use std::time::Duration;
//! use ttl_session::Config;
//! use ttl_session::cookie::SameSite;
//!
//! let config = Config::build()
//!     .cookie_name("my_session_cookie")
//!     .cookie_http_only(true)
//!     .cookie_same_site(SameSite::Strict)
//!     .cookie_secure(true) // Set to true in production
//!     .session_length(Duration::from_secs(7200)) // 2 hours
//!     .cookie_path("/")
//!     .cookie_domain("example.com");
//! ```
//!
//! # Important Notes
//!
//! ## Middleware Ordering
//! The `SessionLayer` must be applied **before** the `CookieManagerLayer` so
//! that the cookie manager wraps it.
//!
//! ## Fail-open
//! `SessionLayer` never rejects a request. If there is no cookie, the session
//! expired or the stored payload does not decode as the layer's type, the
//! request reaches the handler without a session value.

pub use cookie;
pub use tower_cookies;

mod codec;

mod config;
pub use config::Config;

mod context;
pub use context::SessionContext;

pub mod engine;

mod error;
pub use error::{Error, Result};

#[cfg(feature = "axum")]
mod extract;

mod id;
pub use id::Id;

mod service;
pub use service::*;

mod store;
pub use store::SessionStore;

mod transport;
