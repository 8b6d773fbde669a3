//! # User API
//!
//! `user-api` is a thin client for the remote user management service
//! (`service.UserService`). It owns the gRPC connection, applies a bounded
//! timeout to every call and translates between the domain model in
//! [`models`] and the generated protobuf messages from `user-proto`.
//!
//! ## Key Components
//!
//! * **[`UsersApi`]:** The facade. One async method per remote procedure
//!   (sign up, sign in, auth check, lookup, update, create) plus a serialized
//!   health check and an idempotent [`UsersApi::close`].
//! * **[`ClientConfig`]:** Address, per-call timeout, keepalive and health
//!   service settings, fixed at construction.
//! * **[`User`] & [`UpdateUserRequest`]:** The domain model. An update only
//!   carries the fields that should change.
//!
//! ## Errors
//!
//! * [`ConnectError`]: the transport could not be set up.
//! * [`RequestError`]: a remote call failed, timed out, or the client was closed.
//!   It always names the failing [`Operation`].
//! * [`HealthCheckError`]: either a [`RequestError`] or a reachable service
//!   that reported a non-serving status.
//!
//! ## Example
//!
//! ```rust,no_run
//! use user_api::{ClientConfig, UsersApi};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let api = UsersApi::connect(ClientConfig::new("localhost:50051")).await?;
//!
//! let token = api.sign_in("a@b.com", b"pw").await?;
//! let user = api.check_auth(&token).await?;
//! println!("signed in as {}", user.username);
//!
//! api.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Logging
//!
//! The crate emits [`tracing`] events and never installs a subscriber.
//! Passwords and tokens are never logged.
pub mod client;
pub mod config;
pub mod models;

pub use client::{
    ConnectError, HealthCheckError, Operation, RequestError, RequestErrorKind, UsersApi,
};
pub use config::{ClientConfig, KeepaliveConfig};
pub use models::{UpdateUserRequest, User};

// Re-exports
pub use tonic;
pub use user_proto::pb;
pub use uuid;

/// Type alias for the standard boxed error used in generic bounds.
type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
