//! # Host Bridge Traits
//!
//! Platform abstraction traits that each host must implement.
//!
//! ## Overview
//!
//! This crate defines the contract between the OneDrive session core and
//! platform-specific code. Each trait is a capability the core needs but that
//! differs per platform (desktop, Android, iOS).
//!
//! ## Traits
//!
//! - [`HttpClient`](http::HttpClient) - Async HTTP with buffered and streamed bodies
//! - [`AuthorizationUi`](auth::AuthorizationUi) - Interactive OAuth sign-in page
//! - [`LoggerSink`](logging::LoggerSink) - Forward structured logs to host logging
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate |
//! |----------|---------------------|
//! | Desktop  | `bridge-desktop`    |
//! | Android  | host application    |
//!
//! ## Error Handling
//!
//! All bridge traits use [`BridgeError`](error::BridgeError). Implementations
//! should convert platform errors into it and keep remote error bodies intact.
//!
//! ## Thread Safety
//!
//! All bridge traits require `Send + Sync` so that a single implementation can
//! be shared across async tasks behind an `Arc`.

pub mod auth;
pub mod error;
pub mod http;
pub mod logging;

pub use error::BridgeError;

pub use auth::{AuthorizationRequest, AuthorizationUi};
pub use http::{ByteStream, HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use logging::{ConsoleLogger, LogEntry, LogLevel, LoggerSink};
