//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//! - `AuthorizationUi` as a console prompt: the authorization URL is printed,
//!   the user signs in with any browser and pastes back the final redirect URL
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{ConsoleAuthorizationUi, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let ui = ConsoleAuthorizationUi::new();
//!
//!     // Use in core configuration
//! }
//! ```

mod auth_ui;
mod http;

pub use auth_ui::ConsoleAuthorizationUi;
pub use http::ReqwestHttpClient;
