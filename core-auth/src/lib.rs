//! # Authentication Module
//!
//! OAuth 2.0 sign-in for OneDrive accounts.
//!
//! ## Overview
//!
//! This crate turns an interactive authorization (presented by the host
//! through [`AuthorizationUi`](bridge_traits::AuthorizationUi)) into an
//! [`AuthenticatedAccount`]: the tokens, the account type and the API root the
//! account talks to.
//!
//! ## Features
//!
//! - OAuth 2.0 authorization code flow with PKCE
//! - Token refresh
//! - Microsoft account sign-out
//! - [`Authenticator`] seam so hosts and tests can substitute their own flow

pub mod authenticator;
pub mod error;
pub mod oauth;
pub mod types;

pub use authenticator::{Authenticator, MsaAuthenticator};
pub use error::{AuthError, Result};
pub use oauth::{AuthorizationCode, OAuthConfig, OAuthFlowManager, PkceVerifier};
pub use types::{AccountType, AuthenticatedAccount, OAuthTokens};
