//! Interactive Authorization Abstraction
//!
//! The OAuth authorization step needs a browser or web view owned by the
//! host. The core hands the host an [`AuthorizationRequest`] and waits for the
//! URL the provider finally redirected to.

use async_trait::async_trait;

use crate::error::Result;

/// A pending interactive authorization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// Fully built authorization URL to present to the user
    pub authorization_url: String,
    /// Redirect URI registered for the client; the flow is complete once the
    /// user agent navigates to a URL starting with it
    pub redirect_uri: String,
}

/// Host-side presenter for interactive sign-in.
///
/// - **Android/iOS**: an embedded web view or custom tab
/// - **Desktop**: system browser plus a loopback listener, or a console prompt
///
/// Implementations return the full redirect URL (including query string and
/// fragment) untouched; parsing the authorization response is the caller's job.
/// A user who dismisses the page should produce
/// [`BridgeError::Cancelled`](crate::error::BridgeError::Cancelled).
#[async_trait]
pub trait AuthorizationUi: Send + Sync {
    async fn authorize(&self, request: AuthorizationRequest) -> Result<String>;
}
