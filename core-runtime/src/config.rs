//! # Core Configuration Module
//!
//! Provides configuration management for the OneDrive session core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance holding the OAuth client registration, the service endpoints and
//! the host bridges. It enforces fail-fast validation so that a session is
//! never created with an unusable configuration.
//!
//! ## Defaults
//!
//! Without overrides the configuration targets the consumer OneDrive service
//! with the published client registration:
//!
//! - client id [`DEFAULT_CLIENT_ID`]
//! - scopes [`DEFAULT_SCOPES`]
//! - Microsoft account endpoints under `https://login.live.com`
//! - API root `https://api.onedrive.com/v1.0`
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - injected by the host, or the reqwest-backed default when
//!   the `desktop-shims` feature is enabled
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//!
//! let config = CoreConfig::builder()
//!     .http_client(Arc::new(MyHttpClient))
//!     .build()
//!     .expect("Failed to build config");
//! ```

use crate::error::{Error, Result};
use bridge_traits::HttpClient;
use std::sync::Arc;
use std::time::Duration;

/// Client identifier published for the OneDrive session application.
pub const DEFAULT_CLIENT_ID: &str = "8ed347b1-d21c-4f8d-bdc4-6e53e17f120d";

/// Scopes requested at sign-in.
pub const DEFAULT_SCOPES: &[&str] = &["onedrive.readwrite", "onedrive.appfolder", "wl.offline_access"];

/// Microsoft account authorization endpoint
pub const MSA_AUTHORIZE_URL: &str = "https://login.live.com/oauth20_authorize.srf";

/// Microsoft account token endpoint
pub const MSA_TOKEN_URL: &str = "https://login.live.com/oauth20_token.srf";

/// Microsoft account sign-out endpoint
pub const MSA_LOGOUT_URL: &str = "https://login.live.com/oauth20_logout.srf";

/// Redirect URI reserved for native Microsoft account clients
pub const MSA_DESKTOP_REDIRECT_URI: &str = "https://login.live.com/oauth20_desktop.srf";

/// Consumer OneDrive API root
pub const ONEDRIVE_API_BASE: &str = "https://api.onedrive.com/v1.0";

const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Service endpoints used by authentication and the OneDrive client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceEndpoints {
    /// OAuth authorization endpoint
    pub authorize_url: String,
    /// OAuth token endpoint
    pub token_url: String,
    /// Sign-out endpoint
    pub logout_url: String,
    /// Base URL for drive requests (no trailing slash)
    pub api_base_url: String,
}

impl ServiceEndpoints {
    /// Endpoints for personal Microsoft accounts
    pub fn microsoft_account() -> Self {
        Self {
            authorize_url: MSA_AUTHORIZE_URL.to_string(),
            token_url: MSA_TOKEN_URL.to_string(),
            logout_url: MSA_LOGOUT_URL.to_string(),
            api_base_url: ONEDRIVE_API_BASE.to_string(),
        }
    }

    fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("authorize_url", &self.authorize_url),
            ("token_url", &self.token_url),
            ("logout_url", &self.logout_url),
            ("api_base_url", &self.api_base_url),
        ] {
            if !(value.starts_with("https://") || value.starts_with("http://")) {
                return Err(Error::Config(format!(
                    "Endpoint {} must be an absolute http(s) URL, got '{}'",
                    name, value
                )));
            }
        }

        if self.api_base_url.ends_with('/') {
            return Err(Error::Config(
                "Endpoint api_base_url must not end with '/'".to_string(),
            ));
        }

        Ok(())
    }
}

impl Default for ServiceEndpoints {
    fn default() -> Self {
        Self::microsoft_account()
    }
}

/// Core configuration for the OneDrive session core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// OAuth client ID
    pub client_id: String,

    /// OAuth scopes requested at sign-in
    pub scopes: Vec<String>,

    /// Redirect URI registered for the client
    pub redirect_uri: String,

    /// Authentication and API endpoints
    pub endpoints: ServiceEndpoints,

    /// Total timeout for metadata requests (item lookups, folder creation).
    /// Content downloads and uploads are bounded by the transport only.
    pub request_timeout: Duration,

    /// HTTP client for auth and API requests
    pub http_client: Arc<dyn HttpClient>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .field("redirect_uri", &self.redirect_uri)
            .field("endpoints", &self.endpoints)
            .field("request_timeout", &self.request_timeout)
            .field("http_client", &"HttpClient { ... }")
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - Client ID is not empty
    /// - At least one non-empty scope is requested
    /// - Redirect URI and endpoints are absolute URLs
    /// - Request timeout is non-zero
    pub fn validate(&self) -> Result<()> {
        if self.client_id.trim().is_empty() {
            return Err(Error::Config("Client ID cannot be empty".to_string()));
        }

        if self.scopes.is_empty() {
            return Err(Error::Config(
                "At least one OAuth scope must be requested".to_string(),
            ));
        }

        if self.scopes.iter().any(|s| s.trim().is_empty()) {
            return Err(Error::Config("OAuth scopes cannot be empty".to_string()));
        }

        if !(self.redirect_uri.starts_with("https://") || self.redirect_uri.starts_with("http://"))
        {
            return Err(Error::Config(format!(
                "Redirect URI must be an absolute http(s) URL, got '{}'",
                self.redirect_uri
            )));
        }

        self.endpoints.validate()?;

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    Err(Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "No HTTP client implementation provided. \
                 Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient. \
                 Mobile: inject the platform-native adapter."
            .to_string(),
    })
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client() -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client = ReqwestHttpClient::new().map_err(|e| Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: e.to_string(),
    })?;
    let client: Arc<dyn HttpClient> = Arc::new(client);
    Ok(client)
}

/// Builder for constructing [`CoreConfig`] instances.
///
/// Every field has a default except the HTTP client, which must be injected
/// unless the `desktop-shims` feature supplies one.
#[derive(Default)]
pub struct CoreConfigBuilder {
    client_id: Option<String>,
    scopes: Option<Vec<String>>,
    redirect_uri: Option<String>,
    endpoints: Option<ServiceEndpoints>,
    request_timeout: Option<Duration>,
    http_client: Option<Arc<dyn HttpClient>>,
}

impl CoreConfigBuilder {
    /// Sets the OAuth client ID.
    pub fn client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    /// Replaces the requested scopes.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let builder = CoreConfig::builder()
    ///     .scopes(["onedrive.readonly", "wl.offline_access"]);
    /// ```
    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = Some(scopes.into_iter().map(Into::into).collect());
        self
    }

    /// Sets the redirect URI.
    pub fn redirect_uri(mut self, uri: impl Into<String>) -> Self {
        self.redirect_uri = Some(uri.into());
        self
    }

    /// Overrides the service endpoints.
    pub fn endpoints(mut self, endpoints: ServiceEndpoints) -> Self {
        self.endpoints = Some(endpoints);
        self
    }

    /// Overrides only the API base URL, keeping the auth endpoints.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        let mut endpoints = self.endpoints.take().unwrap_or_default();
        endpoints.api_base_url = url.into();
        self.endpoints = Some(endpoints);
        self
    }

    /// Sets the timeout for metadata requests.
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Sets the HTTP client implementation.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// - `CapabilityMissing` if no HTTP client was injected and no platform
    ///   default is available
    /// - `Config` if any value fails validation
    pub fn build(self) -> Result<CoreConfig> {
        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client()?,
        };

        let config = CoreConfig {
            client_id: self
                .client_id
                .unwrap_or_else(|| DEFAULT_CLIENT_ID.to_string()),
            scopes: self
                .scopes
                .unwrap_or_else(|| DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect()),
            redirect_uri: self
                .redirect_uri
                .unwrap_or_else(|| MSA_DESKTOP_REDIRECT_URI.to_string()),
            endpoints: self.endpoints.unwrap_or_default(),
            request_timeout: self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT),
            http_client,
        };

        config.validate()?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::{ByteStream, HttpRequest, HttpResponse};

    struct MockHttpClient;

    #[async_trait]
    impl HttpClient for MockHttpClient {
        async fn execute(&self, _request: HttpRequest) -> BridgeResult<HttpResponse> {
            Err(BridgeError::NotAvailable("mock".to_string()))
        }

        async fn download_stream(&self, _request: HttpRequest) -> BridgeResult<ByteStream> {
            Err(BridgeError::NotAvailable("mock".to_string()))
        }
    }

    fn builder() -> CoreConfigBuilder {
        CoreConfig::builder().http_client(Arc::new(MockHttpClient))
    }

    #[test]
    fn test_builder_defaults() {
        let config = builder().build().unwrap();

        assert_eq!(config.client_id, DEFAULT_CLIENT_ID);
        assert_eq!(
            config.scopes,
            vec!["onedrive.readwrite", "onedrive.appfolder", "wl.offline_access"]
        );
        assert_eq!(config.redirect_uri, MSA_DESKTOP_REDIRECT_URI);
        assert_eq!(config.endpoints, ServiceEndpoints::microsoft_account());
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[cfg(not(feature = "desktop-shims"))]
    #[test]
    fn test_builder_requires_http_client() {
        let err = CoreConfig::builder().build().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("HttpClient"));
        assert!(msg.contains("desktop-shims"));
    }

    #[cfg(feature = "desktop-shims")]
    #[test]
    fn test_builder_uses_desktop_http_client() {
        assert!(CoreConfig::builder().build().is_ok());
    }

    #[test]
    fn test_rejects_empty_client_id() {
        let err = builder().client_id("  ").build().unwrap_err();
        assert!(err.to_string().contains("Client ID cannot be empty"));
    }

    #[test]
    fn test_rejects_empty_scopes() {
        let err = builder().scopes(Vec::<String>::new()).build().unwrap_err();
        assert!(err.to_string().contains("At least one OAuth scope"));

        let err = builder().scopes(["onedrive.readwrite", ""]).build().unwrap_err();
        assert!(err.to_string().contains("scopes cannot be empty"));
    }

    #[test]
    fn test_rejects_relative_redirect_uri() {
        let err = builder().redirect_uri("callback").build().unwrap_err();
        assert!(err.to_string().contains("Redirect URI"));
    }

    #[test]
    fn test_api_base_url_override() {
        let config = builder()
            .api_base_url("http://127.0.0.1:8080/v1.0")
            .build()
            .unwrap();

        assert_eq!(config.endpoints.api_base_url, "http://127.0.0.1:8080/v1.0");
        assert_eq!(config.endpoints.token_url, MSA_TOKEN_URL);
    }

    #[test]
    fn test_rejects_trailing_slash_in_api_base() {
        let err = builder()
            .api_base_url("https://api.onedrive.com/v1.0/")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("must not end with '/'"));
    }

    #[test]
    fn test_rejects_zero_timeout() {
        let err = builder()
            .request_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn test_debug_hides_http_client() {
        let config = builder().build().unwrap();
        let debug = format!("{:?}", config);
        assert!(debug.contains("HttpClient { ... }"));
        assert!(debug.contains(DEFAULT_CLIENT_ID));
    }
}
