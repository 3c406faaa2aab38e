//! OAuth 2.0 Authorization Flow Manager with PKCE Support
//!
//! This module implements RFC 6749 (OAuth 2.0) and RFC 7636 (PKCE) for the
//! authorization code flow used by OneDrive sign-in.
//!
//! # Overview
//!
//! The OAuth flow manager handles:
//! - Building authorization URLs with PKCE challenge
//! - Parsing the redirect the provider sends the user agent to
//! - Exchanging authorization codes for tokens
//! - Refreshing access tokens
//!
//! # Security
//!
//! - Generates cryptographically secure random state and code verifier
//! - Validates the state parameter to prevent CSRF attacks
//! - Never logs tokens, codes or verifiers
//!
//! # Example
//!
//! ```ignore
//! use core_auth::oauth::{OAuthConfig, OAuthFlowManager};
//!
//! let flow_manager = OAuthFlowManager::new(OAuthConfig::from_core_config(&config), http_client);
//! let (auth_url, pkce_verifier) = flow_manager.build_auth_url()?;
//! // Present auth_url, capture the redirect...
//! let code = OAuthFlowManager::parse_redirect(&redirect_url)?;
//! let tokens = flow_manager.exchange_code(&code.code, &code.state, &pkce_verifier).await?;
//! ```

use crate::error::{AuthError, Result};
use crate::types::OAuthTokens;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bytes::Bytes;
use core_runtime::config::CoreConfig;
use rand::Rng;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// OAuth 2.0 client configuration.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    /// OAuth client ID
    pub client_id: String,
    /// OAuth client secret (absent for public clients)
    pub client_secret: Option<String>,
    /// Redirect URI for OAuth callback
    pub redirect_uri: String,
    /// List of OAuth scopes to request
    pub scopes: Vec<String>,
    /// Authorization endpoint URL
    pub auth_url: String,
    /// Token endpoint URL
    pub token_url: String,
}

impl OAuthConfig {
    /// Derive the OAuth settings from the core configuration.
    pub fn from_core_config(config: &CoreConfig) -> Self {
        Self {
            client_id: config.client_id.clone(),
            client_secret: None,
            redirect_uri: config.redirect_uri.clone(),
            scopes: config.scopes.clone(),
            auth_url: config.endpoints.authorize_url.clone(),
            token_url: config.endpoints.token_url.clone(),
        }
    }
}

/// PKCE (Proof Key for Code Exchange) verifier.
///
/// Holds the code verifier and the CSRF state for one authorization attempt.
/// Only the challenge derived from the verifier leaves the process before the
/// code exchange.
#[derive(Debug, Clone)]
pub struct PkceVerifier {
    verifier: String,
    state: String,
}

impl PkceVerifier {
    /// Create a new PKCE verifier with cryptographically secure random values.
    ///
    /// Generates a 32-byte code verifier and a 16-byte state, both
    /// base64-url-encoded without padding.
    pub fn new() -> Self {
        let mut rng = rand::thread_rng();

        let mut verifier_bytes = [0u8; 32];
        rng.fill(&mut verifier_bytes);
        let verifier = URL_SAFE_NO_PAD.encode(verifier_bytes);

        let mut state_bytes = [0u8; 16];
        rng.fill(&mut state_bytes);
        let state = URL_SAFE_NO_PAD.encode(state_bytes);

        Self { verifier, state }
    }

    /// Get the code verifier string.
    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    /// Get the state parameter.
    pub fn state(&self) -> &str {
        &self.state
    }

    /// Compute the code challenge: BASE64URL(SHA256(code_verifier))
    pub fn challenge(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.verifier.as_bytes());
        let hash = hasher.finalize();
        URL_SAFE_NO_PAD.encode(hash)
    }
}

impl Default for PkceVerifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Authorization code and state extracted from a redirect URL.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationCode {
    pub code: String,
    pub state: String,
}

impl std::fmt::Debug for AuthorizationCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationCode")
            .field("code", &"[REDACTED]")
            .field("state", &self.state)
            .finish()
    }
}

/// OAuth 2.0 flow manager.
///
/// Handles the authorization code flow with PKCE.
pub struct OAuthFlowManager {
    config: OAuthConfig,
    http_client: Arc<dyn HttpClient>,
}

impl OAuthFlowManager {
    /// Create a new OAuth flow manager with the given configuration.
    pub fn new(config: OAuthConfig, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            config,
            http_client,
        }
    }

    pub fn config(&self) -> &OAuthConfig {
        &self.config
    }

    /// Build the authorization URL with PKCE challenge.
    ///
    /// Returns the URL to present to the user together with the verifier that
    /// must be kept for [`exchange_code`](Self::exchange_code).
    ///
    /// # Errors
    ///
    /// Returns an error if the configured authorization URL cannot be parsed.
    #[instrument(skip(self))]
    pub fn build_auth_url(&self) -> Result<(String, PkceVerifier)> {
        let verifier = PkceVerifier::new();
        let challenge = verifier.challenge();

        let mut url = Url::parse(&self.config.auth_url)
            .map_err(|e| AuthError::InvalidConfig(format!("Invalid auth URL: {}", e)))?;

        url.query_pairs_mut()
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("state", verifier.state())
            .append_pair("code_challenge", &challenge)
            .append_pair("code_challenge_method", "S256");

        debug!("Built authorization URL");

        Ok((url.to_string(), verifier))
    }

    /// Extract the authorization response from the URL the provider
    /// redirected to.
    ///
    /// Parameters are read from the query string, falling back to the
    /// fragment. An `error` parameter becomes
    /// [`AuthError::AuthorizationDenied`] with the provider's description.
    pub fn parse_redirect(redirect_url: &str) -> Result<AuthorizationCode> {
        let url = Url::parse(redirect_url).map_err(|e| {
            AuthError::AuthenticationFailed(format!("Invalid redirect URL: {}", e))
        })?;

        let mut params: HashMap<String, String> = url.query_pairs().into_owned().collect();
        if params.is_empty() {
            if let Some(fragment) = url.fragment() {
                params = url::form_urlencoded::parse(fragment.as_bytes())
                    .into_owned()
                    .collect();
            }
        }

        if let Some(error) = params.remove("error") {
            let description = params
                .remove("error_description")
                .unwrap_or_else(|| error.clone());
            warn!(error = %error, "Authorization was denied by the provider");
            return Err(AuthError::AuthorizationDenied { error, description });
        }

        let code = params.remove("code").ok_or_else(|| {
            AuthError::AuthenticationFailed(
                "Redirect URL does not contain an authorization code".to_string(),
            )
        })?;

        Ok(AuthorizationCode {
            code,
            state: params.remove("state").unwrap_or_default(),
        })
    }

    /// Exchange an authorization code for OAuth tokens.
    ///
    /// # Errors
    ///
    /// - `StateMismatch` if `state` differs from the verifier's state
    /// - `InvalidAuthCode` if the token endpoint rejects the code
    /// - `NetworkError` on transport failure
    #[instrument(skip(self, code, state, verifier))]
    pub async fn exchange_code(
        &self,
        code: &str,
        state: &str,
        verifier: &PkceVerifier,
    ) -> Result<OAuthTokens> {
        if state != verifier.state() {
            warn!("OAuth state mismatch");
            return Err(AuthError::StateMismatch {
                expected: verifier.state().to_string(),
                actual: state.to_string(),
            });
        }

        let mut params = HashMap::new();
        params.insert("grant_type", "authorization_code");
        params.insert("code", code);
        params.insert("redirect_uri", &self.config.redirect_uri);
        params.insert("client_id", &self.config.client_id);
        params.insert("code_verifier", verifier.verifier());

        if let Some(ref client_secret) = self.config.client_secret {
            params.insert("client_secret", client_secret);
        }

        debug!("Exchanging authorization code for tokens");

        let response = self.post_token_request(&params).await?;

        if !response.is_success() {
            let error_body = token_error_message(&response);
            warn!(status = response.status, "Token exchange failed");
            return Err(AuthError::InvalidAuthCode(error_body));
        }

        let token_response: TokenResponse = response
            .json()
            .map_err(|e| AuthError::AuthenticationFailed(format!("Failed to parse token response: {}", e)))?;

        info!(
            expires_in = token_response.expires_in,
            "Exchanged authorization code for tokens"
        );

        Ok(OAuthTokens::new(
            token_response.access_token,
            token_response.refresh_token,
            token_response.expires_in,
        ))
    }

    /// Refresh an access token using a refresh token.
    ///
    /// The previous refresh token is kept when the endpoint does not rotate it.
    #[instrument(skip(self, refresh_token))]
    pub async fn refresh_access_token(&self, refresh_token: &str) -> Result<OAuthTokens> {
        let mut params = HashMap::new();
        params.insert("grant_type", "refresh_token");
        params.insert("refresh_token", refresh_token);
        params.insert("redirect_uri", &self.config.redirect_uri);
        params.insert("client_id", &self.config.client_id);

        if let Some(ref client_secret) = self.config.client_secret {
            params.insert("client_secret", client_secret);
        }

        debug!("Refreshing access token");

        let response = self
            .post_token_request(&params)
            .await
            .map_err(|e| AuthError::TokenRefreshFailed(e.to_string()))?;

        if !response.is_success() {
            let error_body = token_error_message(&response);
            warn!(status = response.status, "Token refresh failed");
            return Err(AuthError::TokenRefreshFailed(error_body));
        }

        let token_response: TokenResponse = response
            .json()
            .map_err(|e| AuthError::TokenRefreshFailed(format!("Failed to parse token response: {}", e)))?;

        info!(expires_in = token_response.expires_in, "Refreshed access token");

        Ok(OAuthTokens::new(
            token_response.access_token,
            token_response
                .refresh_token
                .or_else(|| Some(refresh_token.to_string())),
            token_response.expires_in,
        ))
    }

    async fn post_token_request(&self, params: &HashMap<&str, &str>) -> Result<HttpResponse> {
        let encoded_body = serde_urlencoded::to_string(params).map_err(|e| {
            AuthError::InvalidConfig(format!("Failed to encode token request: {}", e))
        })?;

        let request = HttpRequest::new(HttpMethod::Post, self.config.token_url.clone())
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body(Bytes::from(encoded_body));

        Ok(self.http_client.execute(request).await?)
    }
}

/// Token response from the OAuth provider.
#[derive(Debug, Deserialize, Serialize)]
struct TokenResponse {
    access_token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    refresh_token: Option<String>,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    token_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
}

fn default_expires_in() -> i64 {
    3600
}

/// Error body returned by the token endpoint.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Prefer the provider's `error_description`; fall back to the raw body.
fn token_error_message(response: &HttpResponse) -> String {
    match response.json::<TokenErrorResponse>() {
        Ok(err) => err.error_description.unwrap_or(err.error),
        Err(_) => response
            .text()
            .unwrap_or_else(|_| format!("Token endpoint returned {}", response.status)),
    }
}
