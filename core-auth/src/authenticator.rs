//! Sign-in seam used by the session manager.

use crate::error::{AuthError, Result};
use crate::oauth::{OAuthConfig, OAuthFlowManager};
use crate::types::{AccountType, AuthenticatedAccount, OAuthTokens};
use async_trait::async_trait;
use bridge_traits::auth::{AuthorizationRequest, AuthorizationUi};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use core_runtime::config::CoreConfig;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Turns an interactive authorization into an authenticated account and
/// manages the token lifecycle afterwards.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Account tier produced by this authenticator
    fn account_type(&self) -> AccountType;

    /// Run the interactive sign-in through the host UI.
    async fn login(&self, ui: &dyn AuthorizationUi) -> Result<AuthenticatedAccount>;

    /// Obtain fresh tokens without user interaction.
    async fn refresh(&self, tokens: &OAuthTokens) -> Result<OAuthTokens>;

    /// End the provider-side session for `tokens`.
    async fn logout(&self, tokens: &OAuthTokens) -> Result<()>;
}

/// Microsoft account sign-in against `login.live.com`.
pub struct MsaAuthenticator {
    flow: OAuthFlowManager,
    logout_url: String,
    service_root: String,
    http_client: Arc<dyn HttpClient>,
}

impl MsaAuthenticator {
    pub fn from_config(config: &CoreConfig) -> Self {
        Self {
            flow: OAuthFlowManager::new(
                OAuthConfig::from_core_config(config),
                Arc::clone(&config.http_client),
            ),
            logout_url: config.endpoints.logout_url.clone(),
            service_root: config.endpoints.api_base_url.clone(),
            http_client: Arc::clone(&config.http_client),
        }
    }

    fn logout_request_url(&self) -> Result<String> {
        let mut url = Url::parse(&self.logout_url)
            .map_err(|e| AuthError::InvalidConfig(format!("Invalid logout URL: {}", e)))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.flow.config().client_id)
            .append_pair("redirect_uri", &self.flow.config().redirect_uri);
        Ok(url.to_string())
    }
}

#[async_trait]
impl Authenticator for MsaAuthenticator {
    fn account_type(&self) -> AccountType {
        AccountType::MicrosoftAccount
    }

    #[instrument(skip(self, ui))]
    async fn login(&self, ui: &dyn AuthorizationUi) -> Result<AuthenticatedAccount> {
        let (authorization_url, verifier) = self.flow.build_auth_url()?;

        debug!("Presenting authorization page");
        let redirect = ui
            .authorize(AuthorizationRequest {
                authorization_url,
                redirect_uri: self.flow.config().redirect_uri.clone(),
            })
            .await?;

        let code = OAuthFlowManager::parse_redirect(&redirect)?;
        let tokens = self
            .flow
            .exchange_code(&code.code, &code.state, &verifier)
            .await?;

        info!(account_type = %self.account_type().as_str(), "Signed in");

        Ok(AuthenticatedAccount {
            account_type: self.account_type(),
            service_root: self.service_root.clone(),
            tokens,
        })
    }

    async fn refresh(&self, tokens: &OAuthTokens) -> Result<OAuthTokens> {
        let refresh_token = tokens.refresh_token.as_deref().ok_or_else(|| {
            AuthError::TokenRefreshFailed("No refresh token was granted for this session".to_string())
        })?;
        self.flow.refresh_access_token(refresh_token).await
    }

    #[instrument(skip(self, _tokens))]
    async fn logout(&self, _tokens: &OAuthTokens) -> Result<()> {
        let request = HttpRequest::new(HttpMethod::Get, self.logout_request_url()?);

        let response = self
            .http_client
            .execute(request)
            .await
            .map_err(|e| AuthError::LogoutFailed(e.to_string()))?;

        if !response.is_success() {
            let body = response
                .text()
                .unwrap_or_else(|_| format!("Logout endpoint returned {}", response.status));
            warn!(status = response.status, "Sign-out request was rejected");
            return Err(AuthError::LogoutFailed(body));
        }

        info!("Signed out");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::error::{BridgeError, Result as BridgeResult};
    use bridge_traits::http::{ByteStream, HttpResponse};
    use bytes::Bytes;
    use mockall::mock;
    use std::collections::HashMap;
    use std::sync::Mutex;

    mock! {
        HttpClient {}

        #[async_trait]
        impl HttpClient for HttpClient {
            async fn execute(&self, request: HttpRequest) -> BridgeResult<HttpResponse>;
            async fn download_stream(&self, request: HttpRequest) -> BridgeResult<ByteStream>;
        }
    }

    /// Echoes the state from the authorization URL back in the redirect.
    struct ApprovingUi {
        seen: Mutex<Option<AuthorizationRequest>>,
    }

    #[async_trait]
    impl AuthorizationUi for ApprovingUi {
        async fn authorize(&self, request: AuthorizationRequest) -> BridgeResult<String> {
            let url = Url::parse(&request.authorization_url).unwrap();
            let state = url
                .query_pairs()
                .find(|(k, _)| k == "state")
                .map(|(_, v)| v.into_owned())
                .unwrap();
            let redirect = format!("{}?code=auth-code&state={}", request.redirect_uri, state);
            *self.seen.lock().unwrap() = Some(request);
            Ok(redirect)
        }
    }

    struct DenyingUi;

    #[async_trait]
    impl AuthorizationUi for DenyingUi {
        async fn authorize(&self, request: AuthorizationRequest) -> BridgeResult<String> {
            Ok(format!(
                "{}?error=access_denied&error_description=The+user+has+denied+access",
                request.redirect_uri
            ))
        }
    }

    struct ClosingUi;

    #[async_trait]
    impl AuthorizationUi for ClosingUi {
        async fn authorize(&self, _request: AuthorizationRequest) -> BridgeResult<String> {
            Err(BridgeError::Cancelled("window closed".to_string()))
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body.to_string()),
        }
    }

    fn authenticator(http: MockHttpClient) -> MsaAuthenticator {
        let config = CoreConfig::builder()
            .http_client(Arc::new(http))
            .build()
            .unwrap();
        MsaAuthenticator::from_config(&config)
    }

    #[tokio::test]
    async fn test_login_returns_msa_account() {
        let mut http = MockHttpClient::new();
        http.expect_execute().times(1).returning(|req| {
            assert_eq!(req.url, "https://login.live.com/oauth20_token.srf");
            Ok(response(
                200,
                r#"{"access_token":"access","refresh_token":"refresh","expires_in":3600}"#,
            ))
        });

        let auth = authenticator(http);
        let ui = ApprovingUi {
            seen: Mutex::new(None),
        };
        let account = auth.login(&ui).await.unwrap();

        assert_eq!(account.account_type, AccountType::MicrosoftAccount);
        assert_eq!(account.service_root, "https://api.onedrive.com/v1.0");
        assert_eq!(account.tokens.access_token, "access");

        let seen = ui.seen.lock().unwrap().clone().unwrap();
        assert!(seen
            .authorization_url
            .starts_with("https://login.live.com/oauth20_authorize.srf?"));
        assert!(seen
            .authorization_url
            .contains("scope=onedrive.readwrite+onedrive.appfolder+wl.offline_access"));
        assert_eq!(seen.redirect_uri, "https://login.live.com/oauth20_desktop.srf");
    }

    #[tokio::test]
    async fn test_login_denied_carries_provider_message() {
        let mut http = MockHttpClient::new();
        http.expect_execute().never();

        let err = authenticator(http).login(&DenyingUi).await.unwrap_err();
        assert!(err.to_string().starts_with("The user has denied access"));
    }

    #[tokio::test]
    async fn test_login_cancelled_by_user() {
        let mut http = MockHttpClient::new();
        http.expect_execute().never();

        let err = authenticator(http).login(&ClosingUi).await.unwrap_err();
        assert!(matches!(err, AuthError::Cancelled(_)));
    }

    #[tokio::test]
    async fn test_refresh_without_refresh_token() {
        let mut http = MockHttpClient::new();
        http.expect_execute().never();

        let tokens = OAuthTokens::new("access".to_string(), None, 0);
        let err = authenticator(http).refresh(&tokens).await.unwrap_err();
        assert!(matches!(err, AuthError::TokenRefreshFailed(_)));
    }

    #[tokio::test]
    async fn test_logout_calls_logout_endpoint() {
        let mut http = MockHttpClient::new();
        http.expect_execute().times(1).returning(|req| {
            assert_eq!(req.method, HttpMethod::Get);
            assert!(req
                .url
                .starts_with("https://login.live.com/oauth20_logout.srf?client_id="));
            assert!(req.url.contains("redirect_uri="));
            Ok(response(200, ""))
        });

        let tokens = OAuthTokens::new("access".to_string(), None, 3600);
        authenticator(http).logout(&tokens).await.unwrap();
    }

    #[tokio::test]
    async fn test_logout_failure_keeps_body() {
        let mut http = MockHttpClient::new();
        http.expect_execute()
            .times(1)
            .returning(|_| Ok(response(400, "invalid_request")));

        let tokens = OAuthTokens::new("access".to_string(), None, 3600);
        let err = authenticator(http).logout(&tokens).await.unwrap_err();
        assert!(matches!(err, AuthError::LogoutFailed(msg) if msg == "invalid_request"));
    }
}
