//! Console-driven authorization UI

use async_trait::async_trait;
use bridge_traits::{
    auth::{AuthorizationRequest, AuthorizationUi},
    error::{BridgeError, Result},
};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, warn};

/// Prints the authorization URL and waits for the user to paste the URL the
/// browser landed on after sign-in.
///
/// An empty line cancels the flow.
#[derive(Debug, Default, Clone)]
pub struct ConsoleAuthorizationUi;

impl ConsoleAuthorizationUi {
    pub fn new() -> Self {
        Self
    }

    fn prompt(request: &AuthorizationRequest) -> String {
        format!(
            "Open the following URL in a browser and sign in:\n\n  {}\n\n\
             When the browser reaches {} paste the full address here:\n> ",
            request.authorization_url, request.redirect_uri
        )
    }
}

#[async_trait]
impl AuthorizationUi for ConsoleAuthorizationUi {
    async fn authorize(&self, request: AuthorizationRequest) -> Result<String> {
        let mut stdout = tokio::io::stdout();
        stdout.write_all(Self::prompt(&request).as_bytes()).await?;
        stdout.flush().await?;

        let mut line = String::new();
        BufReader::new(tokio::io::stdin())
            .read_line(&mut line)
            .await?;

        let redirect = line.trim().to_string();
        if redirect.is_empty() {
            return Err(BridgeError::Cancelled(
                "No redirect URL entered".to_string(),
            ));
        }

        if !redirect.starts_with(&request.redirect_uri) {
            warn!("Pasted URL does not start with the registered redirect URI");
        }

        debug!("Authorization redirect captured from console");
        Ok(redirect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_both_urls() {
        let request = AuthorizationRequest {
            authorization_url: "https://login.live.com/oauth20_authorize.srf?client_id=x"
                .to_string(),
            redirect_uri: "https://login.live.com/oauth20_desktop.srf".to_string(),
        };

        let prompt = ConsoleAuthorizationUi::prompt(&request);
        assert!(prompt.contains("oauth20_authorize.srf?client_id=x"));
        assert!(prompt.contains("oauth20_desktop.srf"));
    }
}
