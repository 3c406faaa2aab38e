use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of account a session was opened with.
///
/// The OneDrive API does not support the same request options on every
/// account tier, so callers branch on this value when building requests.
///
/// # Examples
///
/// ```
/// use core_auth::AccountType;
///
/// assert_eq!(AccountType::MicrosoftAccount.as_str(), "microsoft_account");
/// assert_eq!(AccountType::parse("aad"), Some(AccountType::ActiveDirectory));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    /// Personal Microsoft account (consumer OneDrive)
    MicrosoftAccount,
    /// Work or school account (OneDrive for Business)
    ActiveDirectory,
}

impl AccountType {
    /// Get the human-readable display name for this account type
    pub fn display_name(&self) -> &'static str {
        match self {
            AccountType::MicrosoftAccount => "Microsoft account",
            AccountType::ActiveDirectory => "Work or school account",
        }
    }

    /// Identifier used in logs and configuration
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::MicrosoftAccount => "microsoft_account",
            AccountType::ActiveDirectory => "active_directory",
        }
    }

    /// Parse an account type from a string identifier
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "microsoft_account" | "microsoftaccount" | "msa" => Some(AccountType::MicrosoftAccount),
            "active_directory" | "activedirectory" | "aad" => Some(AccountType::ActiveDirectory),
            _ => None,
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

/// OAuth 2.0 token set.
///
/// # Security
///
/// Tokens should never be logged. The `Debug` implementation redacts them.
///
/// # Examples
///
/// ```
/// use core_auth::OAuthTokens;
///
/// let tokens = OAuthTokens::new("access".to_string(), Some("refresh".to_string()), 3600);
/// assert!(!tokens.is_expired());
/// ```
#[derive(Clone, Serialize, Deserialize)]
pub struct OAuthTokens {
    /// The access token used for API requests
    pub access_token: String,
    /// The refresh token, present when offline access was granted
    pub refresh_token: Option<String>,
    /// When the access token expires (UTC)
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

impl OAuthTokens {
    /// Create a new token set expiring `expires_in` seconds from now
    pub fn new(access_token: String, refresh_token: Option<String>, expires_in: i64) -> Self {
        Self {
            access_token,
            refresh_token,
            expires_at: chrono::Utc::now() + chrono::Duration::seconds(expires_in),
        }
    }

    /// Check if the access token is expired or will expire within 5 minutes
    pub fn is_expired(&self) -> bool {
        self.is_expired_with_buffer(300)
    }

    /// Check if the access token is expired with a custom buffer
    pub fn is_expired_with_buffer(&self, buffer_seconds: i64) -> bool {
        let now = chrono::Utc::now();
        let buffer = chrono::Duration::seconds(buffer_seconds);
        now >= self.expires_at - buffer
    }

    /// Whether these tokens can be renewed without user interaction
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }
}

impl fmt::Debug for OAuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OAuthTokens")
            .field("access_token", &"[REDACTED]")
            .field(
                "refresh_token",
                &self.refresh_token.as_ref().map(|_| "[REDACTED]"),
            )
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Result of a successful sign-in.
#[derive(Debug, Clone)]
pub struct AuthenticatedAccount {
    /// Account tier the tokens belong to
    pub account_type: AccountType,
    /// API root for drive requests made with these tokens
    pub service_root: String,
    /// Tokens obtained at sign-in
    pub tokens: OAuthTokens,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    #[test]
    fn test_account_type_as_str() {
        assert_eq!(AccountType::MicrosoftAccount.as_str(), "microsoft_account");
        assert_eq!(AccountType::ActiveDirectory.as_str(), "active_directory");
    }

    #[test]
    fn test_account_type_parse() {
        assert_eq!(
            AccountType::parse("MicrosoftAccount"),
            Some(AccountType::MicrosoftAccount)
        );
        assert_eq!(AccountType::parse("msa"), Some(AccountType::MicrosoftAccount));
        assert_eq!(
            AccountType::parse("active_directory"),
            Some(AccountType::ActiveDirectory)
        );
        assert_eq!(AccountType::parse("google"), None);
    }

    #[test]
    fn test_account_type_display() {
        assert_eq!(
            format!("{}", AccountType::MicrosoftAccount),
            "Microsoft account"
        );
    }

    #[test]
    fn test_account_type_serialization() {
        let json = serde_json::to_string(&AccountType::ActiveDirectory).unwrap();
        let back: AccountType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, AccountType::ActiveDirectory);
    }

    #[test]
    fn test_oauth_tokens_new() {
        let tokens = OAuthTokens::new("access".to_string(), Some("refresh".to_string()), 3600);
        assert_eq!(tokens.access_token, "access");
        assert!(tokens.can_refresh());
        assert!(!tokens.is_expired());
    }

    #[test]
    fn test_oauth_tokens_expiry_buffer() {
        let tokens = OAuthTokens {
            access_token: "token".to_string(),
            refresh_token: None,
            expires_at: Utc::now() + Duration::seconds(200),
        };
        assert!(tokens.is_expired());
        assert!(!tokens.is_expired_with_buffer(60));
        assert!(!tokens.can_refresh());
    }

    #[test]
    fn test_oauth_tokens_expired_past() {
        let tokens = OAuthTokens {
            access_token: "token".to_string(),
            refresh_token: Some("refresh".to_string()),
            expires_at: Utc::now() - Duration::hours(1),
        };
        assert!(tokens.is_expired_with_buffer(0));
    }

    #[test]
    fn test_oauth_tokens_debug_redacts() {
        let tokens = OAuthTokens::new(
            "secret_access_token".to_string(),
            Some("secret_refresh_token".to_string()),
            3600,
        );
        let debug_str = format!("{:?}", tokens);
        assert!(debug_str.contains("[REDACTED]"));
        assert!(!debug_str.contains("secret_access_token"));
        assert!(!debug_str.contains("secret_refresh_token"));
    }
}
