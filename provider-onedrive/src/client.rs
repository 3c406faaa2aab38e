//! OneDrive REST client
//!
//! [`OneDriveClient`] is the authenticated handle a session holds. It owns the
//! account's tokens and issues item, content and folder requests against the
//! account's service root.

use std::sync::Arc;
use std::time::Duration;

use bridge_traits::http::{ByteStream, HttpClient, HttpMethod, HttpRequest, HttpResponse};
use bytes::Bytes;
use core_auth::{AccountType, AuthenticatedAccount, Authenticator, OAuthTokens};
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::error::{OneDriveError, Result};
use crate::types::{FolderMarker, Item, NewFolder, ROOT_ID};

/// Children together with their thumbnails and the folder's own thumbnails
const EXPAND_CHILDREN_AND_THUMBNAILS: &str = "children(expand=thumbnails),thumbnails";

/// Used where nested thumbnail expansion is not supported
const EXPAND_CHILDREN_AND_THUMBNAILS_LIMITED: &str = "children,thumbnails";

/// `expand` value for item requests made on behalf of `account_type`.
///
/// Only personal accounts accept thumbnails nested inside the children
/// expansion.
pub fn expansion_options(account_type: AccountType) -> &'static str {
    match account_type {
        AccountType::MicrosoftAccount => EXPAND_CHILDREN_AND_THUMBNAILS,
        _ => EXPAND_CHILDREN_AND_THUMBNAILS_LIMITED,
    }
}

/// Authenticated OneDrive client.
///
/// # Example
///
/// ```ignore
/// let client = OneDriveClient::new(account, authenticator, http_client, Duration::from_secs(30));
/// let root = client
///     .get_item(ROOT_PATH, expansion_options(client.account_type()))
///     .await?;
/// for child in root.children() {
///     println!("{}", child.name);
/// }
/// ```
pub struct OneDriveClient {
    http_client: Arc<dyn HttpClient>,
    authenticator: Arc<dyn Authenticator>,
    account_type: AccountType,
    service_root: String,
    request_timeout: Duration,
    tokens: RwLock<OAuthTokens>,
}

impl OneDriveClient {
    pub fn new(
        account: AuthenticatedAccount,
        authenticator: Arc<dyn Authenticator>,
        http_client: Arc<dyn HttpClient>,
        request_timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            authenticator,
            account_type: account.account_type,
            service_root: account.service_root.trim_end_matches('/').to_string(),
            request_timeout,
            tokens: RwLock::new(account.tokens),
        }
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    pub fn service_root(&self) -> &str {
        &self.service_root
    }

    /// Snapshot of the current tokens.
    pub async fn tokens(&self) -> OAuthTokens {
        self.tokens.read().await.clone()
    }

    /// Get an item by id or item path (`root:`, `root:/Music:`), expanding the
    /// related resources named in `expand`.
    #[instrument(skip(self), fields(account_type = %self.account_type.as_str()))]
    pub async fn get_item(&self, item_path: &str, expand: &str) -> Result<Item> {
        let url = format!(
            "{}/drive/items/{}?expand={}",
            self.service_root,
            encode_item_path(item_path),
            urlencoding::encode(expand)
        );

        let request = HttpRequest::new(HttpMethod::Get, url).timeout(self.request_timeout);
        let response = self.send(request).await?;
        let item = parse_item(&response)?;

        info!(
            item_id = %item.id,
            children = item.children().len(),
            "Fetched item"
        );
        Ok(item)
    }

    /// Stream the content of the item with `item_id`.
    #[instrument(skip(self))]
    pub async fn content_by_id(&self, item_id: &str) -> Result<ByteStream> {
        let url = format!(
            "{}/drive/items/{}/content",
            self.service_root,
            urlencoding::encode(item_id)
        );
        self.download(url).await
    }

    /// Stream the content of the item at `path`, relative to the drive root.
    #[instrument(skip(self))]
    pub async fn content_by_path(&self, path: &str) -> Result<ByteStream> {
        let url = format!(
            "{}/drive/items/{}/content",
            self.service_root,
            root_relative(path)
        );
        self.download(url).await
    }

    /// Upload `content` as the file `name` inside `folder_path`, replacing any
    /// existing file of that name.
    ///
    /// `progress` receives `(sent, total)` before and after the transfer.
    #[instrument(skip(self, content, progress), fields(size = content.len()))]
    pub async fn upload_content(
        &self,
        folder_path: &str,
        name: &str,
        content: Bytes,
        progress: &(dyn Fn(u64, u64) + Send + Sync),
    ) -> Result<Item> {
        let total = content.len() as u64;
        let url = format!(
            "{}/drive/items/{}/children/{}/content",
            self.service_root,
            root_relative(folder_path),
            urlencoding::encode(name)
        );

        progress(0, total);
        let request = HttpRequest::new(HttpMethod::Put, url)
            .header("Content-Type", "application/octet-stream")
            .body(content);
        let response = self.send(request).await?;
        progress(total, total);

        let item = parse_item(&response)?;
        info!(item_id = %item.id, bytes = total, "Uploaded file");
        Ok(item)
    }

    /// Create a folder named `name` under the item `parent_id`.
    #[instrument(skip(self))]
    pub async fn create_folder(&self, parent_id: &str, name: &str) -> Result<Item> {
        let url = format!(
            "{}/drive/items/{}/children",
            self.service_root,
            urlencoding::encode(parent_id)
        );
        let request = HttpRequest::new(HttpMethod::Post, url)
            .timeout(self.request_timeout)
            .json(&NewFolder {
                name,
                folder: FolderMarker {},
            })?;

        let response = self.send(request).await?;
        let item = parse_item(&response)?;

        info!(item_id = %item.id, "Created folder");
        Ok(item)
    }

    /// Current access token, refreshed first when it is about to expire.
    async fn access_token(&self) -> Result<String> {
        {
            let tokens = self.tokens.read().await;
            if !tokens.is_expired() || !tokens.can_refresh() {
                return Ok(tokens.access_token.clone());
            }
        }

        let mut tokens = self.tokens.write().await;
        // Another request may have refreshed while we waited for the lock.
        if tokens.is_expired() && tokens.can_refresh() {
            debug!("Access token expired, refreshing");
            *tokens = self.authenticator.refresh(&tokens).await?;
        }
        Ok(tokens.access_token.clone())
    }

    /// Attach the bearer token. Content transfers carry no total timeout;
    /// the HTTP client bounds connect and idle-read time instead.
    async fn authorize(&self, request: HttpRequest) -> Result<HttpRequest> {
        Ok(request.bearer_token(self.access_token().await?))
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let request = self.authorize(request).await?;
        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            warn!(status = response.status, "OneDrive request failed");
            return Err(OneDriveError::from_response(response.status, &response.body));
        }

        debug!(status = response.status, "OneDrive request succeeded");
        Ok(response)
    }

    async fn download(&self, url: String) -> Result<ByteStream> {
        let request = self
            .authorize(HttpRequest::new(HttpMethod::Get, url))
            .await?;
        let stream = self.http_client.download_stream(request).await?;
        debug!("Opened content stream");
        Ok(stream)
    }
}

impl std::fmt::Debug for OneDriveClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OneDriveClient")
            .field("account_type", &self.account_type)
            .field("service_root", &self.service_root)
            .finish_non_exhaustive()
    }
}

fn parse_item(response: &HttpResponse) -> Result<Item> {
    serde_json::from_slice(&response.body)
        .map_err(|e| OneDriveError::ParseError(format!("Failed to parse item: {}", e)))
}

/// Percent-encode an item path segment by segment, keeping `/` and `:`.
fn encode_item_path(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            segment
                .split(':')
                .map(|part| urlencoding::encode(part).into_owned())
                .collect::<Vec<_>>()
                .join(":")
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Address a path below the drive root: `root:/{path}:`, or `root` itself for
/// an empty path.
fn root_relative(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        ROOT_ID.to_string()
    } else {
        format!("{}:/{}:", ROOT_ID, encode_item_path(trimmed))
    }
}
