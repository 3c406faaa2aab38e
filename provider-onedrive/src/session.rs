//! Session management
//!
//! [`SessionManager`] holds at most one signed-in [`OneDriveClient`] and runs
//! every drive operation through it. Outcomes are returned to the caller and
//! also delivered to the registered listeners.

use std::path::Path;
use std::sync::{Arc, RwLock as StdRwLock};

use bridge_traits::auth::AuthorizationUi;
use bridge_traits::http::ByteStream;
use bytes::Bytes;
use core_auth::{AccountType, Authenticator, MsaAuthenticator};
use core_runtime::config::CoreConfig;
use core_runtime::logging::strip_path;
use tokio::sync::RwLock;
use tracing::{debug, info, instrument, warn};

use crate::client::{expansion_options, OneDriveClient};
use crate::error::{OneDriveError, Result};
use crate::types::{Item, ROOT_ID};

/// Which session action an [`ActionResult`] describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Login,
    Logout,
}

/// Outcome of a login or logout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionResult {
    pub kind: ActionKind,
    pub success: bool,
    /// Provider message, set on failure
    pub message: Option<String>,
}

impl ActionResult {
    fn succeeded(kind: ActionKind) -> Self {
        Self {
            kind,
            success: true,
            message: None,
        }
    }

    fn failed(kind: ActionKind, error: &OneDriveError) -> Self {
        Self {
            kind,
            success: false,
            message: Some(error.to_string()),
        }
    }
}

/// Outcome of an item operation (list, upload, folder creation).
#[derive(Debug, Clone, PartialEq)]
pub enum ItemResult {
    Success(Item),
    /// Provider message
    Failure(String),
}

impl ItemResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ItemResult::Success(_))
    }

    pub fn item(&self) -> Option<&Item> {
        match self {
            ItemResult::Success(item) => Some(item),
            ItemResult::Failure(_) => None,
        }
    }
}

impl From<Result<Item>> for ItemResult {
    fn from(result: Result<Item>) -> Self {
        match result {
            Ok(item) => ItemResult::Success(item),
            Err(e) => ItemResult::Failure(e.to_string()),
        }
    }
}

/// Receives login and logout outcomes.
pub trait ActionListener: Send + Sync {
    fn on_action_completed(&self, result: &ActionResult);
}

impl<F> ActionListener for F
where
    F: Fn(&ActionResult) + Send + Sync,
{
    fn on_action_completed(&self, result: &ActionResult) {
        self(result)
    }
}

/// Receives item operation outcomes.
pub trait ItemListener: Send + Sync {
    fn on_item_completed(&self, result: &ItemResult);
}

impl<F> ItemListener for F
where
    F: Fn(&ItemResult) + Send + Sync,
{
    fn on_item_completed(&self, result: &ItemResult) {
        self(result)
    }
}

/// Owner of the signed-in OneDrive handle.
///
/// The handle slot is only ever replaced as a whole: set to a freshly signed-in
/// client, or cleared. Overlapping logins are not coordinated and the last one
/// to finish wins.
///
/// # Example
///
/// ```ignore
/// let session = SessionManager::from_config(CoreConfig::builder().build()?);
/// session.register_action_listener(Arc::new(|r: &ActionResult| println!("{:?}", r)));
///
/// session.create_client(&ui).await;
/// let root = session.list_items(&ui, ROOT_PATH).await?;
/// ```
pub struct SessionManager {
    config: CoreConfig,
    authenticator: Arc<dyn Authenticator>,
    client: RwLock<Option<Arc<OneDriveClient>>>,
    action_listener: StdRwLock<Option<Arc<dyn ActionListener>>>,
    item_listener: StdRwLock<Option<Arc<dyn ItemListener>>>,
}

impl SessionManager {
    pub fn new(config: CoreConfig, authenticator: Arc<dyn Authenticator>) -> Self {
        Self {
            config,
            authenticator,
            client: RwLock::new(None),
            action_listener: StdRwLock::new(None),
            item_listener: StdRwLock::new(None),
        }
    }

    /// Session signing in with a Microsoft account.
    pub fn from_config(config: CoreConfig) -> Self {
        let authenticator = Arc::new(MsaAuthenticator::from_config(&config));
        Self::new(config, authenticator)
    }

    /// Replace the action listener.
    pub fn register_action_listener(&self, listener: Arc<dyn ActionListener>) {
        let mut slot = self
            .action_listener
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(listener);
    }

    /// Replace the item listener.
    pub fn register_item_listener(&self, listener: Arc<dyn ItemListener>) {
        let mut slot = self
            .item_listener
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *slot = Some(listener);
    }

    pub async fn is_signed_in(&self) -> bool {
        self.client.read().await.is_some()
    }

    /// Account type of the current handle, if signed in.
    pub async fn account_type(&self) -> Option<AccountType> {
        self.client
            .read()
            .await
            .as_ref()
            .map(|client| client.account_type())
    }

    /// The current handle.
    pub async fn client(&self) -> Result<Arc<OneDriveClient>> {
        self.client
            .read()
            .await
            .clone()
            .ok_or(OneDriveError::NoActiveSession)
    }

    /// Sign in interactively and keep the resulting handle.
    ///
    /// The action listener is told the outcome once. A failed sign-in leaves
    /// the session signed out.
    #[instrument(skip(self, ui))]
    pub async fn create_client(&self, ui: &dyn AuthorizationUi) -> ActionResult {
        let result = match self.login(ui).await {
            Ok(client) => {
                self.replace_client(Some(client)).await;
                ActionResult::succeeded(ActionKind::Login)
            }
            Err(e) => {
                warn!(error = %e, "Sign-in failed");
                self.replace_client(None).await;
                ActionResult::failed(ActionKind::Login, &e)
            }
        };

        self.notify_action(&result);
        result
    }

    /// Sign in, then immediately sign the fresh handle out.
    ///
    /// When the sign-in step fails the session is cleared and the error is
    /// returned without notifying the action listener. Otherwise the session
    /// ends up signed out and the listener receives the logout outcome.
    #[instrument(skip(self, ui))]
    pub async fn logout(&self, ui: &dyn AuthorizationUi) -> Result<ActionResult> {
        let client = match self.login(ui).await {
            Ok(client) => client,
            Err(e) => {
                warn!(error = %e, "Sign-in before logout failed");
                self.replace_client(None).await;
                return Err(e);
            }
        };
        self.replace_client(Some(Arc::clone(&client))).await;

        let outcome = self.authenticator.logout(&client.tokens().await).await;
        self.replace_client(None).await;

        let result = match outcome {
            Ok(()) => {
                info!("Logged out");
                ActionResult::succeeded(ActionKind::Logout)
            }
            Err(e) => {
                let e = OneDriveError::from(e);
                warn!(error = %e, "Logout failed");
                ActionResult::failed(ActionKind::Logout, &e)
            }
        };

        self.notify_action(&result);
        Ok(result)
    }

    /// Fetch the item at `path` with its children expanded.
    ///
    /// Signs in first when there is no handle; if that fails the session is
    /// cleared and the error is returned without notifying the item listener.
    #[instrument(skip(self, ui))]
    pub async fn list_items(&self, ui: &dyn AuthorizationUi, path: &str) -> Result<ItemResult> {
        let client = match self.client().await {
            Ok(client) => client,
            Err(_) => {
                debug!("No session, signing in before listing");
                match self.login(ui).await {
                    Ok(client) => {
                        self.replace_client(Some(Arc::clone(&client))).await;
                        client
                    }
                    Err(e) => {
                        warn!(error = %e, "Sign-in before listing failed");
                        self.replace_client(None).await;
                        return Err(e);
                    }
                }
            }
        };

        let expand = expansion_options(client.account_type());
        let result = ItemResult::from(client.get_item(path, expand).await);

        self.notify_item(&result);
        Ok(result)
    }

    /// Stream the content of an item by id.
    pub async fn read_stream_by_id(&self, item_id: &str) -> Result<ByteStream> {
        self.client().await?.content_by_id(item_id).await
    }

    /// Stream the content of an item by path relative to the drive root.
    pub async fn read_stream_by_path(&self, path: &str) -> Result<ByteStream> {
        self.client().await?.content_by_path(path).await
    }

    /// Upload a local file into `remote_folder_path`, keeping its file name.
    ///
    /// The whole file is read before anything is sent. A read failure, or a
    /// missing session, is returned to the caller without notifying the item
    /// listener. The upload outcome reaches the item listener once.
    #[instrument(skip(self, local_file), fields(file = %strip_path(&local_file.to_string_lossy())))]
    pub async fn write_file(
        &self,
        local_file: &Path,
        remote_folder_path: &str,
    ) -> Result<ItemResult> {
        let name = local_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| OneDriveError::LocalFile {
                path: local_file.to_path_buf(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    "path has no file name",
                ),
            })?;

        let content = tokio::fs::read(local_file)
            .await
            .map_err(|source| OneDriveError::LocalFile {
                path: local_file.to_path_buf(),
                source,
            })?;
        debug!(bytes = content.len(), "Read local file");

        let client = self.client().await?;

        let discard_progress = |_sent: u64, _total: u64| {};
        let result = ItemResult::from(
            client
                .upload_content(remote_folder_path, &name, Bytes::from(content), &discard_progress)
                .await,
        );

        self.notify_item(&result);
        Ok(result)
    }

    /// Create a folder named `name` directly under the drive root.
    #[instrument(skip(self))]
    pub async fn create_folder(&self, name: &str) -> Result<ItemResult> {
        let client = self.client().await?;
        let result = ItemResult::from(client.create_folder(ROOT_ID, name).await);

        self.notify_item(&result);
        Ok(result)
    }

    async fn login(&self, ui: &dyn AuthorizationUi) -> Result<Arc<OneDriveClient>> {
        let account = self.authenticator.login(ui).await?;
        info!(account_type = %account.account_type.as_str(), "Created OneDrive client");

        Ok(Arc::new(OneDriveClient::new(
            account,
            Arc::clone(&self.authenticator),
            Arc::clone(&self.config.http_client),
            self.config.request_timeout,
        )))
    }

    async fn replace_client(&self, client: Option<Arc<OneDriveClient>>) {
        *self.client.write().await = client;
    }

    fn notify_action(&self, result: &ActionResult) {
        let listener = self
            .action_listener
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        if let Some(listener) = listener {
            listener.on_action_completed(result);
        }
    }

    fn notify_item(&self, result: &ItemResult) {
        let listener = self
            .item_listener
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone();
        if let Some(listener) = listener {
            listener.on_item_completed(result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_result_from_error_keeps_message() {
        let result = ItemResult::from(Err(OneDriveError::Api {
            status: 409,
            code: Some("nameAlreadyExists".to_string()),
            message: "An item with the same name already exists".to_string(),
        }));

        assert!(!result.is_success());
        assert_eq!(
            result,
            ItemResult::Failure("An item with the same name already exists".to_string())
        );
    }

    #[test]
    fn test_action_result_failed_carries_message() {
        let result = ActionResult::failed(ActionKind::Login, &OneDriveError::NoActiveSession);
        assert!(!result.success);
        assert_eq!(result.message.as_deref(), Some("No active OneDrive session"));
    }

    #[test]
    fn test_closure_listeners() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let count = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&count);
        let listener: Arc<dyn ItemListener> = Arc::new(move |_: &ItemResult| {
            seen.fetch_add(1, Ordering::SeqCst);
        });

        listener.on_item_completed(&ItemResult::Failure("x".to_string()));
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
