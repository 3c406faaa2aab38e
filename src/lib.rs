//! OneDrive session facade.
//!
//! Re-exports the workspace crates so that host applications can depend on
//! `onedrive-session` alone. The `desktop-shims` feature (enabled by default)
//! pulls in the reqwest-backed HTTP client and the console authorization UI.

pub use bridge_traits;
pub use core_auth;
pub use core_runtime;
pub use provider_onedrive;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;

pub use core_auth::{AccountType, Authenticator, MsaAuthenticator};
pub use core_runtime::config::CoreConfig;
pub use provider_onedrive::{
    ActionKind, ActionListener, ActionResult, Item, ItemListener, ItemResult, OneDriveClient,
    OneDriveError, SessionManager,
};
