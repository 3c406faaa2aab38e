//! # OneDrive Provider
//!
//! Session management and REST access for OneDrive.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`SessionManager`]: holds the signed-in handle and reports outcomes to
//!   listeners
//! - [`OneDriveClient`]: item listing with expansion, content streaming,
//!   uploads and folder creation
//! - [`Item`]: the item resource model
//!
//! All HTTP goes through the host's
//! [`HttpClient`](bridge_traits::http::HttpClient); sign-in goes through a
//! [`core_auth::Authenticator`].

pub mod client;
pub mod error;
pub mod session;
pub mod types;

pub use client::{expansion_options, OneDriveClient};
pub use error::{OneDriveError, Result};
pub use session::{
    ActionKind, ActionListener, ActionResult, ItemListener, ItemResult, SessionManager,
};
pub use types::{
    FileFacet, Folder, Item, ItemKind, ItemReference, Thumbnail, ThumbnailSet, ROOT_FULL_PATH,
    ROOT_ID, ROOT_PATH,
};
