//! OneDrive API resource types
//!
//! Data structures for the item resource and the error envelope of the
//! OneDrive REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Item id of the drive root
pub const ROOT_ID: &str = "root";

/// Item path addressing the drive root
pub const ROOT_PATH: &str = "root:";

/// Full path prefix of the drive root as reported in parent references
pub const ROOT_FULL_PATH: &str = "/drive/root:";

/// Whether an item is a plain file or a folder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    File,
    Folder,
}

/// OneDrive item resource
///
/// See: https://learn.microsoft.com/onedrive/developer/rest-api/resources/driveitem
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Item ID
    #[serde(default)]
    pub id: String,

    /// Item name
    #[serde(default)]
    pub name: String,

    /// Size in bytes (folders report the sum of their contents)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_date_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified_date_time: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub web_url: Option<String>,

    /// Present when the item is a folder
    #[serde(skip_serializing_if = "Option::is_none")]
    pub folder: Option<Folder>,

    /// Present when the item is a file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<FileFacet>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_reference: Option<ItemReference>,

    /// Thumbnail sets, only returned when expanded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub thumbnails: Option<Vec<ThumbnailSet>>,

    /// Children, only returned when expanded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<Item>>,

    /// Short-lived pre-authenticated content URL
    #[serde(
        rename = "@content.downloadUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub content_download_url: Option<String>,
}

impl Item {
    pub fn is_folder(&self) -> bool {
        self.folder.is_some()
    }

    pub fn kind(&self) -> ItemKind {
        if self.is_folder() {
            ItemKind::Folder
        } else {
            ItemKind::File
        }
    }

    /// URL the content can be fetched from without an access token.
    pub fn download_url(&self) -> Option<&str> {
        self.content_download_url.as_deref()
    }

    /// Expanded children, or an empty slice when the listing was not expanded.
    pub fn children(&self) -> &[Item] {
        self.children.as_deref().unwrap_or_default()
    }
}

/// Folder facet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    #[serde(default)]
    pub child_count: u64,
}

/// File facet
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileFacet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

/// Reference to the parent of an item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemReference {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub drive_id: Option<String>,

    /// Path of the parent, e.g. `/drive/root:/Documents`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl ItemReference {
    /// Parent path relative to the drive root, without the `/drive/root:` prefix.
    pub fn relative_path(&self) -> Option<&str> {
        self.path
            .as_deref()
            .and_then(|p| p.strip_prefix(ROOT_FULL_PATH))
    }
}

/// A set of thumbnails for one item
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThumbnailSet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub small: Option<Thumbnail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub medium: Option<Thumbnail>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub large: Option<Thumbnail>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Thumbnail {
    pub url: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
}

/// Request body for creating a folder
#[derive(Debug, Serialize)]
pub(crate) struct NewFolder<'a> {
    pub name: &'a str,
    pub folder: FolderMarker,
}

/// Serializes as `{}`
#[derive(Debug, Serialize)]
pub(crate) struct FolderMarker {}

/// Error envelope returned by the API
#[derive(Debug, Deserialize)]
pub(crate) struct GraphErrorResponse {
    pub error: GraphError,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphError {
    pub code: String,
    #[serde(default)]
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_folder_with_expanded_children() {
        let json = r#"{
            "id": "root-id",
            "name": "root",
            "size": 2048,
            "folder": {"childCount": 2},
            "lastModifiedDateTime": "2016-03-21T20:01:37Z",
            "thumbnails": [],
            "children": [
                {
                    "id": "A1",
                    "name": "Documents",
                    "folder": {"childCount": 0},
                    "parentReference": {"id": "root-id", "path": "/drive/root:"}
                },
                {
                    "id": "B2",
                    "name": "photo.jpg",
                    "size": 2048,
                    "file": {"mimeType": "image/jpeg"},
                    "parentReference": {"id": "root-id", "path": "/drive/root:"},
                    "@content.downloadUrl": "https://public.dm.files.1drv.com/y4m",
                    "thumbnails": [
                        {"id": "0", "small": {"url": "https://thumb/s", "width": 96, "height": 96}}
                    ]
                }
            ]
        }"#;

        let item: Item = serde_json::from_str(json).unwrap();

        assert!(item.is_folder());
        assert_eq!(item.folder.as_ref().unwrap().child_count, 2);
        assert_eq!(item.children().len(), 2);

        let folder = &item.children()[0];
        assert_eq!(folder.kind(), ItemKind::Folder);
        assert_eq!(
            folder.parent_reference.as_ref().unwrap().relative_path(),
            Some("")
        );

        let photo = &item.children()[1];
        assert_eq!(photo.kind(), ItemKind::File);
        assert_eq!(
            photo.file.as_ref().unwrap().mime_type.as_deref(),
            Some("image/jpeg")
        );
        assert_eq!(
            photo.download_url(),
            Some("https://public.dm.files.1drv.com/y4m")
        );
        let thumbs = photo.thumbnails.as_ref().unwrap();
        assert_eq!(thumbs[0].small.as_ref().unwrap().width, 96);
    }

    #[test]
    fn test_unexpanded_item_has_no_children() {
        let item: Item = serde_json::from_str(r#"{"id": "X", "name": "a.txt"}"#).unwrap();
        assert!(item.children().is_empty());
        assert!(item.download_url().is_none());
        assert_eq!(item.kind(), ItemKind::File);
    }

    #[test]
    fn test_new_folder_body() {
        let body = serde_json::to_value(NewFolder {
            name: "Documents",
            folder: FolderMarker {},
        })
        .unwrap();

        assert_eq!(body, serde_json::json!({"name": "Documents", "folder": {}}));
    }

    #[test]
    fn test_relative_path_of_nested_parent() {
        let reference = ItemReference {
            path: Some("/drive/root:/Music/Rock".to_string()),
            ..Default::default()
        };
        assert_eq!(reference.relative_path(), Some("/Music/Rock"));
    }
}
