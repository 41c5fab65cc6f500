//! Wire types of the remote subtitle service.
//!
//! Responses may carry identifiers as JSON strings or numbers; both are read
//! into `String`. Unknown response fields are ignored.

use core_auth::{IdRepr, UserId};
use serde::{Deserialize, Deserializer, Serialize};

/// Body of `POST /api/files`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileCreate {
    pub filename: String,
    pub sha1: String,
    pub series_id: String,
    /// Path of the file on the machine that indexed it
    pub remark: String,
    pub user_id: UserId,
}

/// File entity as stored by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteFile {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(default)]
    pub filename: String,
    #[serde(default)]
    pub sha1: String,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub series_id: Option<String>,
    #[serde(default)]
    pub remark: Option<String>,
    #[serde(default, deserialize_with = "opt_id_string")]
    pub user_id: Option<String>,
}

/// One element of a bulk dialog request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DialogCreate {
    pub file_id: String,
    pub content: String,
    pub begin: i64,
    pub end: i64,
    pub user_id: UserId,
}

/// Body of `POST /api/dialogs/bulk`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BulkDialogCreate {
    pub bulk: Vec<DialogCreate>,
}

/// Dialog entity as stored by the service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteDialog {
    #[serde(deserialize_with = "id_string")]
    pub id: String,
    #[serde(deserialize_with = "id_string")]
    pub file_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub begin: i64,
    #[serde(default)]
    pub end: i64,
}

fn id_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    IdRepr::deserialize(deserializer).map(String::from)
}

fn opt_id_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<IdRepr>::deserialize(deserializer).map(|id| id.map(String::from))
}
