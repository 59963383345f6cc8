//! Request and response bodies of the service.
//!
//! Properties the service sends but these types do not name are kept in
//! `additional_data` so they survive a read-modify-write cycle.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Unrecognized JSON properties, keyed by wire name.
pub type AdditionalData = BTreeMap<String, serde_json::Value>;

/// Response of `GET /foo/{foo_id}/bar/{bar_id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    /// Server-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Properties not modelled above.
    #[serde(flatten)]
    pub additional_data: AdditionalData,
}

/// Error payload returned alongside 4xx and 5xx statuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable error code.
    pub code: String,
    /// Human-readable description of the failure.
    pub message: String,
}

/// Lifecycle state of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ArtifactState {
    Unknown,
    Pending,
    Live,
    MarkedForDeletion,
    Deleted,
    Abandoned,
    Reference,
}

/// An ML model artifact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelArtifact {
    /// Server-assigned identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Identifier in an external system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Where the model is stored, e.g. `s3://bucket/path/model.onnx`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Lifecycle state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ArtifactState>,
    /// Milliseconds since epoch, as the service encodes it: a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create_time_since_epoch: Option<String>,
    /// Milliseconds since epoch of the last update.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_update_time_since_epoch: Option<String>,
    /// Model serialization format, e.g. `onnx`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_format_name: Option<String>,
    /// Version of the model format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_format_version: Option<String>,
    /// Key of the storage connection holding the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
    /// Path of the model within that storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    /// Service account used to read the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
    /// User-defined properties, as raw JSON values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_properties: BTreeMap<String, serde_json::Value>,
    /// Properties not modelled above.
    #[serde(flatten)]
    pub additional_data: AdditionalData,
}

/// A page of model artifacts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelArtifactList {
    /// Artifacts on this page.
    #[serde(default)]
    pub items: Vec<ModelArtifact>,
    /// Token for the next page; empty on the last page.
    #[serde(default)]
    pub next_page_token: String,
    /// Maximum number of items per page.
    #[serde(default)]
    pub page_size: i32,
    /// Number of items on this page.
    #[serde(default)]
    pub size: i32,
}

/// Mutable properties of a model artifact. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelArtifactUpdate {
    /// Identifier in an external system.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    /// Lifecycle state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<ArtifactState>,
    /// Model serialization format, e.g. `onnx`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_format_name: Option<String>,
    /// Version of the model format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_format_version: Option<String>,
    /// Key of the storage connection holding the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
    /// Path of the model within that storage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    /// Service account used to read the model.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service_account_name: Option<String>,
    /// User-defined properties, as raw JSON values.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub custom_properties: BTreeMap<String, serde_json::Value>,
}

/// Body of a create request: a name plus the mutable properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelArtifactCreate {
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// The remaining properties of the new artifact.
    #[serde(flatten)]
    pub properties: ModelArtifactUpdate,
}

/// Field used to order list results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderByField {
    CreateTime,
    LastUpdateTime,
    Id,
}

/// Direction of list ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Query parameters of `GET .../model_artifacts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelArtifactsQuery {
    /// Maximum number of items per page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,
    /// Field to order results by.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_by: Option<OrderByField>,
    /// Direction of the ordering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    /// Token from the previous page's `next_page_token`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page_token: Option<String>,
}
