mod local;
mod rest;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::{de::null_as_default, error::Result};

pub use local::LocalAuthnProvider;
pub use rest::RestAuthnProvider;

/// Backend specific payload attached to an authentication request. Never inspected here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthnMetadata(pub Map<String, Value>);

/// Backend specific payload attached to an attribute request. Never inspected here.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GetAttributesMetadata(pub Map<String, Value>);

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthnResult {
    #[serde(rename = "userID", default, deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub organization_unit: String,
    /// Any other field the backend returned.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetAttributesResult {
    #[serde(rename = "userID", default, deserialize_with = "null_as_default")]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub organization_unit: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub attributes: Map<String, Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Authenticates principals against the configured identity backend.
#[async_trait]
pub trait AuthnProvider {
    async fn authenticate(
        &self,
        identifiers: &Map<String, Value>,
        credentials: &Map<String, Value>,
        metadata: Option<&AuthnMetadata>,
    ) -> Result<AuthnResult>;

    /// Returns the subset of `requested_attributes` the backend discloses for `token`.
    async fn get_attributes(
        &self,
        token: &str,
        requested_attributes: &[String],
        metadata: Option<&GetAttributesMetadata>,
    ) -> Result<GetAttributesResult>;
}
