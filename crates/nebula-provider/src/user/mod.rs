mod local;
mod rest;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{value::RawValue, Map, Value};

use crate::{de::null_as_default, error::Result};

pub use local::LocalUserProvider;
pub use rest::RestUserProvider;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(
        rename = "userID",
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub user_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub user_type: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub organization_unit: String,
    /// Raw JSON exactly as the backend stored it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attributes: Option<Box<RawValue>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default", skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroupListResponse {
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub limit: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub offset: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub groups: Vec<UserGroup>,
}

/// Reads and maintains user records in the configured identity backend.
#[async_trait]
pub trait UserProvider {
    /// Resolves `filters` to exactly one user id.
    async fn identify_user(&self, filters: &Map<String, Value>) -> Result<String>;
    async fn get_user(&self, user_id: &str) -> Result<User>;
    /// `limit` and `offset` are forwarded as given; the backend owns paging.
    async fn get_user_groups(&self, user_id: &str, limit: i64, offset: i64) -> Result<UserGroupListResponse>;
    /// Replaces the whole record and returns what the backend stored.
    async fn update_user(&self, user_id: &str, user: &User) -> Result<User>;
    async fn create_user(&self, user: &User) -> Result<User>;
    async fn update_user_credentials(&self, user_id: &str, credentials: &RawValue) -> Result<()>;
}
