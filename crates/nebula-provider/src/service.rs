//! Contract of the platform's internal user store, as consumed by the local providers.

use async_trait::async_trait;
#[cfg(any(test, feature = "mock"))]
use mockall::automock;
use serde_json::{value::RawValue, Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceErrorKind {
    UserNotFound,
    AuthenticationFailed,
    InvalidRequest,
    Internal,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}: {description}")]
pub struct ServiceError {
    pub kind: ServiceErrorKind,
    pub message: String,
    pub description: String,
}

impl ServiceError {
    pub fn new(kind: ServiceErrorKind, message: impl Into<String>, description: impl Into<String>) -> Self {
        Self { kind, message: message.into(), description: description.into() }
    }
}

/// A user as stored by the internal store. `attributes` holds the raw JSON text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserRecord {
    pub id: String,
    pub user_type: String,
    pub organization_unit: String,
    pub attributes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub id: String,
    pub user_type: String,
    pub organization_unit: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupRecord {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroupPage {
    pub total: i64,
    pub groups: Vec<GroupRecord>,
}

pub type Result<T> = std::result::Result<T, ServiceError>;

#[cfg_attr(any(test, feature = "mock"), automock)]
#[async_trait]
pub trait UserService {
    async fn identify_user(&self, filters: &Map<String, Value>) -> Result<String>;
    async fn get_user(&self, user_id: &str) -> Result<UserRecord>;
    async fn get_user_groups(&self, user_id: &str, limit: i64, offset: i64) -> Result<GroupPage>;
    async fn update_user(&self, user_id: &str, user: UserRecord) -> Result<UserRecord>;
    async fn create_user(&self, user: UserRecord) -> Result<UserRecord>;
    async fn update_user_credentials(&self, user_id: &str, credentials: &RawValue) -> Result<()>;
    async fn authenticate_user(
        &self,
        identifiers: &Map<String, Value>,
        credentials: &Map<String, Value>,
    ) -> Result<AuthenticatedUser>;
}
