use async_trait::async_trait;
use serde_json::{value::RawValue, Map, Value};
use tracing::error;

use super::{User, UserGroup, UserGroupListResponse, UserProvider};
use crate::{
    error::{ErrorCode, ProviderError, Result},
    init::SharedUserService,
    service::{GroupPage, ServiceError, ServiceErrorKind, UserRecord},
};

/// User provider backed by the platform's own user store.
pub struct LocalUserProvider {
    user_service: SharedUserService,
}

impl LocalUserProvider {
    pub fn new(user_service: SharedUserService) -> Self {
        Self { user_service }
    }
}

/// Only the store's not-found signal keeps its meaning; everything else is a system error.
fn from_service_error(operation: &str, e: ServiceError) -> ProviderError {
    let code = match e.kind {
        ServiceErrorKind::UserNotFound => ErrorCode::UserNotFound,
        ServiceErrorKind::AuthenticationFailed | ServiceErrorKind::InvalidRequest | ServiceErrorKind::Internal => {
            error!("user service failed during {operation}: {e}");
            ErrorCode::SystemError
        }
    };

    ProviderError::new(code, e.message, e.description)
}

fn to_user(record: UserRecord) -> Result<User> {
    let attributes = if record.attributes.is_empty() {
        None
    } else {
        Some(
            RawValue::from_string(record.attributes)
                .map_err(|e| ProviderError::system("Failed to read user attributes", e))?,
        )
    };

    Ok(User {
        user_id: record.id,
        user_type: record.user_type,
        organization_unit: record.organization_unit,
        attributes,
    })
}

fn to_record(user_id: &str, user: &User) -> UserRecord {
    UserRecord {
        id: user_id.to_owned(),
        user_type: user.user_type.clone(),
        organization_unit: user.organization_unit.clone(),
        attributes: user.attributes.as_deref().map(|attributes| attributes.get().to_owned()).unwrap_or_default(),
    }
}

fn to_group_list(page: GroupPage, limit: i64, offset: i64) -> UserGroupListResponse {
    UserGroupListResponse {
        total: page.total,
        limit,
        offset,
        groups: page.groups.into_iter().map(|group| UserGroup { id: group.id, name: group.name }).collect(),
    }
}

#[async_trait]
impl UserProvider for LocalUserProvider {
    async fn identify_user(&self, filters: &Map<String, Value>) -> Result<String> {
        self.user_service.identify_user(filters).await.map_err(|e| from_service_error("identify_user", e))
    }

    async fn get_user(&self, user_id: &str) -> Result<User> {
        let record = self.user_service.get_user(user_id).await.map_err(|e| from_service_error("get_user", e))?;
        to_user(record)
    }

    async fn get_user_groups(&self, user_id: &str, limit: i64, offset: i64) -> Result<UserGroupListResponse> {
        let page = self
            .user_service
            .get_user_groups(user_id, limit, offset)
            .await
            .map_err(|e| from_service_error("get_user_groups", e))?;

        Ok(to_group_list(page, limit, offset))
    }

    async fn update_user(&self, user_id: &str, user: &User) -> Result<User> {
        let record = self
            .user_service
            .update_user(user_id, to_record(user_id, user))
            .await
            .map_err(|e| from_service_error("update_user", e))?;
        to_user(record)
    }

    async fn create_user(&self, user: &User) -> Result<User> {
        let record =
            self.user_service.create_user(to_record("", user)).await.map_err(|e| from_service_error("create_user", e))?;
        to_user(record)
    }

    async fn update_user_credentials(&self, user_id: &str, credentials: &RawValue) -> Result<()> {
        self.user_service
            .update_user_credentials(user_id, credentials)
            .await
            .map_err(|e| from_service_error("update_user_credentials", e))
    }
}
