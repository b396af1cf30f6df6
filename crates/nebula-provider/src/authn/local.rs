use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::{debug, error};

use super::{AuthnMetadata, AuthnProvider, AuthnResult, GetAttributesMetadata, GetAttributesResult};
use crate::{
    error::{ErrorCode, ProviderError, Result},
    init::SharedUserService,
    service::{ServiceError, ServiceErrorKind},
};

/// Authentication provider backed by the platform's own user store.
///
/// The token issued by [`AuthnProvider::authenticate`] is the user id, and
/// [`AuthnProvider::get_attributes`] expects it back.
pub struct LocalAuthnProvider {
    user_service: SharedUserService,
}

impl LocalAuthnProvider {
    pub fn new(user_service: SharedUserService) -> Self {
        Self { user_service }
    }
}

/// Keeps the store's not-found and authentication-failed signals; everything else is a system error.
fn from_service_error(operation: &str, e: ServiceError) -> ProviderError {
    let code = match e.kind {
        ServiceErrorKind::UserNotFound => ErrorCode::UserNotFound,
        ServiceErrorKind::AuthenticationFailed => ErrorCode::AuthenticationFailed,
        ServiceErrorKind::InvalidRequest | ServiceErrorKind::Internal => {
            error!("user service failed during {operation}: {e}");
            ErrorCode::SystemError
        }
    };
    debug!("{operation} rejected with {code}");

    ProviderError::new(code, e.message, e.description)
}

#[async_trait]
impl AuthnProvider for LocalAuthnProvider {
    async fn authenticate(
        &self,
        identifiers: &Map<String, Value>,
        credentials: &Map<String, Value>,
        _metadata: Option<&AuthnMetadata>,
    ) -> Result<AuthnResult> {
        let user = self
            .user_service
            .authenticate_user(identifiers, credentials)
            .await
            .map_err(|e| from_service_error("authenticate", e))?;

        Ok(AuthnResult {
            token: user.id.clone(),
            user_id: user.id,
            user_type: user.user_type,
            organization_unit: user.organization_unit,
            extra: Map::new(),
        })
    }

    async fn get_attributes(
        &self,
        token: &str,
        requested_attributes: &[String],
        _metadata: Option<&GetAttributesMetadata>,
    ) -> Result<GetAttributesResult> {
        let user = self.user_service.get_user(token).await.map_err(|e| from_service_error("get_attributes", e))?;

        let mut stored = if user.attributes.is_empty() {
            Map::new()
        } else {
            serde_json::from_str::<Map<String, Value>>(&user.attributes)
                .map_err(|e| ProviderError::system("Failed to decode user attributes", e))?
        };
        let attributes = requested_attributes
            .iter()
            .filter_map(|name| stored.remove(name).map(|value| (name.clone(), value)))
            .collect();

        Ok(GetAttributesResult {
            user_id: user.id,
            user_type: user.user_type,
            organization_unit: user.organization_unit,
            attributes,
            extra: Map::new(),
        })
    }
}
