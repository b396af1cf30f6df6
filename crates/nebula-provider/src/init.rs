use std::{sync::Arc, time::Duration};

use tracing::info;

use crate::{
    authn::{AuthnProvider, LocalAuthnProvider, RestAuthnProvider},
    config::{ProviderConfig, ProvidersConfig},
    service::UserService,
    user::{LocalUserProvider, RestUserProvider, UserProvider},
};

pub use crate::rest::DEFAULT_TIMEOUT;

pub type SharedAuthnProvider = Arc<dyn AuthnProvider + Send + Sync>;
pub type SharedUserProvider = Arc<dyn UserProvider + Send + Sync>;
pub type SharedUserService = Arc<dyn UserService + Send + Sync>;

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("invalid provider base url: {0}")]
    InvalidBaseUrl(#[from] url::ParseError),
    #[error("provider base url `{0}` cannot carry a path")]
    UnsupportedBaseUrl(String),
    #[error("provider api key is not a valid header value")]
    InvalidApiKey(#[from] reqwest::header::InvalidHeaderValue),
    #[error("could not build the http client: {0}")]
    HttpClient(#[from] reqwest::Error),
    #[error("a local provider requires a user service")]
    MissingUserService,
}

/// The pair of providers a process works with.
#[derive(Clone)]
pub struct Providers {
    pub authn: SharedAuthnProvider,
    pub user: SharedUserProvider,
}

pub fn init_local_authn_provider(user_service: SharedUserService) -> LocalAuthnProvider {
    LocalAuthnProvider::new(user_service)
}

/// A zero `timeout` is replaced by [`DEFAULT_TIMEOUT`].
pub fn init_rest_authn_provider(
    base_url: &str,
    api_key: &str,
    timeout: Duration,
) -> Result<RestAuthnProvider, InitError> {
    RestAuthnProvider::new(base_url, api_key, timeout)
}

pub fn init_local_user_provider(user_service: SharedUserService) -> LocalUserProvider {
    LocalUserProvider::new(user_service)
}

/// A zero `timeout` is replaced by [`DEFAULT_TIMEOUT`].
pub fn init_rest_user_provider(base_url: &str, api_key: &str, timeout: Duration) -> Result<RestUserProvider, InitError> {
    RestUserProvider::new(base_url, api_key, timeout)
}

pub fn init_authn_provider(
    config: &ProviderConfig,
    user_service: Option<SharedUserService>,
) -> Result<SharedAuthnProvider, InitError> {
    match config {
        ProviderConfig::Local => {
            let user_service = user_service.ok_or(InitError::MissingUserService)?;
            info!("using local authentication provider");
            Ok(Arc::new(init_local_authn_provider(user_service)))
        }
        ProviderConfig::Rest(rest) => {
            let provider = init_rest_authn_provider(&rest.base_url, &rest.api_key, rest.timeout())?;
            info!("using rest authentication provider at {}", rest.base_url);
            Ok(Arc::new(provider))
        }
    }
}

pub fn init_user_provider(
    config: &ProviderConfig,
    user_service: Option<SharedUserService>,
) -> Result<SharedUserProvider, InitError> {
    match config {
        ProviderConfig::Local => {
            let user_service = user_service.ok_or(InitError::MissingUserService)?;
            info!("using local user provider");
            Ok(Arc::new(init_local_user_provider(user_service)))
        }
        ProviderConfig::Rest(rest) => {
            let provider = init_rest_user_provider(&rest.base_url, &rest.api_key, rest.timeout())?;
            info!("using rest user provider at {}", rest.base_url);
            Ok(Arc::new(provider))
        }
    }
}

pub fn init_providers(
    config: &ProvidersConfig,
    user_service: Option<SharedUserService>,
) -> Result<Providers, InitError> {
    let authn = init_authn_provider(&config.authn, user_service.clone())?;
    let user = init_user_provider(&config.user, user_service)?;

    Ok(Providers { authn, user })
}
