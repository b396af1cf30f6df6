use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde::Serialize;
use serde_json::{Map, Value};

use super::{AuthnMetadata, AuthnProvider, AuthnResult, GetAttributesMetadata, GetAttributesResult};
use crate::{error::Result, init::InitError, rest::RestClient};

/// Authentication provider backed by an external identity service.
#[derive(Debug, Clone)]
pub struct RestAuthnProvider {
    client: RestClient,
}

#[derive(Serialize)]
struct AuthenticateRequest<'a> {
    identifiers: &'a Map<String, Value>,
    credentials: &'a Map<String, Value>,
    metadata: Option<&'a AuthnMetadata>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GetAttributesRequest<'a> {
    token: &'a str,
    requested_attributes: &'a [String],
    metadata: Option<&'a GetAttributesMetadata>,
}

impl RestAuthnProvider {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> std::result::Result<Self, InitError> {
        Ok(Self { client: RestClient::new(base_url, api_key, timeout)? })
    }

    pub fn timeout(&self) -> Duration {
        self.client.timeout()
    }
}

#[async_trait]
impl AuthnProvider for RestAuthnProvider {
    async fn authenticate(
        &self,
        identifiers: &Map<String, Value>,
        credentials: &Map<String, Value>,
        metadata: Option<&AuthnMetadata>,
    ) -> Result<AuthnResult> {
        let url = self.client.endpoint(&["authenticate"])?;
        let body = AuthenticateRequest { identifiers, credentials, metadata };
        let request = self.client.json_request(Method::POST, url, &body)?;

        self.client.call(request, &[StatusCode::OK]).await
    }

    async fn get_attributes(
        &self,
        token: &str,
        requested_attributes: &[String],
        metadata: Option<&GetAttributesMetadata>,
    ) -> Result<GetAttributesResult> {
        let url = self.client.endpoint(&["attributes"])?;
        let body = GetAttributesRequest { token, requested_attributes, metadata };
        let request = self.client.json_request(Method::POST, url, &body)?;

        self.client.call(request, &[StatusCode::OK]).await
    }
}
