use std::time::Duration;

use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE},
    Body, Client, Method, RequestBuilder, Response, StatusCode,
};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;
use url::Url;

use crate::{
    error::{ProviderError, Result},
    init::InitError,
};

const API_KEY_HEADER: HeaderName = HeaderName::from_static("x-api-key");
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP transport shared by the REST providers.
///
/// Every call goes through [`RestClient::call`] or [`RestClient::call_without_body`], which make exactly one attempt
/// and end in one of: success, transport failure, decode failure or a business error reported by the peer. The
/// first three outcomes that originate here are always `SYSTEM_ERROR`.
#[derive(Debug, Clone)]
pub(crate) struct RestClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl RestClient {
    pub(crate) fn new(base_url: &str, api_key: &str, timeout: Duration) -> std::result::Result<Self, InitError> {
        let base_url = Url::parse(base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(InitError::UnsupportedBaseUrl(base_url.to_string()));
        }

        let mut api_key = HeaderValue::from_str(api_key)?;
        api_key.set_sensitive(true);
        let mut headers = HeaderMap::new();
        headers.insert(API_KEY_HEADER, api_key);

        let timeout = if timeout.is_zero() { DEFAULT_TIMEOUT } else { timeout };
        let client = Client::builder().default_headers(headers).timeout(timeout).build()?;

        Ok(Self { client, base_url, timeout })
    }

    pub(crate) fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Appends `segments` to the base url path. Each segment is percent-encoded on its own.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ProviderError::system("Invalid URL", format!("{} cannot be a base url", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.client.request(method, url)
    }

    pub(crate) fn json_request<B>(&self, method: Method, url: Url, body: &B) -> Result<RequestBuilder>
    where
        B: Serialize + ?Sized,
    {
        let body = serde_json::to_vec(body).map_err(|e| ProviderError::system("Failed to marshal request", e))?;
        Ok(self.raw_json_request(method, url, body))
    }

    pub(crate) fn raw_json_request(&self, method: Method, url: Url, body: impl Into<Body>) -> RequestBuilder {
        self.client.request(method, url).header(CONTENT_TYPE, "application/json").body(body)
    }

    pub(crate) async fn call<T>(&self, request: RequestBuilder, accepted: &[StatusCode]) -> Result<T>
    where
        T: DeserializeOwned,
    {
        let response = self.send(request).await?;
        let status = response.status();
        let body = response.bytes().await.map_err(|e| ProviderError::system("Failed to read response", e))?;

        if accepted.contains(&status) {
            serde_json::from_slice(&body).map_err(|e| ProviderError::system("Failed to decode response", e))
        } else {
            Err(decode_error(&body))
        }
    }

    pub(crate) async fn call_without_body(&self, request: RequestBuilder, accepted: &[StatusCode]) -> Result<()> {
        let response = self.send(request).await?;
        if accepted.contains(&response.status()) {
            return Ok(());
        }

        let body = response.bytes().await.map_err(|e| ProviderError::system("Failed to read response", e))?;
        Err(decode_error(&body))
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build().map_err(|e| ProviderError::system("Failed to create request", e))?;
        debug!("sending {} {}", request.method(), request.url().path());

        let response =
            self.client.execute(request).await.map_err(|e| ProviderError::system("Failed to send request", e))?;
        debug!("provider responded with {}", response.status());

        Ok(response)
    }
}

fn decode_error(body: &[u8]) -> ProviderError {
    match serde_json::from_slice::<ProviderError>(body) {
        Ok(error) if error.code.as_str().is_empty() => {
            ProviderError::system("Failed to decode error response", "error response carried an empty code")
        }
        Ok(error) => {
            debug!("provider reported {}", error.code);
            error
        }
        Err(e) => ProviderError::system("Failed to decode error response", e),
    }
}
