use async_trait::async_trait;
use clap::Args;
use nebula_provider::{
    authn::{AuthnMetadata, GetAttributesMetadata},
    init::Providers,
};
use serde_json::{Map, Value};

use super::{parse_json_object, RunCommand};

#[derive(Args, Debug)]
pub struct AuthenticateCommand {
    /// Identifiers of the principal, as a JSON object
    #[arg(long, value_parser = parse_json_object, default_value = "{}")]
    identifiers: Map<String, Value>,
    /// Credentials of the principal, as a JSON object
    #[arg(long, value_parser = parse_json_object, default_value = "{}")]
    credentials: Map<String, Value>,
    /// Backend specific metadata, as a JSON object
    #[arg(long, value_parser = parse_json_object)]
    metadata: Option<Map<String, Value>>,
}

#[async_trait]
impl RunCommand for AuthenticateCommand {
    async fn run(&self, providers: &Providers) -> anyhow::Result<Value> {
        let metadata = self.metadata.clone().map(AuthnMetadata);
        let result = providers.authn.authenticate(&self.identifiers, &self.credentials, metadata.as_ref()).await?;

        Ok(serde_json::to_value(result)?)
    }
}

#[derive(Args, Debug)]
pub struct AttributesCommand {
    /// Token returned by a previous authentication
    #[arg(long)]
    token: String,
    /// Attribute to fetch, repeatable
    #[arg(long = "attribute", value_name = "NAME")]
    attributes: Vec<String>,
    /// Backend specific metadata, as a JSON object
    #[arg(long, value_parser = parse_json_object)]
    metadata: Option<Map<String, Value>>,
}

#[async_trait]
impl RunCommand for AttributesCommand {
    async fn run(&self, providers: &Providers) -> anyhow::Result<Value> {
        let metadata = self.metadata.clone().map(GetAttributesMetadata);
        let result = providers.authn.get_attributes(&self.token, &self.attributes, metadata.as_ref()).await?;

        Ok(serde_json::to_value(result)?)
    }
}
