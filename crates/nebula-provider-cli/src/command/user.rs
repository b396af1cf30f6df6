use async_trait::async_trait;
use clap::Args;
use nebula_provider::{init::Providers, user::User};
use serde_json::{json, value::RawValue, Map, Value};

use super::{parse_json_object, parse_raw_json_object, RunCommand};

fn parse_user(value: &str) -> Result<User, String> {
    serde_json::from_str(value).map_err(|e| format!("invalid user record: {e}"))
}

#[derive(Args, Debug)]
pub struct IdentifyCommand {
    /// Filters identifying exactly one user, as a JSON object
    #[arg(long, value_parser = parse_json_object)]
    filters: Map<String, Value>,
}

#[async_trait]
impl RunCommand for IdentifyCommand {
    async fn run(&self, providers: &Providers) -> anyhow::Result<Value> {
        let user_id = providers.user.identify_user(&self.filters).await?;

        Ok(json!({ "userID": user_id }))
    }
}

#[derive(Args, Debug)]
pub struct GetUserCommand {
    user_id: String,
}

#[async_trait]
impl RunCommand for GetUserCommand {
    async fn run(&self, providers: &Providers) -> anyhow::Result<Value> {
        let user = providers.user.get_user(&self.user_id).await?;

        Ok(serde_json::to_value(user)?)
    }
}

#[derive(Args, Debug)]
pub struct GroupsCommand {
    pub(crate) user_id: String,
    #[arg(long, default_value_t = 10, allow_negative_numbers = true)]
    pub(crate) limit: i64,
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub(crate) offset: i64,
}

#[async_trait]
impl RunCommand for GroupsCommand {
    async fn run(&self, providers: &Providers) -> anyhow::Result<Value> {
        let groups = providers.user.get_user_groups(&self.user_id, self.limit, self.offset).await?;

        Ok(serde_json::to_value(groups)?)
    }
}

#[derive(Args, Debug)]
pub struct UpdateUserCommand {
    user_id: String,
    /// Full user record, as a JSON object
    #[arg(long, value_parser = parse_user)]
    user: User,
}

#[async_trait]
impl RunCommand for UpdateUserCommand {
    async fn run(&self, providers: &Providers) -> anyhow::Result<Value> {
        let user = providers.user.update_user(&self.user_id, &self.user).await?;

        Ok(serde_json::to_value(user)?)
    }
}

#[derive(Args, Debug)]
pub struct CreateUserCommand {
    /// User record without id, as a JSON object
    #[arg(long, value_parser = parse_user)]
    user: User,
}

#[async_trait]
impl RunCommand for CreateUserCommand {
    async fn run(&self, providers: &Providers) -> anyhow::Result<Value> {
        let user = providers.user.create_user(&self.user).await?;

        Ok(serde_json::to_value(user)?)
    }
}

#[derive(Args, Debug)]
pub struct UpdateCredentialsCommand {
    user_id: String,
    /// New credentials, as a JSON object
    #[arg(long, value_parser = parse_raw_json_object)]
    credentials: Box<RawValue>,
}

#[async_trait]
impl RunCommand for UpdateCredentialsCommand {
    async fn run(&self, providers: &Providers) -> anyhow::Result<Value> {
        providers.user.update_user_credentials(&self.user_id, &self.credentials).await?;

        Ok(Value::Null)
    }
}
