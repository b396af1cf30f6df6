use std::path::PathBuf;

use async_trait::async_trait;
use clap::{Args, Parser, Subcommand};
use nebula_provider::init::{init_providers, Providers};
use serde_json::{value::RawValue, Map, Value};
use tracing::Level;

use crate::{
    config::load_config,
    logger::{LoggerConfig, LoggerFormat},
};

use self::{
    authn::{AttributesCommand, AuthenticateCommand},
    user::{
        CreateUserCommand, GetUserCommand, GroupsCommand, IdentifyCommand, UpdateCredentialsCommand, UpdateUserCommand,
    },
};

pub mod authn;
pub mod user;

#[async_trait]
pub trait RunCommand {
    /// Returns what should be printed, `Value::Null` for nothing.
    async fn run(&self, providers: &Providers) -> anyhow::Result<Value>;
}

#[derive(Parser, Debug)]
#[command(term_width = 0, version, name = "nebula-provider", about = "Calls the configured identity providers")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,
    #[command(subcommand)]
    pub command: ProviderCommand,
}

#[derive(Args, Debug)]
pub struct GlobalArgs {
    /// Sets a custom config file
    #[arg(short, long, global = true, value_name = "FILE", env = "NEBULA_PROVIDER_CONFIG")]
    pub config: Option<PathBuf>,
    /// Sets the log format
    #[arg(long, global = true, value_enum, default_value_t)]
    pub log_format: LoggerFormat,
    /// Enables debug logs
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum ProviderCommand {
    /// Authenticates a principal
    Authenticate(AuthenticateCommand),
    /// Fetches attributes for an authentication token
    Attributes(AttributesCommand),
    /// Resolves filters to a user id
    Identify(IdentifyCommand),
    /// Fetches a user
    GetUser(GetUserCommand),
    /// Lists the groups of a user
    Groups(GroupsCommand),
    /// Replaces a user record
    UpdateUser(UpdateUserCommand),
    /// Creates a user
    CreateUser(CreateUserCommand),
    /// Replaces the credentials of a user
    UpdateCredentials(UpdateCredentialsCommand),
}

#[async_trait]
impl RunCommand for ProviderCommand {
    async fn run(&self, providers: &Providers) -> anyhow::Result<Value> {
        match self {
            ProviderCommand::Authenticate(cmd) => cmd.run(providers).await,
            ProviderCommand::Attributes(cmd) => cmd.run(providers).await,
            ProviderCommand::Identify(cmd) => cmd.run(providers).await,
            ProviderCommand::GetUser(cmd) => cmd.run(providers).await,
            ProviderCommand::Groups(cmd) => cmd.run(providers).await,
            ProviderCommand::UpdateUser(cmd) => cmd.run(providers).await,
            ProviderCommand::CreateUser(cmd) => cmd.run(providers).await,
            ProviderCommand::UpdateCredentials(cmd) => cmd.run(providers).await,
        }
    }
}

impl Cli {
    pub fn logger_config(&self) -> LoggerConfig {
        LoggerConfig {
            format: self.global.log_format,
            level: if self.global.verbose { Level::DEBUG } else { Level::INFO },
        }
    }

    pub async fn run(&self) -> anyhow::Result<()> {
        let config = load_config(self.global.config.clone())?;
        let providers = init_providers(&config, None)?;

        let output = self.command.run(&providers).await?;
        if !output.is_null() {
            println!("{}", serde_json::to_string_pretty(&output)?);
        }

        Ok(())
    }
}

pub(crate) fn parse_json_object(value: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("expected a JSON object".to_owned()),
        Err(e) => Err(format!("invalid JSON: {e}")),
    }
}

pub(crate) fn parse_raw_json_object(value: &str) -> Result<Box<RawValue>, String> {
    parse_json_object(value)?;
    RawValue::from_string(value.trim().to_owned()).map_err(|e| format!("invalid JSON: {e}"))
}
