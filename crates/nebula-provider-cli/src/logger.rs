use clap::ValueEnum;
use tracing::Level;
use tracing_subscriber::fmt::SubscriberBuilder;

pub struct LoggerConfig {
    pub format: LoggerFormat,
    pub level: Level,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LoggerFormat {
    #[default]
    Json,
    Pretty,
}

/// Logs go to stderr so that stdout only carries provider output.
pub fn init_logger(config: LoggerConfig) {
    let builder = SubscriberBuilder::default().with_max_level(config.level).with_writer(std::io::stderr);

    match config.format {
        LoggerFormat::Json => builder.json().init(),
        LoggerFormat::Pretty => builder.pretty().init(),
    }
}
