//! Server configuration: command-line flags with environment fallbacks.
//!
//! `main` loads `.env` (dotenvy) before parsing, so every flag can also live there.

use clap::{Parser, ValueEnum};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use tracing::warn;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt::writer::BoxMakeWriter, EnvFilter};

use crate::auth::DEFAULT_SECRET;

const DEFAULT_LOG_FILTER: &str = "info,tower_http=info";

#[derive(Parser, Debug, Clone)]
#[command(name = "mergington_activities")]
#[command(about = "Mergington High School extracurricular activities API", long_about = None)]
pub struct Config {
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: IpAddr,

    #[arg(short, long, env = "PORT", default_value_t = 8000)]
    pub port: u16,

    /// JSON file of the form {"teachers": {"<username>": "<password>"}}
    #[arg(long, env = "TEACHERS_FILE", default_value = "teachers.json")]
    pub teachers_file: PathBuf,

    /// Prebuilt front-end, served under /static
    #[arg(long, env = "STATIC_DIR", default_value = "static")]
    pub static_dir: PathBuf,

    #[arg(long, env = "JWT_SECRET", default_value = DEFAULT_SECRET, hide_env_values = true)]
    pub jwt_secret: String,

    /// Refuse signups once an activity reaches max_participants
    #[arg(long, env = "ENFORCE_CAPACITY", default_value_t = false)]
    pub enforce_capacity: bool,

    /// Also write logs to a daily rolling file in this directory
    #[arg(long, env = "LOG_DIR")]
    pub log_dir: Option<PathBuf>,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_SECRET
    }

    /// Install the global tracing subscriber. Keep the guard alive for the
    /// lifetime of the process or buffered file output is lost.
    pub fn init_tracing(&self) -> Option<WorkerGuard> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        let (writer, guard) = match &self.log_dir {
            Some(dir) => {
                let appender = tracing_appender::rolling::daily(dir, "mergington_activities.log");
                let (non_blocking, guard) = tracing_appender::non_blocking(appender);
                (BoxMakeWriter::new(non_blocking), Some(guard))
            }
            None => (BoxMakeWriter::new(std::io::stdout), None),
        };

        let builder = tracing_subscriber::fmt().with_env_filter(filter).with_writer(writer);
        match self.log_format {
            LogFormat::Json => builder.json().init(),
            LogFormat::Text => builder.init(),
        }

        if self.uses_default_secret() {
            warn!("JWT_SECRET not set, signing tokens with the built-in default secret");
        }
        guard
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let config = Config::try_parse_from([
            "mergington_activities",
            "--port",
            "9001",
            "--teachers-file",
            "/etc/mergington/teachers.json",
            "--enforce-capacity",
            "--log-format",
            "json",
        ])
        .expect("valid flags");

        assert_eq!(config.port, 9001);
        assert_eq!(config.teachers_file, PathBuf::from("/etc/mergington/teachers.json"));
        assert!(config.enforce_capacity);
        assert_eq!(config.log_format, LogFormat::Json);
        assert_eq!(config.socket_addr().port(), 9001);
    }

    #[test]
    fn test_rejects_bad_port() {
        assert!(Config::try_parse_from(["mergington_activities", "--port", "not-a-port"]).is_err());
    }
}
