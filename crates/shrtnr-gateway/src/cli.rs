use clap::{Parser, ValueEnum};
use std::fmt::{Display, Formatter};
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;

pub const ROOT_URL_ENV: &str = "SH_ROOT_URL";
pub const DB_PATH_ENV: &str = "SH_DB_PATH";
pub const PORT_ENV: &str = "SH_PORT";
pub const HOST_ENV: &str = "SH_HOST";
pub const USE_DOMAIN_TAG_ENV: &str = "SH_USE_DOMAIN_TAG";
pub const MAX_ATTEMPTS_ENV: &str = "SH_MAX_ATTEMPTS";
pub const STORAGE_BACKEND_ENV: &str = "SH_STORAGE";
pub const LOG_FORMAT_ENV: &str = "SH_LOG_FORMAT";

pub const DEFAULT_ROOT_URL: &str = "http://localhost:8000/";
pub const DEFAULT_DB_PATH: &str = "./shrtnr.db";
pub const DEFAULT_PORT: u16 = 8000;
pub const DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StorageBackendArg {
    #[value(name = "redb")]
    Redb,
    #[value(name = "in-memory")]
    InMemory,
}

impl Display for StorageBackendArg {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackendArg::Redb => write!(f, "redb"),
            StorageBackendArg::InMemory => write!(f, "in-memory"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Parser)]
#[command(name = "shrtnr", about = "starts the shrtnr application")]
pub struct Cli {
    /// Public base URL that short links are built on.
    #[arg(long, env = ROOT_URL_ENV, default_value = DEFAULT_ROOT_URL)]
    pub root_url: String,

    #[arg(long, env = DB_PATH_ENV, default_value = DEFAULT_DB_PATH)]
    pub db_path: PathBuf,

    #[arg(long, env = PORT_ENV, default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[arg(long, env = HOST_ENV, default_value = DEFAULT_HOST)]
    pub host: IpAddr,

    /// Prefix generated codes with a tag taken from the URL.
    #[arg(long, env = USE_DOMAIN_TAG_ENV)]
    pub use_domain_tag: bool,

    #[arg(
        long,
        env = MAX_ATTEMPTS_ENV,
        default_value_t = shrtnr_shortener::service::DEFAULT_MAX_ATTEMPTS
    )]
    pub max_attempts: u32,

    #[arg(
        long,
        env = STORAGE_BACKEND_ENV,
        value_enum,
        default_value_t = StorageBackendArg::Redb
    )]
    pub storage: StorageBackendArg,

    #[arg(long, env = LOG_FORMAT_ENV, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Cli {
    /// The root URL, always ending with `/`.
    pub fn root_url(&self) -> String {
        if self.root_url.ends_with('/') {
            self.root_url.clone()
        } else {
            format!("{}/", self.root_url)
        }
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}
