use serde::{Deserialize, Serialize};
use std::fs;

use crate::Error;

const CONFIG_ENV: &str = "RESERVATION_CONFIG";
const CONFIG_CANDIDATES: [&str; 3] = [
    "./reservation.yml",
    "~/.config/reservation.yml",
    "/etc/reservation.yml",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    pub db: DbConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DbConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
    pub dbname: String,
    #[serde(default = "default_pool_size")]
    pub max_connections: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

fn default_pool_size() -> u32 {
    5
}

impl Config {
    pub fn load(filename: impl AsRef<str>) -> Result<Self, Error> {
        let path = shellexpand::tilde(filename.as_ref()).into_owned();
        let config = fs::read_to_string(path).map_err(|_| Error::ConfigRead)?;
        serde_yaml::from_str(&config).map_err(|_| Error::ConfigParse)
    }

    /// first existing file among `$RESERVATION_CONFIG` and the well known locations
    pub fn locate() -> Option<String> {
        std::env::var(CONFIG_ENV)
            .ok()
            .into_iter()
            .chain(CONFIG_CANDIDATES.iter().map(|s| s.to_string()))
            .map(|p| shellexpand::tilde(&p).into_owned())
            .find(|p| std::path::Path::new(p).exists())
    }
}

impl DbConfig {
    pub fn server_url(&self) -> String {
        if self.password.is_empty() {
            format!("postgres://{}@{}:{}", self.user, self.host, self.port)
        } else {
            format!(
                "postgres://{}:{}@{}:{}",
                self.user, self.password, self.host, self.port
            )
        }
    }

    pub fn url(&self) -> String {
        format!("{}/{}", self.server_url(), self.dbname)
    }
}

impl ServerConfig {
    pub fn url(&self, https: bool) -> String {
        if https {
            format!("https://{}:{}", self.host, self.port)
        } else {
            format!("http://{}:{}", self.host, self.port)
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
