use std::{fmt::Display, str::FromStr};

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};
use url::Url;

pub const DEFAULT_DB_HOST: &str = "127.0.0.1";
pub const DEFAULT_DB_PORT: u16 = 3306;
pub const DEFAULT_API_PORT: u16 = 3000;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_host: String,
    pub db_name: String,
    pub api_port: u16,
    pub board_allow_list: Option<Vec<String>>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup; `from_env` passes the process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let db_host = var("DB_HOST").unwrap_or_else(|| DEFAULT_DB_HOST.to_string());
        let api_port = try_load(&var, "API_PORT", DEFAULT_API_PORT)?;
        let board_allow_list = var("BOARD_ALLOW_LIST").map(|list| {
            list.split(',')
                .map(|key| key.trim().to_string())
                .filter(|key| !key.is_empty())
                .collect()
        });

        let (database_url, db_name) = match var("DATABASE_URL") {
            Some(url) => {
                info!("DATABASE_URL set, ignoring DB_* variables");
                let name = var("DB_NAME").unwrap_or_default();
                (url, name)
            }
            None => {
                let user = var("DB_USER").context("DB_USER must be set")?;
                let name = var("DB_NAME").context("DB_NAME must be set")?;
                let password = var("DB_PASSWORD").unwrap_or_default();
                let port = try_load(&var, "DB_PORT", DEFAULT_DB_PORT)?;
                let url = mysql_url(&db_host, port, &user, &password, &name)?;
                (url, name)
            }
        };

        Ok(Self {
            database_url,
            db_host,
            db_name,
            api_port,
            board_allow_list,
        })
    }
}

fn try_load<F, T>(var: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Display,
    T::Err: Display,
{
    match var(key) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|e| anyhow!("Invalid {key} value `{value}`: {e}")),
        None => {
            warn!("{key} not set, using default: {default}");
            Ok(default)
        }
    }
}

fn mysql_url(host: &str, port: u16, user: &str, password: &str, name: &str) -> Result<String> {
    let mut url = Url::parse("mysql://localhost").context("Invalid base database url")?;
    url.set_host(Some(host))
        .with_context(|| format!("Invalid DB_HOST `{host}`"))?;
    url.set_port(Some(port))
        .map_err(|_| anyhow!("Could not set database port"))?;
    url.set_username(user)
        .map_err(|_| anyhow!("Could not set database user"))?;
    if !password.is_empty() {
        url.set_password(Some(password))
            .map_err(|_| anyhow!("Could not set database password"))?;
    }
    url.set_path(name);
    url.query_pairs_mut().append_pair("charset", "utf8mb4");
    Ok(url.into())
}
