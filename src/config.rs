use std::{env, time::Duration};

use clap::Parser;
use url::Url;

use crate::{
    errors::{SyncError, SyncResult},
    feed::{fetcher::DEFAULT_TIMEOUT, types::KeyFormat},
    firebase::client::DatabaseTarget,
};

pub const DEFAULT_FEED_URL: &str =
    "https://app.jagel.id/api/get-list?comp_vuid=66984199194ee&paginate=1000&page=1&style=4";
pub const DEFAULT_DATABASE_URL: &str =
    "https://grivieproject-default-rtdb.asia-southeast1.firebasedatabase.app/";
pub const DEFAULT_DB_PATH: &str = "/toko_data";

/// CLI options. Each one overrides its environment variable.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Store listing endpoint [env: STOREFEED_FEED_URL]
    #[clap(long)]
    pub feed_url: Option<String>,
    /// Realtime Database base URL [env: STOREFEED_DATABASE_URL]
    #[clap(long)]
    pub database_url: Option<String>,
    /// Root path that store keys are written under [env: STOREFEED_DB_PATH]
    #[clap(long)]
    pub db_path: Option<String>,
    /// `uid` or `title-uid` [env: STOREFEED_KEY_FORMAT]
    #[clap(long)]
    pub key_format: Option<String>,
    /// Feed request timeout in seconds [env: STOREFEED_FETCH_TIMEOUT_SECS]
    #[clap(long)]
    pub timeout_secs: Option<u64>,
    /// Log the writes instead of sending them
    #[clap(long)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SyncConfig {
    pub feed_url: Url,
    pub target: DatabaseTarget,
    pub key_format: KeyFormat,
    pub fetch_timeout: Duration,
    pub dry_run: bool,
}

impl SyncConfig {
    pub fn load(args: &Args) -> SyncResult<Self> {
        Self::from_lookup(args, |name| env::var(name).ok())
    }

    pub fn from_lookup<F>(args: &Args, lookup: F) -> SyncResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let setting = |flag: &Option<String>, name: &str, default: &str| -> String {
            if let Some(value) = flag {
                log::info!("Using {name} from command line: {value}");
                return value.clone();
            }
            match lookup(name) {
                Some(value) if !value.trim().is_empty() => {
                    log::info!("Using {name} from environment: {value}");
                    value
                }
                _ => {
                    log::info!("Using default {name}: {default}");
                    default.to_string()
                }
            }
        };

        let feed_url = parse_url(
            "STOREFEED_FEED_URL",
            &setting(&args.feed_url, "STOREFEED_FEED_URL", DEFAULT_FEED_URL),
        )?;
        let database_url = parse_url(
            "STOREFEED_DATABASE_URL",
            &setting(
                &args.database_url,
                "STOREFEED_DATABASE_URL",
                DEFAULT_DATABASE_URL,
            ),
        )?;
        let db_path = setting(&args.db_path, "STOREFEED_DB_PATH", DEFAULT_DB_PATH);
        let key_format = setting(
            &args.key_format,
            "STOREFEED_KEY_FORMAT",
            &KeyFormat::default().to_string(),
        )
        .parse::<KeyFormat>()?;
        let timeout = setting(
            &args.timeout_secs.map(|secs| secs.to_string()),
            "STOREFEED_FETCH_TIMEOUT_SECS",
            &DEFAULT_TIMEOUT.as_secs().to_string(),
        );
        let fetch_timeout = match timeout.trim().parse::<u64>() {
            Ok(secs) if secs > 0 => Duration::from_secs(secs),
            _ => {
                return Err(SyncError::config(format!(
                    "STOREFEED_FETCH_TIMEOUT_SECS must be a positive integer, got '{timeout}'"
                )))
            }
        };

        Ok(Self {
            feed_url,
            target: DatabaseTarget::new(database_url, &db_path),
            key_format,
            fetch_timeout,
            dry_run: args.dry_run,
        })
    }
}

fn parse_url(name: &str, value: &str) -> SyncResult<Url> {
    let url = Url::parse(value.trim())
        .map_err(|e| SyncError::config(format!("{name} '{value}' is not a valid URL: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(SyncError::config(format!(
            "{name} must be http or https, got '{other}'"
        ))),
    }
}
