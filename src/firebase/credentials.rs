use std::{env, fs, path::Path};

use jsonwebtoken::EncodingKey;
use serde::Deserialize;
use thiserror::Error;

pub const CREDENTIALS_ENV: &str = "FIREBASE_SERVICE_ACCOUNT_KEY";
pub const CREDENTIALS_FILE_ENV: &str = "FIREBASE_SERVICE_ACCOUNT_FILE";
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("neither FIREBASE_SERVICE_ACCOUNT_KEY nor FIREBASE_SERVICE_ACCOUNT_FILE is set")]
    Missing,
    #[error("could not read credential file '{path}': {source}")]
    Unreadable {
        path: String,
        source: std::io::Error,
    },
    #[error("credential blob is not valid service account JSON: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("credential field '{0}' is empty")]
    EmptyField(&'static str),
    #[error("private key is not a valid RSA PEM: {0}")]
    InvalidKey(jsonwebtoken::errors::Error),
}

/// The subset of a Google service account key file needed to mint tokens.
#[derive(Clone, Deserialize)]
pub struct ServiceAccount {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

// Keep the private key out of logs.
impl std::fmt::Debug for ServiceAccount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccount")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl ServiceAccount {
    pub fn from_json(blob: &str) -> Result<Self, CredentialError> {
        let account: ServiceAccount = serde_json::from_str(blob)?;
        account.validate()?;
        Ok(account)
    }

    pub fn from_file(path: &Path) -> Result<Self, CredentialError> {
        let blob = fs::read_to_string(path).map_err(|source| CredentialError::Unreadable {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&blob)
    }

    pub fn from_env() -> Result<Self, CredentialError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Inline JSON in `FIREBASE_SERVICE_ACCOUNT_KEY` takes precedence over a
    /// path in `FIREBASE_SERVICE_ACCOUNT_FILE`. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, CredentialError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let present = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(blob) = present(CREDENTIALS_ENV) {
            log::info!("Using service account from {CREDENTIALS_ENV}");
            return Self::from_json(&blob);
        }
        match present(CREDENTIALS_FILE_ENV) {
            Some(path) => {
                log::info!("Using service account file from {CREDENTIALS_FILE_ENV}: {path}");
                Self::from_file(Path::new(path.trim()))
            }
            None => Err(CredentialError::Missing),
        }
    }

    pub fn signing_key(&self) -> Result<EncodingKey, CredentialError> {
        EncodingKey::from_rsa_pem(self.private_key.as_bytes()).map_err(CredentialError::InvalidKey)
    }

    fn validate(&self) -> Result<(), CredentialError> {
        if self.client_email.trim().is_empty() {
            return Err(CredentialError::EmptyField("client_email"));
        }
        if self.private_key.trim().is_empty() {
            return Err(CredentialError::EmptyField("private_key"));
        }
        if self.token_uri.trim().is_empty() {
            return Err(CredentialError::EmptyField("token_uri"));
        }
        Ok(())
    }
}
