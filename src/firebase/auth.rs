use chrono::{Duration, Utc};
use jsonwebtoken::{encode, Algorithm, Header};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::credentials::{CredentialError, ServiceAccount};

const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_DURATION_SECONDS: i64 = 60 * 60; // 1 hour, the maximum Google accepts
pub const DATABASE_SCOPES: &str = "https://www.googleapis.com/auth/firebase.database \
https://www.googleapis.com/auth/userinfo.email";

#[derive(Error, Debug)]
pub enum TokenError {
    #[error(transparent)]
    Credential(#[from] CredentialError),
    #[error("failed to sign token assertion: {0}")]
    Signing(jsonwebtoken::errors::Error),
    #[error("token request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("token endpoint rejected credentials: {0}")]
    Rejected(String),
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub scope: String,
    pub aud: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Builds the RS256-signed JWT that is exchanged for an access token.
pub fn create_assertion(account: &ServiceAccount) -> Result<String, TokenError> {
    let now = Utc::now();
    let claims = AssertionClaims {
        iss: account.client_email.clone(),
        scope: DATABASE_SCOPES.to_string(),
        aud: account.token_uri.clone(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ASSERTION_DURATION_SECONDS)).timestamp(),
    };

    let key = account.signing_key()?;
    encode(&Header::new(Algorithm::RS256), &claims, &key).map_err(TokenError::Signing)
}

/// Runs the OAuth2 JWT-bearer grant against the account's `token_uri`.
pub async fn fetch_access_token(
    client: &reqwest::Client,
    account: &ServiceAccount,
) -> Result<String, TokenError> {
    let assertion = create_assertion(account)?;

    let response = client
        .post(&account.token_uri)
        .form(&[("grant_type", GRANT_TYPE), ("assertion", assertion.as_str())])
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await?;
        let reason = match serde_json::from_str::<TokenErrorResponse>(&body) {
            Ok(err) => match err.error_description {
                Some(description) => format!("{status} {}: {description}", err.error),
                None => format!("{status} {}", err.error),
            },
            Err(_) => format!("{status} {body}"),
        };
        return Err(TokenError::Rejected(reason));
    }

    let token: TokenResponse = response.json().await?;
    log::debug!(
        "Obtained access token for {} (expires in {:?}s)",
        account.client_email,
        token.expires_in
    );
    Ok(token.access_token)
}
