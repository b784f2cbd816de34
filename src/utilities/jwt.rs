use crate::utilities::errors::AppError;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::utilities::config::Config;

#[derive(Serialize, Deserialize, PartialEq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: Uuid,
    pub typ: TokenType,
    pub exp: i64,
    pub iat: i64,
}

/// Tokens are minted by the hosted auth provider in production; this is used
/// by tooling and tests that need a token signed with the shared secret.
pub fn create_token(
    config: &Config,
    user_id: Uuid,
    typ: TokenType,
    ttl: Duration,
) -> Result<String, AppError> {
    let now = Utc::now();
    let exp = now + ttl;

    let claims = Claims {
        sub: user_id,
        typ,
        iat: now.timestamp(),
        exp: exp.timestamp(),
    };

    let encoding_key = EncodingKey::from_secret(config.jwt_secret_key.as_bytes());
    let encoded_token = encode(&Header::new(Algorithm::HS256), &claims, &encoding_key)?;
    Ok(encoded_token)
}

pub fn verify_token(config: &Config, token: &str) -> Result<Claims, AppError> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_key.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )?;
    Ok(token_data.claims)
}
