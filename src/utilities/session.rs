//! The single authentication-session abstraction used by every handler.
//!
//! A [`Session`] is resolved from an optional `Authorization: Bearer` access
//! token issued by the hosted auth provider. Handlers and the wizard only
//! ever ask three questions of it: who is signed in, require someone to be
//! signed in, or require nobody to be signed in.

use axum::{
    RequestPartsExt,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    TypedHeader,
    headers::{Authorization, authorization::Bearer},
};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::utilities::{
    config::Config,
    errors::AppError,
    jwt::{TokenType, verify_token},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Session {
    user_id: Option<Uuid>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self { user_id: None }
    }

    pub fn authenticated(user_id: Uuid) -> Self {
        Self {
            user_id: Some(user_id),
        }
    }

    pub fn get_session(&self) -> Option<Uuid> {
        self.user_id
    }

    pub fn require_session(&self) -> Result<Uuid, AppError> {
        self.user_id.ok_or(AppError::UnauthorizedError)
    }

    pub fn require_no_session(&self) -> Result<(), AppError> {
        match self.user_id {
            Some(_) => Err(AppError::AlreadyAuthenticatedError),
            None => Ok(()),
        }
    }
}

impl<S> FromRequestParts<S> for Session
where
    Config: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Ok(TypedHeader(Authorization(bearer))) =
            parts.extract::<TypedHeader<Authorization<Bearer>>>().await
        else {
            debug!("no bearer token, anonymous session");
            return Ok(Session::anonymous());
        };

        let config = Config::from_ref(state);

        match verify_token(&config, bearer.token()) {
            Ok(claims) if claims.typ == TokenType::Access => {
                Ok(Session::authenticated(claims.sub))
            }
            Ok(claims) => {
                warn!("rejected {:?} token used as access token", claims.typ);
                Ok(Session::anonymous())
            }
            Err(e) => {
                warn!("invalid access token: {}", e);
                Ok(Session::anonymous())
            }
        }
    }
}
