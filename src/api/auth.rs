//! Bearer-token extractor and role checks.

use super::AppState;
use crate::{
    auth::decode_token,
    entities::Role,
    errors::{Error, Result},
};
use actix_web::{FromRequest, HttpRequest, dev::Payload, http::header, web};
use std::future::{Ready, ready};

const BEARER_SCHEME: &str = "Bearer";

/// Caller identity decoded from the `Authorization: Bearer` header.
///
/// Extraction fails with 401 when the header is missing or the token does not
/// verify. Endpoints that also accept anonymous callers use [`OptionalUser`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthenticatedUser {
    /// Username from the token subject
    pub username: String,
    /// Role claim
    pub role: Role,
}

impl AuthenticatedUser {
    fn from_http_request(req: &HttpRequest) -> Result<Self> {
        let state = req
            .app_data::<web::Data<AppState>>()
            .ok_or_else(|| Error::config("Application state is not registered"))?;

        let value = req
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| Error::authentication("Not authenticated"))?;
        let token = value
            .split_once(' ')
            .filter(|(scheme, _)| scheme.eq_ignore_ascii_case(BEARER_SCHEME))
            .map(|(_, token)| token.trim())
            .ok_or_else(|| Error::authentication("Expected a bearer token"))?;

        let claims = decode_token(&state.auth, token)?;
        Ok(Self {
            username: claims.sub,
            role: claims.role,
        })
    }

    /// Fails with 403 unless the caller is an admin.
    pub fn require_admin(&self) -> Result<()> {
        self.require_role(&[Role::Admin])
    }

    /// Fails with 403 unless the caller may mutate work plans.
    pub fn require_operator(&self) -> Result<()> {
        self.require_role(&[Role::Admin, Role::Operator])
    }

    fn require_role(&self, allowed: &[Role]) -> Result<()> {
        if allowed.contains(&self.role) {
            Ok(())
        } else {
            Err(Error::authorization("Insufficient permissions"))
        }
    }
}

impl FromRequest for AuthenticatedUser {
    type Error = Error;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Self::from_http_request(req))
    }
}

/// Caller identity for endpoints open to anonymous callers.
///
/// Only a missing `Authorization` header is anonymous; a header that is
/// present but does not verify still fails with 401.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OptionalUser(pub Option<AuthenticatedUser>);

impl FromRequest for OptionalUser {
    type Error = Error;
    type Future = Ready<Result<Self>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        if req.headers().contains_key(header::AUTHORIZATION) {
            ready(AuthenticatedUser::from_http_request(req).map(|user| Self(Some(user))))
        } else {
            ready(Ok(Self(None)))
        }
    }
}
