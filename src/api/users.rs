//! Registration and login handlers.
//!
//! ```text
//! POST /auth/register {"username":"admin","password":"secret","role":"admin"}
//! POST /auth/login    username=admin&password=secret   (form encoded)
//! ```

use super::{AppState, auth::OptionalUser};
use crate::{
    auth::issue_token,
    core::user::{self, NewUser},
    errors::Result,
};
use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};

/// Form body of `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    username: String,
    password: String,
}

/// Successful login response.
#[derive(Debug, Serialize, Deserialize)]
pub struct TokenResponse {
    /// Signed JWT
    pub access_token: String,
    /// Always `"bearer"`
    pub token_type: String,
}

/// Registers a user. Open while no user exists, admin-only afterwards.
#[post("/auth/register")]
pub async fn register(
    state: web::Data<AppState>,
    caller: OptionalUser,
    payload: web::Json<NewUser>,
) -> Result<HttpResponse> {
    let created = user::register_user(
        &state.db,
        caller.0.map(|c| c.role),
        payload.into_inner(),
        state.auth.bcrypt_cost,
    )
    .await?;
    Ok(HttpResponse::Created().json(created))
}

/// Exchanges a username and password for a bearer token.
#[post("/auth/login")]
pub async fn login(
    state: web::Data<AppState>,
    form: web::Form<LoginForm>,
) -> Result<web::Json<TokenResponse>> {
    let account = user::authenticate_user(&state.db, &form.username, &form.password).await?;
    let access_token = issue_token(&state.auth, &account.username, account.role)?;
    Ok(web::Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
    }))
}
