//! User business logic - registration and credential checks.
//!
//! The very first account may be registered without a token (bootstrap);
//! afterwards only admins may register users.

use crate::{
    auth::{hash_password, verify_password},
    entities::{Role, User, user},
    errors::{Error, Result},
};
use sea_orm::{PaginatorTrait, QueryOrder, Set, prelude::*};
use serde::Deserialize;
use tracing::{info, warn};

/// Input for [`register_user`].
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NewUser {
    /// Unique login name
    pub username: String,
    /// Plain-text password, hashed before storage
    pub password: String,
    /// Access level, operator when absent
    #[serde(default)]
    pub role: Role,
}

/// True while the user store is empty.
pub async fn is_bootstrap_registration(db: &DatabaseConnection) -> Result<bool> {
    Ok(User::find().count(db).await? == 0)
}

/// Finds a user by login name.
pub async fn get_user_by_username(
    db: &DatabaseConnection,
    username: &str,
) -> Result<Option<user::Model>> {
    User::find()
        .filter(user::Column::Username.eq(username))
        .one(db)
        .await
        .map_err(Into::into)
}

/// Lists all users ordered by id.
pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<user::Model>> {
    User::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Registers a user.
///
/// `caller_role` is the role of the authenticated caller, if any. Outside of
/// bootstrap, anything but an admin caller is rejected.
pub async fn register_user(
    db: &DatabaseConnection,
    caller_role: Option<Role>,
    new_user: NewUser,
    bcrypt_cost: u32,
) -> Result<user::Model> {
    if !is_bootstrap_registration(db).await? && caller_role != Some(Role::Admin) {
        return Err(Error::authorization("Only admins can register users"));
    }

    let username = new_user.username.trim();
    if username.is_empty() {
        return Err(Error::validation("Username cannot be empty"));
    }
    if new_user.password.is_empty() {
        return Err(Error::validation("Password cannot be empty"));
    }
    if get_user_by_username(db, username).await?.is_some() {
        return Err(Error::validation("Username already registered"));
    }

    let account = user::ActiveModel {
        username: Set(username.to_string()),
        hashed_password: Set(hash_password(&new_user.password, bcrypt_cost)?),
        role: Set(new_user.role),
        ..Default::default()
    };
    let created = account.insert(db).await?;
    info!(user_id = created.id, username = %created.username, role = ?created.role, "User registered");
    Ok(created)
}

/// Checks a username/password pair and returns the matching user.
pub async fn authenticate_user(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<user::Model> {
    match get_user_by_username(db, username).await? {
        Some(account) if verify_password(password, &account.hashed_password) => Ok(account),
        _ => {
            warn!(username, "Rejected login attempt");
            Err(Error::authentication("Incorrect username or password"))
        }
    }
}
