//! services/cli/src/commands/auth.rs
//!
//! Registration, login, logout and whoami.

use classdocs_core::domain::{Role, User};
use classdocs_core::permissions::{self, CommandKind};
use classdocs_core::ports::{DatabaseService, PortError, PortResult};

use crate::error::CliError;
use crate::output::print_success;
use crate::session::hash_password;
use crate::state::AppState;

/// Registers a user after enforcing the registration policy:
///
/// - student accounts are public self-registration, session or not;
/// - teacher and admin accounts require an authenticated admin;
/// - exception: the very first admin may be registered unauthenticated so a
///   fresh install can be bootstrapped, and only one admin may ever exist.
pub async fn register_user(
    state: &AppState,
    name: &str,
    email: &str,
    role: Role,
    password: &str,
) -> PortResult<User> {
    let current = state.session().current().await?;

    match role {
        Role::Student => {}
        Role::Teacher | Role::Admin => match &current {
            Some(user) => permissions::require(user.role, CommandKind::Register)?,
            None if role == Role::Admin && state.db.count_admins().await? == 0 => {}
            None => return Err(PortError::NotAuthenticated),
        },
    }

    if role == Role::Admin && state.db.count_admins().await? > 0 {
        return Err(PortError::InvalidArgument(
            "an admin already exists; cannot register another".to_string(),
        ));
    }

    let password_hash = hash_password(password)?;
    state.db.create_user(name, email, role, &password_hash).await
}

pub async fn register(
    state: &AppState,
    name: &str,
    email: &str,
    role_str: &str,
    password: Option<String>,
) -> Result<(), CliError> {
    let role: Role = role_str
        .parse()
        .map_err(|e: String| PortError::InvalidArgument(e))?;

    let password = match password {
        Some(p) => p,
        None => prompt_new_password()?,
    };
    let user = register_user(state, name, email, role, &password).await?;
    print_success(&format!("User {} ({}) registered.", user.name, user.role));
    Ok(())
}

pub async fn login(
    state: &AppState,
    email: &str,
    password: Option<String>,
) -> Result<(), CliError> {
    let password = match password {
        Some(p) => p,
        None => prompt_password()?,
    };
    let user = state.session().login(email, &password).await?;
    print_success(&format!("Logged in as {} ({}).", user.name, user.role));
    Ok(())
}

pub async fn logout(state: &AppState) -> Result<(), CliError> {
    if state.session().logout().await? {
        print_success("Logged out.");
    } else {
        print_success("Not logged in.");
    }
    Ok(())
}

pub async fn whoami(user: &User) -> Result<(), CliError> {
    print_success(&format!("{} <{}> ({})", user.name, user.email, user.role));
    Ok(())
}

fn prompt_password() -> Result<String, CliError> {
    dialoguer::Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(|e| CliError::Internal(format!("password prompt failed: {e}")))
}

fn prompt_new_password() -> Result<String, CliError> {
    dialoguer::Password::new()
        .with_prompt("Password")
        .with_confirmation("Confirm password", "Passwords do not match.")
        .interact()
        .map_err(|e| CliError::Internal(format!("password prompt failed: {e}")))
}
