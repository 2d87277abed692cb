// Auth gate: login against the credential store, principal-gated operations.
use std::fmt;

use crate::core::credentials::CredentialStore;
use crate::core::error::{Error, ErrorKind};

/// The two roles the gate recognizes. Stored role text outside this set
/// authenticates but never yields a session.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Role {
    Admin,
    Student,
}

impl Role {
    pub fn parse(text: &str) -> Option<Role> {
        match text {
            "admin" => Some(Role::Admin),
            "student" => Some(Role::Student),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Student => "student",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated identity for the rest of the process lifetime. There is
/// no logout transition; the process ends instead.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Principal {
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Eq, PartialEq)]
pub enum LoginOutcome {
    LoggedIn(Principal),
    /// No record matched the username/password pair.
    BadCredentials,
    /// Credentials matched but the stored role is not a recognized value;
    /// carries the raw role text for the denial message.
    UnknownRole(String),
}

pub fn login(
    store: &CredentialStore,
    username: &str,
    password: &str,
) -> Result<LoginOutcome, Error> {
    match store.authenticate(username, password)? {
        None => Ok(LoginOutcome::BadCredentials),
        Some(credential) => match Role::parse(&credential.role) {
            Some(role) => Ok(LoginOutcome::LoggedIn(Principal {
                username: credential.username,
                role,
            })),
            None => Ok(LoginOutcome::UnknownRole(credential.role)),
        },
    }
}

/// Remove another user's account. Removing the account behind the active
/// session is refused; the store-level remove has no such guard.
pub fn remove_user(
    principal: &Principal,
    store: &CredentialStore,
    username: &str,
) -> Result<(), Error> {
    if principal.username == username {
        return Err(Error::new(ErrorKind::Permission)
            .with_message("cannot delete the account of the active session")
            .with_key(username));
    }
    store.remove(username)
}

/// Change the password of the account behind the active session. The
/// in-memory session continues; the new password takes effect at next login.
pub fn change_password(
    principal: &Principal,
    store: &CredentialStore,
    new_password: &str,
) -> Result<(), Error> {
    store.update_password(&principal.username, new_password)
}
