// Credential store: append-only creates plus rewrite-pass mutations.
use std::path::{Path, PathBuf};

use tracing::info;

use crate::core::codec::{Credential, CredentialCodec};
use crate::core::error::{Error, ErrorKind};
use crate::core::rewrite::{self, Decision};

/// Accounts seeded into a store file that does not exist yet.
pub const DEFAULT_ACCOUNTS: [(&str, &str, &str); 2] =
    [("admin", "admin", "admin"), ("student", "student", "student")];

/// One `username password role` file, scanned front to back on every
/// operation. The file is the only state; nothing is cached between calls.
#[derive(Clone, Debug)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Seed the default accounts if the store file is missing.
    ///
    /// Returns whether the file was created.
    pub fn ensure_defaults(&self) -> Result<bool, Error> {
        if self.path.exists() {
            return Ok(false);
        }
        for (username, password, role) in DEFAULT_ACCOUNTS {
            rewrite::append(
                &self.path,
                &CredentialCodec,
                &Credential {
                    username: username.to_string(),
                    password: password.to_string(),
                    role: role.to_string(),
                },
            )?;
        }
        info!(path = %self.path.display(), "credential store created with default accounts");
        Ok(true)
    }

    /// Whether any record carries `username`. First match short-circuits.
    pub fn exists(&self, username: &str) -> Result<bool, Error> {
        let hit = rewrite::find_first(&self.path, &CredentialCodec, |record| {
            record.username == username
        })?;
        Ok(hit.is_some())
    }

    /// Append a new credential record.
    ///
    /// Only uniqueness is enforced here; username shape and role values are
    /// the caller's contract (the store round-trips whatever it is given).
    pub fn create(&self, credential: &Credential) -> Result<(), Error> {
        if self.exists(&credential.username)? {
            return Err(Error::new(ErrorKind::AlreadyExists)
                .with_path(&self.path)
                .with_key(credential.username.as_str()));
        }
        rewrite::append(&self.path, &CredentialCodec, credential)
    }

    /// Drop the record for `username` via a rewrite pass.
    pub fn remove(&self, username: &str) -> Result<(), Error> {
        let found = rewrite::rewrite(&self.path, &CredentialCodec, |record| {
            if record.username == username {
                Decision::Drop
            } else {
                Decision::Keep
            }
        })?;
        if !found {
            return Err(Error::new(ErrorKind::NotFound)
                .with_path(&self.path)
                .with_key(username));
        }
        Ok(())
    }

    /// Replace the password for `username`, preserving the stored role
    /// verbatim (even when it is not a recognized role value).
    pub fn update_password(&self, username: &str, new_password: &str) -> Result<(), Error> {
        let found = rewrite::rewrite(&self.path, &CredentialCodec, |record| {
            if record.username == username {
                Decision::Replace(Credential {
                    username: record.username.clone(),
                    password: new_password.to_string(),
                    role: record.role.clone(),
                })
            } else {
                Decision::Keep
            }
        })?;
        if !found {
            return Err(Error::new(ErrorKind::NotFound)
                .with_path(&self.path)
                .with_key(username));
        }
        Ok(())
    }

    /// Exact-match scan for `username`/`password`; first hit wins.
    ///
    /// Bootstraps the default accounts first when the store file does not
    /// exist yet.
    pub fn authenticate(&self, username: &str, password: &str) -> Result<Option<Credential>, Error> {
        self.ensure_defaults()?;
        rewrite::find_first(&self.path, &CredentialCodec, |record| {
            record.username == username && record.password == password
        })
    }
}
