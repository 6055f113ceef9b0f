//! services/client/src/session.rs
//!
//! The identity provider: sign-up, sign-in, the current-user pointer, and
//! profile updates. Passwords are argon2-hashed on the way in; stored
//! records never hold plaintext, and a record whose hash does not parse
//! fails verification rather than being grandfathered in.

use std::sync::{Arc, Mutex};

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::Utc;
use tracing::{error, warn};

use tastebook_core::domain::{NewUser, User};
use tastebook_core::ports::{StoreError, UserStore};

use crate::adapters::local::{keys, LocalStore};
use crate::error::ClientError;

/// Resolves and mutates the "current user" pointer and authenticates
/// against the user store.
///
/// `remember = true` persists the pointer durably; `remember = false` keeps
/// it in memory only, so it dies with this provider — the session-scoped
/// variant of a browser sign-in.
pub struct SessionProvider {
    users: Arc<dyn UserStore>,
    local: LocalStore,
    transient: Mutex<Option<User>>,
}

impl SessionProvider {
    pub fn new(users: Arc<dyn UserStore>, local: LocalStore) -> Self {
        Self {
            users,
            local,
            transient: Mutex::new(None),
        }
    }

    /// Creates an account and signs it in.
    ///
    /// Rejects an email that is already registered (case-folded comparison).
    pub async fn sign_up(&self, new_user: NewUser, remember: bool) -> Result<User, ClientError> {
        let email = new_user.email.trim().to_lowercase();
        if email.is_empty() || new_user.password.trim().is_empty() {
            return Err(ClientError::Validation(
                "email and password are required".to_string(),
            ));
        }

        match self.users.get_by_email(&email).await {
            Ok(_) => {
                return Err(ClientError::Validation("Email already exists.".to_string()))
            }
            Err(StoreError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }

        // 1. Hash the password; plaintext goes no further than this frame.
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(new_user.password.as_bytes(), &salt)
            .map_err(|e| {
                error!("failed to hash password: {e}");
                ClientError::Internal("failed to hash password".to_string())
            })?
            .to_string();

        // 2. Create the user record.
        let user = User {
            id: String::new(),
            name: new_user.name.trim().to_string(),
            email,
            password_hash,
            avatar: new_user.avatar,
            favorites: Vec::new(),
            created_at: Utc::now().to_rfc3339(),
        };
        let created = self.users.create(user).await?;

        // 3. Point the session at it.
        self.set_current(created.clone(), remember)?;
        Ok(created)
    }

    /// Case-folded email lookup plus password verification. Every mismatch —
    /// unknown email, wrong password, unverifiable hash — yields the same
    /// generic error.
    pub async fn sign_in(
        &self,
        email: &str,
        password: &str,
        remember: bool,
    ) -> Result<User, ClientError> {
        let email = email.trim().to_lowercase();
        let user = match self.users.get_by_email(&email).await {
            Ok(user) => user,
            Err(StoreError::NotFound(_)) => return Err(ClientError::InvalidCredentials),
            Err(e) => return Err(e.into()),
        };

        let parsed = PasswordHash::new(&user.password_hash)
            .map_err(|_| ClientError::InvalidCredentials)?;
        if Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(ClientError::InvalidCredentials);
        }

        self.set_current(user.clone(), remember)?;
        Ok(user)
    }

    /// The signed-in user, if any. The in-memory pointer wins over the
    /// durable one; both are `None` after `sign_out`.
    pub fn current_user(&self) -> Option<User> {
        if let Some(user) = self.transient.lock().ok().and_then(|guard| guard.clone()) {
            return Some(user);
        }
        match self.local.get::<User>(keys::CURRENT_USER) {
            Ok(user) => user,
            Err(e) => {
                warn!("failed to read the current-user pointer: {e}");
                None
            }
        }
    }

    pub fn sign_out(&self) -> Result<(), ClientError> {
        if let Ok(mut guard) = self.transient.lock() {
            *guard = None;
        }
        self.local.remove(keys::CURRENT_USER)
    }

    /// Full-record profile replace; keeps whichever pointer is active in
    /// sync with the stored record.
    pub async fn update_profile(&self, user: User) -> Result<User, ClientError> {
        let updated = self.users.update(user).await?;
        if let Ok(mut guard) = self.transient.lock() {
            if guard.is_some() {
                *guard = Some(updated.clone());
                return Ok(updated);
            }
        }
        if self.local.get::<User>(keys::CURRENT_USER)?.is_some() {
            self.local.put(keys::CURRENT_USER, &updated)?;
        }
        Ok(updated)
    }

    fn set_current(&self, user: User, remember: bool) -> Result<(), ClientError> {
        if remember {
            if let Ok(mut guard) = self.transient.lock() {
                *guard = None;
            }
            self.local.put(keys::CURRENT_USER, &user)
        } else {
            // Session-scoped: drop any stale durable pointer so there is one
            // source of truth.
            self.local.remove(keys::CURRENT_USER)?;
            let mut guard = self
                .transient
                .lock()
                .map_err(|_| ClientError::Internal("session pointer lock poisoned".to_string()))?;
            *guard = Some(user);
            Ok(())
        }
    }
}
