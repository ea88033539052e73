//! Profile resolution: read, lazily create, or fall back.

use crate::deadline::with_deadline;
use crate::{CurrentUser, ProfileLookupError, SessionError, SessionResult};
use platform_client::{AuthUser, DataStore, Filter, PlatformError};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Table holding one profile per auth user.
pub const PROFILES_TABLE: &str = "profiles";

/// A row of the profiles table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileRow {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    /// Display name.
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub is_admin: bool,
    #[serde(default)]
    pub avatar_url: Option<String>,
}

impl ProfileRow {
    /// Row inserted on first sign-in: never admin, named after the email.
    pub fn initial(user: &AuthUser) -> Self {
        let email = user.email_or_empty().to_string();
        Self {
            id: user.id.clone(),
            email: Some(email.clone()),
            name: Some(email),
            is_admin: false,
            avatar_url: None,
        }
    }

    fn into_current_user(self, user: &AuthUser) -> CurrentUser {
        let email = self
            .email
            .filter(|e| !e.is_empty())
            .unwrap_or_else(|| user.email_or_empty().to_string());
        let display_name = self
            .name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| email.clone());
        CurrentUser {
            id: self.id,
            email,
            display_name,
            is_admin: self.is_admin,
            avatar_url: self.avatar_url,
        }
    }
}

fn lookup_error(err: PlatformError) -> SessionError {
    match err {
        PlatformError::NoRows => ProfileLookupError::NoRows.into(),
        other => ProfileLookupError::Query(other.to_string()).into(),
    }
}

/// Reads and creates profile rows, each call bounded by `call_timeout`.
pub struct ProfileRepository {
    data: Arc<dyn DataStore>,
    call_timeout: Duration,
    /// Identities whose row was inserted, or found to exist on insert.
    creation_attempted: HashSet<String>,
}

impl ProfileRepository {
    pub fn new(data: Arc<dyn DataStore>, call_timeout: Duration) -> Self {
        Self {
            data,
            call_timeout,
            creation_attempted: HashSet::new(),
        }
    }

    /// Read the profile row for `user_id`.
    pub async fn fetch(&self, user_id: &str) -> SessionResult<ProfileRow> {
        let row = with_deadline(
            "profiles.select",
            self.call_timeout,
            self.data.select_single(PROFILES_TABLE, &Filter::by_id(user_id)),
        )
        .await?
        .map_err(lookup_error)?;
        serde_json::from_value(row)
            .map_err(|e| ProfileLookupError::Query(format!("malformed profile row: {e}")).into())
    }

    async fn create(&mut self, user: &AuthUser) -> SessionResult<ProfileRow> {
        let row = serde_json::to_value(ProfileRow::initial(user))
            .map_err(|e| ProfileLookupError::Query(e.to_string()))?;
        let stored = with_deadline(
            "profiles.insert",
            self.call_timeout,
            self.data.insert(PROFILES_TABLE, row),
        )
        .await?;
        match stored {
            Ok(stored) => {
                self.creation_attempted.insert(user.id.clone());
                serde_json::from_value(stored).map_err(|e| {
                    ProfileLookupError::Query(format!("malformed profile row: {e}")).into()
                })
            }
            // Created concurrently by another client.
            Err(PlatformError::Conflict(_)) => {
                self.creation_attempted.insert(user.id.clone());
                debug!(user_id = %user.id, "profile already exists, re-reading");
                self.fetch(&user.id).await
            }
            Err(e) => Err(lookup_error(e)),
        }
    }

    /// Resolve the storefront user for an authenticated identity. Never
    /// fails: any error yields [`CurrentUser::fallback`].
    pub async fn resolve(&mut self, user: &AuthUser) -> CurrentUser {
        let fallback = || CurrentUser::fallback(&user.id, user.email_or_empty());

        match self.fetch(&user.id).await {
            Ok(row) => row.into_current_user(user),
            Err(SessionError::ProfileLookup(ProfileLookupError::NoRows)) => {
                if self.creation_attempted.contains(&user.id) {
                    warn!(user_id = %user.id, "profile still missing after creation attempt, using fallback");
                    return fallback();
                }
                match self.create(user).await {
                    Ok(row) => {
                        info!(user_id = %user.id, "created profile");
                        row.into_current_user(user)
                    }
                    Err(e) => {
                        warn!(user_id = %user.id, error = %e, "profile creation failed, using fallback");
                        fallback()
                    }
                }
            }
            Err(e) => {
                warn!(user_id = %user.id, error = %e, "profile lookup failed, using fallback");
                fallback()
            }
        }
    }
}
