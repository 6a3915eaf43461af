use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use quiz_core::model::{UserId, UserProfile};
use storage::Document;
use storage::repository::ProfileRepository;

use crate::auth::AuthUser;
use crate::error::ProfileError;

/// Encode a serializable value as a top-level document.
///
/// # Errors
///
/// Fails if `value` does not serialize to a JSON object.
pub fn to_document<T: Serialize>(value: &T) -> Result<Document, serde_json::Error> {
    serde_json::from_value(serde_json::to_value(value)?)
}

/// Reads and bootstraps per-user profile documents.
#[derive(Clone)]
pub struct ProfileService {
    profiles: Arc<dyn ProfileRepository>,
}

impl ProfileService {
    #[must_use]
    pub fn new(profiles: Arc<dyn ProfileRepository>) -> Self {
        Self { profiles }
    }

    /// Create `{name, email, quizProgress: {}, scores: {}}` for `user` unless a
    /// document already exists. Returns whether one was created.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` if the document cannot be encoded or stored.
    pub async fn ensure_profile(&self, user: &AuthUser) -> Result<bool, ProfileError> {
        let initial = UserProfile::new(user.display_name.as_deref(), user.email.as_deref());
        let created = self
            .profiles
            .create_profile_if_missing(&user.uid, to_document(&initial)?)
            .await?;
        if created {
            info!(user = %user.uid, "created profile document");
        } else {
            debug!(user = %user.uid, "profile document already present");
        }
        Ok(created)
    }

    /// Typed profile of `user`, `None` if no document exists yet.
    ///
    /// # Errors
    ///
    /// Returns `ProfileError` on storage failures or a document that does not
    /// decode as a profile.
    pub async fn load(&self, user: &UserId) -> Result<Option<UserProfile>, ProfileError> {
        let Some(document) = self.profiles.get_profile(user).await? else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_value(Value::Object(document))?))
    }
}
