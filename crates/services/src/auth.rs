//! Session provider boundary.
//!
//! Authentication itself lives outside this crate; services only observe who
//! is signed in through a [`SessionProvider`].

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tracing::info;
use url::form_urlencoded;

use quiz_core::model::UserId;

use crate::error::SessionProviderError;

/// The signed-in user as reported by the session provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: UserId,
    pub email: Option<String>,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
}

impl AuthUser {
    /// Display name, falling back to the email address.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .or(self.email.as_deref())
            .unwrap_or(self.uid.as_str())
    }

    /// Profile picture, or a generated avatar keyed by the email address.
    #[must_use]
    pub fn avatar_url(&self) -> String {
        if let Some(photo) = self.photo_url.as_deref().filter(|p| !p.trim().is_empty()) {
            return photo.to_owned();
        }
        let name: String =
            form_urlencoded::byte_serialize(self.email.as_deref().unwrap_or_default().as_bytes())
                .collect();
        format!("https://ui-avatars.com/api/?name={name}&background=0D8ABC&color=fff")
    }
}

/// Current session, `None` when signed out.
pub type Session = Option<AuthUser>;

/// Source of authentication state.
#[async_trait]
pub trait SessionProvider: Send + Sync {
    fn current_user(&self) -> Session;

    /// Receiver notified on every session change.
    fn subscribe(&self) -> watch::Receiver<Session>;

    /// # Errors
    ///
    /// Returns `SessionProviderError` when the credentials are rejected or the
    /// provider is unreachable.
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, SessionProviderError>;

    /// # Errors
    ///
    /// Returns `SessionProviderError` when the account cannot be created.
    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthUser, SessionProviderError>;

    /// # Errors
    ///
    /// Returns `SessionProviderError` if the provider is unreachable.
    async fn sign_out(&self) -> Result<(), SessionProviderError>;
}

/// Desktop stand-in provider that trusts whatever email it is given.
///
/// It performs no password verification; the user id is the normalized email.
#[derive(Clone)]
pub struct LocalSessionProvider {
    sender: Arc<watch::Sender<Session>>,
}

impl Default for LocalSessionProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl LocalSessionProvider {
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Provider that starts already signed in as `email`.
    ///
    /// # Errors
    ///
    /// Returns `SessionProviderError::InvalidEmail` if `email` is not usable.
    pub fn signed_in_as(email: &str) -> Result<Self, SessionProviderError> {
        let provider = Self::new();
        let user = local_user(email, None)?;
        provider.sender.send_replace(Some(user));
        Ok(provider)
    }

    fn publish(&self, user: AuthUser) -> AuthUser {
        info!(user = %user.uid, "signed in");
        self.sender.send_replace(Some(user.clone()));
        user
    }
}

fn local_user(email: &str, display_name: Option<&str>) -> Result<AuthUser, SessionProviderError> {
    let email = email.trim().to_lowercase();
    let valid = email
        .split_once('@')
        .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !valid || email.chars().any(char::is_whitespace) {
        return Err(SessionProviderError::InvalidEmail);
    }
    let uid = UserId::new(email.clone()).map_err(|_| SessionProviderError::InvalidEmail)?;
    Ok(AuthUser {
        uid,
        email: Some(email),
        display_name: display_name
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_owned),
        photo_url: None,
    })
}

#[async_trait]
impl SessionProvider for LocalSessionProvider {
    fn current_user(&self) -> Session {
        self.sender.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Session> {
        self.sender.subscribe()
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, SessionProviderError> {
        if password.is_empty() {
            return Err(SessionProviderError::EmptyPassword);
        }
        let user = local_user(email, None)?;
        Ok(self.publish(user))
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        display_name: Option<&str>,
    ) -> Result<AuthUser, SessionProviderError> {
        if password.is_empty() {
            return Err(SessionProviderError::EmptyPassword);
        }
        let user = local_user(email, display_name)?;
        Ok(self.publish(user))
    }

    async fn sign_out(&self) -> Result<(), SessionProviderError> {
        if let Some(user) = self.sender.send_replace(None) {
            info!(user = %user.uid, "signed out");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: Option<&str>, photo: Option<&str>) -> AuthUser {
        AuthUser {
            uid: UserId::new("u1").unwrap(),
            email: email.map(str::to_owned),
            display_name: None,
            photo_url: photo.map(str::to_owned),
        }
    }

    #[test]
    fn avatar_falls_back_to_generated_image() {
        assert_eq!(
            user(Some("ada+quiz@example.com"), None).avatar_url(),
            "https://ui-avatars.com/api/?name=ada%2Bquiz%40example.com&background=0D8ABC&color=fff"
        );
        assert_eq!(
            user(None, Some("https://img.example/a.png")).avatar_url(),
            "https://img.example/a.png"
        );
    }

    #[test]
    fn label_prefers_display_name_then_email() {
        let mut u = user(Some("ada@example.com"), None);
        assert_eq!(u.label(), "ada@example.com");
        u.display_name = Some("Ada".into());
        assert_eq!(u.label(), "Ada");
        assert_eq!(user(None, None).label(), "u1");
    }

    #[tokio::test]
    async fn sign_in_and_out_notify_subscribers() {
        let provider = LocalSessionProvider::new();
        let mut rx = provider.subscribe();
        assert!(provider.current_user().is_none());

        let signed = provider.sign_in(" Ada@Example.com ", "secret").await.unwrap();
        assert_eq!(signed.uid.as_str(), "ada@example.com");
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().as_ref(), Some(&signed));

        provider.sign_out().await.unwrap();
        rx.changed().await.unwrap();
        assert!(rx.borrow_and_update().is_none());
    }

    #[tokio::test]
    async fn rejects_bad_credentials() {
        let provider = LocalSessionProvider::new();
        assert_eq!(
            provider.sign_in("not-an-email", "pw").await.unwrap_err(),
            SessionProviderError::InvalidEmail
        );
        assert_eq!(
            provider.sign_in("a@b.c", "").await.unwrap_err(),
            SessionProviderError::EmptyPassword
        );
        assert!(provider.current_user().is_none());
    }

    #[tokio::test]
    async fn sign_up_keeps_display_name() {
        let provider = LocalSessionProvider::new();
        let user = provider
            .sign_up("grace@example.com", "pw", Some("Grace"))
            .await
            .unwrap();
        assert_eq!(user.display_name.as_deref(), Some("Grace"));
        assert_eq!(provider.current_user(), Some(user));
    }

    #[test]
    fn signed_in_as_starts_with_session() {
        let provider = LocalSessionProvider::signed_in_as("dev@example.com").unwrap();
        assert_eq!(
            provider.current_user().unwrap().email.as_deref(),
            Some("dev@example.com")
        );
    }
}
