//! End-to-end flows over the gateway, store and guard with a scripted
//! in-memory identity provider.

use std::sync::Arc;

use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::Notify;
use uuid::Uuid;

use talentdesk_console::identity::provider::{
    IdentityProvider, ProviderError, ProviderSession, ProviderUser, SignupMetadata,
};
use talentdesk_console::{
    AuthError, AuthGateway, RouteDecision, RouteGuard, SessionStore, SignupRequest,
};

fn provider_session(email: &str) -> ProviderSession {
    ProviderSession {
        user: ProviderUser {
            id: Uuid::new_v4(),
            email: email.to_string(),
            email_confirmed_at: Some(Utc::now()),
        },
        profile: None,
        organization: None,
        roles: vec![],
    }
}

/// Scripted provider: records calls, optionally rejects sign-in for a
/// configured password, and can gate responses behind a [`Notify`] so
/// tests control async interleaving.
struct ScriptedProvider {
    calls: Mutex<Vec<String>>,
    valid_password: String,
    /// When set, sign_in blocks until released and signals entry
    gate: Option<Gate>,
}

struct Gate {
    entered: Notify,
    release: Notify,
}

impl ScriptedProvider {
    fn new(valid_password: &str) -> Self {
        Self {
            calls: Mutex::new(vec![]),
            valid_password: valid_password.to_string(),
            gate: None,
        }
    }

    fn gated(valid_password: &str) -> Self {
        Self {
            gate: Some(Gate {
                entered: Notify::new(),
                release: Notify::new(),
            }),
            ..Self::new(valid_password)
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().clone()
    }
}

#[async_trait::async_trait]
impl IdentityProvider for ScriptedProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderSession, ProviderError> {
        self.calls.lock().push(format!("sign_in:{email}"));

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        if password == self.valid_password {
            Ok(provider_session(email))
        } else {
            Err(ProviderError::InvalidCredentials)
        }
    }

    async fn sign_up(
        &self,
        email: &str,
        _password: &str,
        metadata: SignupMetadata,
    ) -> Result<(), ProviderError> {
        self.calls
            .lock()
            .push(format!("sign_up:{email}:role={}", metadata.role));
        Ok(())
    }

    async fn update_password(&self, _new_password: &str) -> Result<(), ProviderError> {
        self.calls.lock().push("update_password".to_string());
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<ProviderSession>, ProviderError> {
        self.calls.lock().push("current_session".to_string());

        if let Some(gate) = &self.gate {
            gate.entered.notify_one();
            gate.release.notified().await;
        }

        Ok(Some(provider_session("a@b.com")))
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        self.calls.lock().push("sign_out".to_string());
        Ok(())
    }
}

#[tokio::test]
async fn signup_assigns_default_role_and_does_not_create_a_session() {
    let provider = Arc::new(ScriptedProvider::new("Pw123!"));
    let store = Arc::new(SessionStore::new());
    let gateway = AuthGateway::new(provider.clone(), store.clone());

    gateway
        .signup(&SignupRequest {
            email: "a@b.com".to_string(),
            password: "Pw123!".to_string(),
            phone: "+1000".to_string(),
            full_name: "A B".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(provider.calls(), vec!["sign_up:a@b.com:role=user"]);
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn login_with_missing_password_fails_before_any_network_call() {
    let provider = Arc::new(ScriptedProvider::new("Pw123!"));
    let gateway = AuthGateway::new(provider.clone(), Arc::new(SessionStore::new()));

    let err = gateway.login("a@b.com", "").await.unwrap_err();
    assert_eq!(err, AuthError::MissingFields(vec!["password".to_string()]));
    assert!(provider.calls().is_empty());
}

#[tokio::test]
async fn wrong_current_password_leaves_the_password_unchanged() {
    let provider = Arc::new(ScriptedProvider::new("rightOld"));
    let gateway = AuthGateway::new(provider.clone(), Arc::new(SessionStore::new()));

    let err = gateway
        .update_password("a@b.com", "wrongOld", "NewPw1!")
        .await
        .unwrap_err();

    assert_eq!(err, AuthError::ReauthFailed);
    // The provider's update call was never issued
    assert_eq!(provider.calls(), vec!["sign_in:a@b.com"]);
}

#[tokio::test]
async fn login_resolving_after_logout_does_not_resurrect_the_session() {
    let provider = Arc::new(ScriptedProvider::gated("Pw123!"));
    let store = Arc::new(SessionStore::new());
    let gateway = Arc::new(AuthGateway::new(provider.clone(), store.clone()));

    let login = {
        let gateway = gateway.clone();
        tokio::spawn(async move { gateway.login("a@b.com", "Pw123!").await })
    };

    let gate = provider.gate.as_ref().unwrap();
    // Wait until the login call reached the provider, then log out
    // while its response is still pending.
    gate.entered.notified().await;
    gateway.logout().await;
    gate.release.notify_one();

    login.await.unwrap().unwrap();
    assert!(!store.is_authenticated());
}

#[tokio::test]
async fn session_fetch_superseded_by_logout_is_discarded() {
    let provider = Arc::new(ScriptedProvider::gated("Pw123!"));
    let store = Arc::new(SessionStore::new());
    let gateway = Arc::new(AuthGateway::new(provider.clone(), store.clone()));

    let refresh = {
        let gateway = gateway.clone();
        tokio::spawn(async move { gateway.refresh_session().await })
    };

    let gate = provider.gate.as_ref().unwrap();
    gate.entered.notified().await;
    gateway.logout().await;
    gate.release.notify_one();

    refresh.await.unwrap();
    assert!(!store.is_authenticated());
    assert!(store.is_settled());
}

#[tokio::test]
async fn guard_follows_the_session_lifecycle() {
    let provider = Arc::new(ScriptedProvider::new("Pw123!"));
    let store = Arc::new(SessionStore::new());
    let gateway = AuthGateway::new(provider, store.clone());
    let guard = RouteGuard::default();

    // Unsettled store: defer, never redirect on incomplete information
    assert_eq!(guard.decide("/dashboard", &store.state()), RouteDecision::Allow);

    gateway.refresh_session().await;
    assert!(store.is_authenticated());
    assert_eq!(guard.decide("/dashboard", &store.state()), RouteDecision::Allow);
    assert_eq!(
        guard.decide("/login", &store.state()),
        RouteDecision::Redirect("/dashboard".to_string())
    );

    gateway.logout().await;
    assert_eq!(
        guard.decide("/dashboard", &store.state()),
        RouteDecision::Redirect("/login".to_string())
    );
    assert_eq!(guard.decide("/login", &store.state()), RouteDecision::Allow);
}

#[tokio::test]
async fn store_subscribers_are_notified_on_login_and_logout() {
    let provider = Arc::new(ScriptedProvider::new("Pw123!"));
    let store = Arc::new(SessionStore::new());
    let gateway = AuthGateway::new(provider, store.clone());

    let mut rx = store.subscribe();
    let initial = *rx.borrow_and_update();

    gateway.login("a@b.com", "Pw123!").await.unwrap();
    rx.changed().await.unwrap();
    assert!(*rx.borrow_and_update() > initial);

    gateway.logout().await;
    rx.changed().await.unwrap();
    assert!(!store.is_authenticated());
}
