//! HTTP implementation of the identity-provider boundary.
//!
//! Speaks the provider's REST surface: a password-grant token endpoint,
//! signup, authenticated user update, session retrieval and logout,
//! plus one read of the console identity document (profile,
//! organization, role assignments) after a successful token exchange.
//! Status codes and error bodies are folded into [`ProviderError`] here
//! so nothing provider-specific escapes this module.

use parking_lot::RwLock;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use url::Url;

use crate::config::ProviderSettings;
use crate::identity::models::{Organization, UserProfile, UserRoleAssignment};
use crate::identity::provider::{
    IdentityProvider, ProviderError, ProviderSession, ProviderUser, SignupMetadata,
};

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    user: ProviderUser,
}

/// Profile/organization/roles document served next to the auth API.
#[derive(Debug, Deserialize)]
struct IdentityDocument {
    profile: Option<UserProfile>,
    organization: Option<Organization>,
    #[serde(default)]
    roles: Vec<UserRoleAssignment>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(alias = "error_description", alias = "msg", alias = "message")]
    error: Option<String>,
}

/// Identity provider client over HTTP.
pub struct HttpIdentityProvider {
    client: Client,
    base_url: Url,
    api_key: String,
    /// Bearer token from the most recent sign-in, if any
    access_token: RwLock<Option<String>>,
}

impl HttpIdentityProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self, url::ParseError> {
        Ok(Self {
            client: Client::new(),
            base_url: Url::parse(&settings.base_url)?,
            api_key: settings.api_key.clone(),
            access_token: RwLock::new(None),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ProviderError> {
        self.base_url
            .join(path)
            .map_err(|e| ProviderError::Transport(e.to_string()))
    }

    fn with_api_key(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.api_key)
    }

    fn bearer(&self) -> Option<String> {
        self.access_token.read().clone()
    }

    /// Fold a non-success response into the adapter taxonomy.
    async fn rejection(response: Response) -> ProviderError {
        let status = response.status();
        let message = match response.json::<ErrorBody>().await {
            Ok(body) => body.error.unwrap_or_default(),
            Err(_) => String::new(),
        };

        if status == StatusCode::TOO_MANY_REQUESTS {
            return ProviderError::RateLimited;
        }
        if status == StatusCode::BAD_REQUEST || status == StatusCode::UNAUTHORIZED {
            if message.to_ascii_lowercase().contains("not confirmed") {
                return ProviderError::EmailNotConfirmed;
            }
            return ProviderError::InvalidCredentials;
        }

        ProviderError::Rejected {
            status: status.as_u16(),
            message,
        }
    }

    async fn fetch_identity(&self, token: &str) -> Result<IdentityDocument, ProviderError> {
        let url = self.endpoint("rest/v1/console_identity")?;
        let response = self
            .with_api_key(self.client.get(url))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        response
            .json::<IdentityDocument>()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))
    }

    async fn session_from_token(
        &self,
        token: &str,
        user: ProviderUser,
    ) -> Result<ProviderSession, ProviderError> {
        let identity = self.fetch_identity(token).await?;
        Ok(ProviderSession {
            user,
            profile: identity.profile,
            organization: identity.organization,
            roles: identity.roles,
        })
    }
}

#[async_trait::async_trait]
impl IdentityProvider for HttpIdentityProvider {
    async fn sign_in(&self, email: &str, password: &str) -> Result<ProviderSession, ProviderError> {
        let url = self.endpoint("auth/v1/token")?;
        let response = self
            .with_api_key(self.client.post(url))
            .query(&[("grant_type", "password")])
            .json(&serde_json::json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let token = response
            .json::<TokenResponse>()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        *self.access_token.write() = Some(token.access_token.clone());
        self.session_from_token(&token.access_token, token.user).await
    }

    async fn sign_up(
        &self,
        email: &str,
        password: &str,
        metadata: SignupMetadata,
    ) -> Result<(), ProviderError> {
        let url = self.endpoint("auth/v1/signup")?;
        let response = self
            .with_api_key(self.client.post(url))
            .json(&serde_json::json!({
                "email": email,
                "password": password,
                "data": metadata,
            }))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(())
    }

    async fn update_password(&self, new_password: &str) -> Result<(), ProviderError> {
        let Some(token) = self.bearer() else {
            return Err(ProviderError::InvalidCredentials);
        };

        let url = self.endpoint("auth/v1/user")?;
        let response = self
            .with_api_key(self.client.put(url))
            .bearer_auth(&token)
            .json(&serde_json::json!({ "password": new_password }))
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }
        Ok(())
    }

    async fn current_session(&self) -> Result<Option<ProviderSession>, ProviderError> {
        let Some(token) = self.bearer() else {
            return Ok(None);
        };

        let url = self.endpoint("auth/v1/user")?;
        let response = self
            .with_api_key(self.client.get(url))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if response.status() == StatusCode::UNAUTHORIZED {
            // Expired or revoked; a definite "no session" answer
            *self.access_token.write() = None;
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::rejection(response).await);
        }

        let user = response
            .json::<ProviderUser>()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        self.session_from_token(&token, user).await.map(Some)
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let Some(token) = self.access_token.write().take() else {
            return Ok(());
        };

        let url = self.endpoint("auth/v1/logout")?;
        let response = self
            .with_api_key(self.client.post(url))
            .bearer_auth(&token)
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        // An already-dead remote session counts as signed out
        if response.status().is_success() || response.status() == StatusCode::UNAUTHORIZED {
            Ok(())
        } else {
            Err(Self::rejection(response).await)
        }
    }
}
