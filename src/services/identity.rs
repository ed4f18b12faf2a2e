use serde::Deserialize;

/// Maps a bearer credential to a user id. Resolution failure is never an
/// error at this boundary: callers fall back to an anonymous identity.
#[async_trait::async_trait]
pub trait IdentityService: Send + Sync {
    async fn resolve_user(&self, bearer_token: &str) -> Option<String>;
}

#[derive(Deserialize)]
struct UserInfo {
    id: String,
}

/// Identity lookup against the auth backend's user-info endpoint.
pub struct AuthApiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl AuthApiClient {
    pub fn new(base_url: String, api_key: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl IdentityService for AuthApiClient {
    async fn resolve_user(&self, bearer_token: &str) -> Option<String> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", bearer_token))
            .header("apikey", &self.api_key)
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            log::debug!("🔑 Identity lookup rejected: {}", response.status());
            return None;
        }

        let user: UserInfo = response.json().await.ok()?;
        Some(user.id)
    }
}

/// Used when no auth backend is configured: every caller is anonymous.
pub struct AnonymousIdentity;

#[async_trait::async_trait]
impl IdentityService for AnonymousIdentity {
    async fn resolve_user(&self, _bearer_token: &str) -> Option<String> {
        None
    }
}
