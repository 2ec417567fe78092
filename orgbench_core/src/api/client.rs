use async_trait::async_trait;
use log::{debug, info};

use super::errors::ApiError;
use super::types::{AuthSession, QueryOutcome, RestErrorBody, TokenErrorBody, TokenResponse};
use crate::config::AppConfig;

/// The remote query API, reduced to the three calls this tool makes.
///
/// Production: [`HttpQueryApi`] over reqwest.
/// Testing: mock (unit tests) or a scripted fake (integration tests).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QueryApi: Send + Sync {
    /// Username-password authentication. Resolves the instance URL and a
    /// bearer token for subsequent queries.
    async fn login(
        &self,
        login_url: &str,
        username: &str,
        password: &str,
    ) -> Result<AuthSession, ApiError>;

    /// Run one query string against the session's instance.
    async fn query(&self, session: &AuthSession, soql: &str) -> Result<QueryOutcome, ApiError>;

    /// Revoke the session's token. Callers treat failures as advisory.
    async fn logout(&self, session: &AuthSession) -> Result<(), ApiError>;
}

/// HTTP implementation of [`QueryApi`].
pub struct HttpQueryApi {
    http: reqwest::Client,
    client_id: String,
    client_secret: String,
    api_version: String,
}

impl HttpQueryApi {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            api_version: config.api_version.clone(),
        }
    }
}

#[async_trait]
impl QueryApi for HttpQueryApi {
    async fn login(
        &self,
        login_url: &str,
        username: &str,
        password: &str,
    ) -> Result<AuthSession, ApiError> {
        if self.client_id.is_empty() || self.client_secret.is_empty() {
            return Err(ApiError::MissingClientConfig);
        }

        let url = format!("{}/services/oauth2/token", login_url.trim_end_matches('/'));
        info!("authenticating '{}' against {}", username, url);

        let form = [
            ("grant_type", "password"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("username", username),
            ("password", password),
        ];
        let response = self.http.post(&url).form(&form).send().await?;
        let status = response.status();

        if status.is_success() {
            let token: TokenResponse = response.json().await?;
            info!("authenticated; instance is {}", token.instance_url);
            return Ok(AuthSession {
                access_token: token.access_token,
                instance_url: token.instance_url,
            });
        }

        match response.json::<TokenErrorBody>().await {
            Ok(body) => Err(ApiError::Service(body.error_description)),
            Err(_) => Err(ApiError::Http(status.as_u16())),
        }
    }

    async fn query(&self, session: &AuthSession, soql: &str) -> Result<QueryOutcome, ApiError> {
        let url = format!(
            "{}/services/data/{}/query",
            session.instance_url.trim_end_matches('/'),
            self.api_version
        );
        debug!("running query against {}: {}", url, soql);

        let response = self
            .http
            .get(&url)
            .bearer_auth(&session.access_token)
            .query(&[("q", soql)])
            .send()
            .await?;
        let status = response.status();

        if status.is_success() {
            let outcome: QueryOutcome = response.json().await?;
            debug!(
                "query returned {} of {} records",
                outcome.records.len(),
                outcome.total_size
            );
            return Ok(outcome);
        }

        match response.json::<Vec<RestErrorBody>>().await {
            Ok(mut errors) if !errors.is_empty() => {
                Err(ApiError::Service(errors.remove(0).message))
            }
            _ => Err(ApiError::Http(status.as_u16())),
        }
    }

    async fn logout(&self, session: &AuthSession) -> Result<(), ApiError> {
        let url = format!(
            "{}/services/oauth2/revoke",
            session.instance_url.trim_end_matches('/')
        );
        let response = self
            .http
            .post(&url)
            .form(&[("token", session.access_token.as_str())])
            .send()
            .await?;
        if response.status().is_success() {
            Ok(())
        } else {
            Err(ApiError::Http(response.status().as_u16()))
        }
    }
}
