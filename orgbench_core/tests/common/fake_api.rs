//! A deterministic **in-process stand-in** for the remote query API.
//!
//! *  **From the test's perspective**
//!    * Seed the responses up front with one of the constructors.
//!    * Inspect everything the workbench asked for via `login_calls`,
//!      `logout_calls` and `queries`.
//!
//! *  **Why this exists**: it lets integration tests exercise the *real*
//!    panel machinery (tasks, channels, broadcasts) without a remote
//!    service on the other end.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use orgbench_core::api::{ApiError, AuthSession, QueryApi, QueryOutcome, Record};

pub struct FakeQueryApi {
    instance_url: String,
    login_error: Option<String>,
    query_result: Result<QueryOutcome, String>,

    /// Every login attempt, kept for assertions.
    pub login_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    /// Every query string the workbench sent.
    pub queries: Mutex<Vec<String>>,
}

impl FakeQueryApi {
    /// Logins succeed against `instance_url`; queries return `records`.
    pub fn succeeding(instance_url: &str, records: Vec<Record>) -> Self {
        let total = records.len() as u64;
        Self {
            instance_url: instance_url.to_string(),
            login_error: None,
            query_result: Ok(QueryOutcome {
                total_size: total,
                done: true,
                records,
            }),
            login_calls: AtomicUsize::new(0),
            logout_calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Logins fail with the service saying `message`.
    pub fn rejecting_login(message: &str) -> Self {
        let mut fake = Self::succeeding("https://unused.example.com", Vec::new());
        fake.login_error = Some(message.to_string());
        fake
    }

    /// Logins succeed; queries fail with the service saying `message`.
    pub fn rejecting_query(instance_url: &str, message: &str) -> Self {
        let mut fake = Self::succeeding(instance_url, Vec::new());
        fake.query_result = Err(message.to_string());
        fake
    }
}

#[async_trait]
impl QueryApi for FakeQueryApi {
    async fn login(
        &self,
        _login_url: &str,
        _username: &str,
        _password: &str,
    ) -> Result<AuthSession, ApiError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        match &self.login_error {
            Some(message) => Err(ApiError::Service(message.clone())),
            None => Ok(AuthSession {
                access_token: "fake-token".into(),
                instance_url: self.instance_url.clone(),
            }),
        }
    }

    async fn query(&self, _session: &AuthSession, soql: &str) -> Result<QueryOutcome, ApiError> {
        self.queries
            .lock()
            .expect("query log poisoned")
            .push(soql.to_string());
        match &self.query_result {
            Ok(outcome) => Ok(outcome.clone()),
            Err(message) => Err(ApiError::Service(message.clone())),
        }
    }

    async fn logout(&self, _session: &AuthSession) -> Result<(), ApiError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
