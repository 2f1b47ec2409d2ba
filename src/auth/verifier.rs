use std::{sync::Arc, time::Duration};

use reqwest::{Client, StatusCode};
use serde::Deserialize;
use thiserror::Error;
use uuid::Uuid;

/// How long to wait on the identity provider before failing the request.
const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);

/// Runtime configuration describing the identity provider endpoint.
#[derive(Debug, Clone)]
pub struct IdentityConfig {
    /// Base URL of the identity provider.
    pub base_url: String,
    /// Project API key the provider requires alongside user credentials.
    pub api_key: String,
}

impl IdentityConfig {
    /// Construct a configuration from an explicit base URL and API key.
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> Result<Self, AuthError> {
        let base_url = std::env::var("IDENTITY_BASE_URL").map_err(|_| AuthError::MissingEnvVar {
            var: "IDENTITY_BASE_URL",
        })?;
        let api_key = std::env::var("IDENTITY_API_KEY").map_err(|_| AuthError::MissingEnvVar {
            var: "IDENTITY_API_KEY",
        })?;
        Ok(Self::new(base_url, api_key))
    }
}

/// Failures raised while resolving a bearer credential.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Required environment variable is missing.
    #[error("missing identity environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the variable that was not set.
        var: &'static str,
    },
    /// Building the HTTP client failed (invalid TLS setup, etc).
    #[error("failed to build identity client")]
    ClientBuilder {
        #[source]
        source: reqwest::Error,
    },
    /// The provider could not be reached.
    #[error("failed to reach the identity provider")]
    RequestSend {
        #[source]
        source: reqwest::Error,
    },
    /// The provider rejected the credential.
    #[error("identity provider rejected the credential ({status})")]
    Rejected {
        /// Status code the provider answered with.
        status: StatusCode,
    },
    /// The provider's response payload could not be parsed.
    #[error("failed to decode the identity response")]
    Decode {
        #[source]
        source: reqwest::Error,
    },
    /// The provider's response carries no usable subject.
    #[error("identity response carries no usable subject")]
    InvalidSubject,
}

/// Client resolving bearer credentials to stable user identifiers by asking
/// the identity provider directly.
#[derive(Clone)]
pub struct IdentityVerifier {
    client: Client,
    base_url: Arc<str>,
    api_key: Arc<str>,
}

#[derive(Debug, Deserialize)]
struct IdentityUser {
    id: String,
}

impl IdentityVerifier {
    /// Build the verifier and its HTTP client from configuration.
    pub fn new(config: IdentityConfig) -> Result<Self, AuthError> {
        let client = Client::builder()
            .timeout(VERIFY_TIMEOUT)
            .build()
            .map_err(|source| AuthError::ClientBuilder { source })?;

        Ok(Self {
            client,
            base_url: Arc::from(config.base_url.trim_end_matches('/')),
            api_key: Arc::from(config.api_key.as_str()),
        })
    }

    /// Ask the identity provider which user the bearer token belongs to.
    pub async fn resolve_owner(&self, token: &str) -> Result<Uuid, AuthError> {
        let url = format!("{}/auth/v1/user", self.base_url);
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .header("apikey", self.api_key.as_ref())
            .send()
            .await
            .map_err(|source| AuthError::RequestSend { source })?;

        if response.status() != StatusCode::OK {
            return Err(AuthError::Rejected {
                status: response.status(),
            });
        }

        let user: IdentityUser = response
            .json()
            .await
            .map_err(|source| AuthError::Decode { source })?;

        Uuid::parse_str(&user.id).map_err(|_| AuthError::InvalidSubject)
    }
}
