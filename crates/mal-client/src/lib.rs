//! MyAnimeList API client
//!
//! Bootstraps a credential and issues authenticated requests against the
//! v2 REST API. The credential comes from one of two places:
//! - user-login mode: a persisted token if one exists at the configured
//!   path (used as-is, no validity check), otherwise a fresh
//!   [`mal_auth::AuthSession`]; attached as `Authorization: Bearer ...`
//! - no-login mode: the client id itself, attached as `X-MAL-CLIENT-ID`
//!   for the provider's limited public scope.
//!
//! Domain endpoints sit on top of [`Client::request`]; this crate only
//! provides the credentialed transport.

pub mod adapter;
pub mod error;

pub use adapter::{ApiAdapter, AuthHeader};
pub use error::{Error, Result};

use mal_auth::session::{AuthConfig, AuthSession};
use mal_auth::token::Token;
use mal_auth::store;
use reqwest::Method;
use tracing::info;

/// Base URL of the MyAnimeList REST API
pub const API_BASE_URL: &str = "https://api.myanimelist.net";

/// API version path segment
pub const API_VERSION: &str = "v2";

/// Client configuration: the auth settings plus the login-mode switch.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub auth: AuthConfig,
    /// When false, skip the OAuth flow entirely and authenticate requests
    /// with the client-id header (limited scope).
    pub user_login: bool,
}

impl ClientConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            auth: AuthConfig::new(client_id),
            user_login: true,
        }
    }
}

/// Authenticated API client.
pub struct Client {
    api: ApiAdapter,
}

impl Client {
    /// Obtain a credential per the configuration and build the client.
    ///
    /// User-login mode checks the token store first and falls back to a
    /// fresh authorization session; no-login mode performs no token flow
    /// at all.
    pub async fn connect(config: ClientConfig) -> Result<Self> {
        let auth = if config.user_login {
            let token = obtain_token(config.auth).await?;
            AuthHeader::Bearer(token.access_token)
        } else {
            info!("no-login mode, using client-id header");
            AuthHeader::ClientId(config.auth.client_id)
        };
        Ok(Self {
            api: ApiAdapter::new(API_BASE_URL, API_VERSION, auth),
        })
    }

    /// The adapter carrying this client's credential header.
    pub fn api(&self) -> &ApiAdapter {
        &self.api
    }

    /// Issue an API request with the client's credential attached.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        form: Option<&[(&str, String)]>,
    ) -> Result<serde_json::Value> {
        self.api.request(method, endpoint, query, form).await
    }
}

/// Load the persisted token if one exists, else run a fresh auth session.
/// A stored record is trusted as-is; staleness surfaces later as
/// [`Error::TokenExpired`] on an actual request.
async fn obtain_token(auth: AuthConfig) -> mal_auth::Result<Token> {
    if let Some(token) = store::load(&auth.token_path).await? {
        info!(path = %auth.token_path.display(), "using persisted token");
        return Ok(token);
    }
    AuthSession::new(auth).auth().await
}
