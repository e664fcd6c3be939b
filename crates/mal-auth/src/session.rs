//! Authorization session orchestrator
//!
//! One `AuthSession` drives one authorization attempt end to end: generate
//! the proof key, show the authorization URL, obtain the redirected code
//! (via the local callback listener, or manual entry when the listener
//! configuration is incomplete), exchange it for a token, and persist the
//! result when storage is enabled. The session owns its verifier and all
//! listener state for its whole lifetime; nothing is shared across
//! concurrent sessions.

use std::path::PathBuf;
use std::time::Duration;

use tracing::info;

use crate::callback::{CallbackListener, wait_for_code};
use crate::constants::{
    AUTHORIZE_ENDPOINT, DEFAULT_TIMEOUT_SECS, DEFAULT_TOKEN_PATH, TOKEN_ENDPOINT,
};
use crate::error::{Error, Result};
use crate::secret::ClientSecret;
use crate::token::Token;
use crate::{pkce, store, token};

/// Configuration for one authorization attempt.
///
/// `host`, `port`, and `redirect_uri` select the listener flow: all three
/// must be present, any missing one falls back to manual code entry. The
/// endpoint fields default to the live MyAnimeList URLs and exist so tests
/// can point a session at a local stub.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub client_id: String,
    pub client_secret: Option<ClientSecret>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub redirect_uri: Option<String>,
    /// Persist the obtained token to `token_path`
    pub store_token: bool,
    pub token_path: PathBuf,
    /// Wall-clock budget for the callback wait
    pub timeout_secs: u64,
    pub authorize_endpoint: String,
    pub token_endpoint: String,
}

impl AuthConfig {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: None,
            host: None,
            port: None,
            redirect_uri: None,
            store_token: true,
            token_path: PathBuf::from(DEFAULT_TOKEN_PATH),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            authorize_endpoint: AUTHORIZE_ENDPOINT.to_owned(),
            token_endpoint: TOKEN_ENDPOINT.to_owned(),
        }
    }

    /// Select the flow for this configuration. Total; never errors.
    pub fn mode(&self) -> AuthMode<'_> {
        match (self.host.as_deref(), self.port, self.redirect_uri.as_deref()) {
            (Some(host), Some(port), Some(redirect_uri)) => AuthMode::Listener {
                host,
                port,
                redirect_uri,
            },
            _ => AuthMode::Manual,
        }
    }
}

/// How the authorization code will be obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMode<'a> {
    /// Print the URL and read the code from stdin
    Manual,
    /// Capture the code via a local HTTP listener
    Listener {
        host: &'a str,
        port: u16,
        redirect_uri: &'a str,
    },
}

/// A single authorization attempt.
///
/// The verifier is generated at construction and lives exactly as long as
/// the session; `auth` consumes the session so one proof key never serves
/// two attempts.
pub struct AuthSession {
    config: AuthConfig,
    verifier: String,
    http: reqwest::Client,
}

impl AuthSession {
    pub fn new(config: AuthConfig) -> Self {
        Self {
            config,
            verifier: pkce::generate_verifier(),
            http: reqwest::Client::new(),
        }
    }

    /// The proof key for this attempt: the same value sent as the
    /// challenge and later presented to the token endpoint.
    pub fn verifier(&self) -> &str {
        &self.verifier
    }

    /// The authorization URL the user must visit for this attempt.
    pub fn authorization_url(&self) -> String {
        pkce::build_authorization_url(&self.config, &self.verifier)
    }

    /// Run the attempt to completion and return the obtained token.
    ///
    /// On success the token is persisted iff `store_token` is set. All
    /// failures surface to the caller; nothing is retried.
    pub async fn auth(self) -> Result<Token> {
        let token = match self.config.mode() {
            AuthMode::Listener {
                host,
                port,
                redirect_uri,
            } => {
                let route = callback_route(redirect_uri);
                let listener = CallbackListener::bind(host, port, &route).await?;
                println!("Please visit {}", self.authorization_url());
                info!(
                    addr = %listener.local_addr(),
                    route,
                    timeout_secs = self.config.timeout_secs,
                    "waiting for authorization redirect"
                );

                let budget = Duration::from_secs(self.config.timeout_secs);
                let code = match wait_for_code(listener, budget).await {
                    Ok(code) => code,
                    Err(err @ Error::Timeout { .. }) => {
                        println!("Timed out waiting for the authorization code.");
                        return Err(err);
                    }
                    Err(err) => return Err(err),
                };
                token::exchange_code(&self.http, &self.config, &code, &self.verifier).await?
            }
            AuthMode::Manual => {
                println!("Please visit {}", self.authorization_url());
                let code = read_code_from_stdin().await?;
                let token =
                    token::exchange_code(&self.http, &self.config, &code, &self.verifier).await?;
                println!("Token generated successfully!");
                token
            }
        };

        if self.config.store_token {
            store::save(&self.config.token_path, &token).await?;
        }
        Ok(token)
    }
}

/// Route served by the callback listener: the final path segment of the
/// redirect URI, so `http://localhost:5000/callback` serves `/callback`.
fn callback_route(redirect_uri: &str) -> String {
    let segment = redirect_uri.rsplit('/').next().unwrap_or("");
    format!("/{segment}")
}

async fn read_code_from_stdin() -> Result<String> {
    use std::io::Write;
    use tokio::io::{AsyncBufReadExt, BufReader};

    print!("Please enter the code (callback?code=): ");
    std::io::stdout()
        .flush()
        .map_err(|e| Error::Io(format!("flushing prompt: {e}")))?;

    let mut line = String::new();
    BufReader::new(tokio::io::stdin())
        .read_line(&mut line)
        .await
        .map_err(|e| Error::Io(format!("reading authorization code: {e}")))?;
    Ok(line.trim().to_owned())
}
