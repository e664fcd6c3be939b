//! REST adapter for the MyAnimeList v2 API
//!
//! Thin request/response marshalling: build the endpoint URL, attach the
//! credential header, hand back the parsed JSON body. Failures are
//! classified per the provider's conventions: a 401 whose
//! `WWW-Authenticate` challenge carries the expiry marker is an expired
//! token, everything else non-success is a generic API error with the
//! status and body preserved. No retries.

use reqwest::Method;
use reqwest::header::WWW_AUTHENTICATE;
use tracing::debug;

use crate::error::{Error, Result};

/// Marker MyAnimeList puts in the `WWW-Authenticate` challenge of a 401
/// when the bearer token has expired.
const EXPIRY_MARKER: &str = "The access token expired";

/// Credential header attached to every API request.
#[derive(Debug, Clone)]
pub enum AuthHeader {
    /// `Authorization: Bearer <access_token>` from the OAuth flow
    Bearer(String),
    /// `X-MAL-CLIENT-ID: <client_id>`, the limited-scope mode without login
    ClientId(String),
}

impl AuthHeader {
    pub fn name(&self) -> &'static str {
        match self {
            AuthHeader::Bearer(_) => "Authorization",
            AuthHeader::ClientId(_) => "X-MAL-CLIENT-ID",
        }
    }

    pub fn value(&self) -> String {
        match self {
            AuthHeader::Bearer(access_token) => format!("Bearer {access_token}"),
            AuthHeader::ClientId(client_id) => client_id.clone(),
        }
    }
}

/// Marshals requests to the versioned API base with a fixed credential.
pub struct ApiAdapter {
    base_url: String,
    version: String,
    auth: AuthHeader,
    http: reqwest::Client,
}

impl ApiAdapter {
    pub fn new(base_url: impl Into<String>, version: impl Into<String>, auth: AuthHeader) -> Self {
        Self {
            base_url: base_url.into(),
            version: version.into(),
            auth,
            http: reqwest::Client::new(),
        }
    }

    /// The credential header this adapter attaches.
    pub fn auth_header(&self) -> &AuthHeader {
        &self.auth
    }

    /// Issue a request against `<base>/<version>/<endpoint>`.
    ///
    /// `query` parameters are appended when non-empty; `form` becomes a
    /// URL-encoded body when supplied.
    pub async fn request(
        &self,
        method: Method,
        endpoint: &str,
        query: &[(&str, String)],
        form: Option<&[(&str, String)]>,
    ) -> Result<serde_json::Value> {
        let url = format!("{}/{}/{}", self.base_url, self.version, endpoint);
        debug!(%method, %url, "api request");

        let mut request = self
            .http
            .request(method, &url)
            .header(self.auth.name(), self.auth.value());
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(form) = form {
            request = request.form(form);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::Http(format!("request to {url} failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| Error::Http(format!("invalid JSON from {url}: {e}")));
        }

        if status.as_u16() == 401 {
            let expired = response
                .headers()
                .get(WWW_AUTHENTICATE)
                .and_then(|value| value.to_str().ok())
                .is_some_and(|challenge| challenge.contains(EXPIRY_MARKER));
            if expired {
                return Err(Error::TokenExpired);
            }
        }

        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        Err(Error::Api {
            status: status.as_u16(),
            body,
        })
    }
}
