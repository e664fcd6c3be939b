//! OAuth token exchange
//!
//! Completes the authorization-code flow: one POST to the token endpoint
//! with the code and the PKCE verifier, returning the provider's token
//! object verbatim. `expires_in` stays the seconds delta the provider
//! reported; nothing downstream derives or checks an absolute expiry.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::session::AuthConfig;

/// Token object as returned by the token endpoint.
///
/// `refresh_token` is optional so that a persisted record carrying only
/// the fields the provider happened to return still round-trips.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub access_token: String,
    pub token_type: String,
    /// Seconds until the access token expires (delta, not absolute)
    pub expires_in: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Exchange an authorization code for a token.
///
/// Sends `grant_type=authorization_code` with the code and the verifier
/// that produced this attempt's challenge. `client_secret` and
/// `redirect_uri` are included only when the configuration supplies them.
/// A non-success status surfaces as [`Error::Exchange`] carrying the
/// provider's status code and body; no retry is attempted.
pub async fn exchange_code(
    client: &reqwest::Client,
    config: &AuthConfig,
    code: &str,
    verifier: &str,
) -> Result<Token> {
    let mut form: Vec<(&str, &str)> = vec![
        ("client_id", config.client_id.as_str()),
        ("code", code),
        ("code_verifier", verifier),
        ("grant_type", "authorization_code"),
    ];
    if let Some(secret) = &config.client_secret {
        form.push(("client_secret", secret.expose()));
    }
    if let Some(redirect_uri) = &config.redirect_uri {
        form.push(("redirect_uri", redirect_uri.as_str()));
    }

    let response = client
        .post(&config.token_endpoint)
        .form(&form)
        .send()
        .await
        .map_err(|e| Error::Http(format!("token exchange request failed: {e}")))?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| String::from("<no body>"));
        return Err(Error::Exchange {
            status: status.as_u16(),
            body,
        });
    }

    response
        .json::<Token>()
        .await
        .map_err(|e| Error::TokenParse(format!("invalid token response: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    type CapturedForm = Arc<Mutex<Option<HashMap<String, String>>>>;

    /// Spin up a local token endpoint that records the submitted form and
    /// answers with the given status and JSON body.
    async fn stub_token_endpoint(status: u16, body: serde_json::Value) -> (String, CapturedForm) {
        let captured: CapturedForm = Arc::new(Mutex::new(None));
        let app = Router::new().route(
            "/v1/oauth2/token",
            post({
                let captured = Arc::clone(&captured);
                move |axum::Form(form): axum::Form<HashMap<String, String>>| {
                    let captured = Arc::clone(&captured);
                    let body = body.clone();
                    async move {
                        *captured.lock().await = Some(form);
                        (
                            axum::http::StatusCode::from_u16(status).unwrap(),
                            Json(body),
                        )
                    }
                }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        (format!("http://{addr}/v1/oauth2/token"), captured)
    }

    fn config_for(endpoint: String) -> AuthConfig {
        let mut config = AuthConfig::new("cid");
        config.token_endpoint = endpoint;
        config
    }

    #[test]
    fn token_deserializes_without_refresh_token() {
        let json = r#"{"access_token":"T1","token_type":"Bearer","expires_in":3600}"#;
        let token: Token = serde_json::from_str(json).unwrap();
        assert_eq!(token.access_token, "T1");
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);
        assert_eq!(token.refresh_token, None);
    }

    #[test]
    fn token_serde_roundtrip() {
        let token = Token {
            access_token: "at".into(),
            token_type: "Bearer".into(),
            expires_in: 2678400,
            refresh_token: Some("rt".into()),
        };
        let json = serde_json::to_string(&token).unwrap();
        let back: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(back, token);
    }

    #[test]
    fn absent_refresh_token_is_not_serialized() {
        let token = Token {
            access_token: "at".into(),
            token_type: "Bearer".into(),
            expires_in: 3600,
            refresh_token: None,
        };
        let json = serde_json::to_string(&token).unwrap();
        assert!(!json.contains("refresh_token"), "got: {json}");
    }

    #[tokio::test]
    async fn exchange_parses_success_response() {
        let (endpoint, captured) = stub_token_endpoint(
            200,
            serde_json::json!({
                "access_token": "T1",
                "token_type": "Bearer",
                "expires_in": 3600,
                "refresh_token": "R1",
            }),
        )
        .await;

        let client = reqwest::Client::new();
        let token = exchange_code(&client, &config_for(endpoint), "abc123", "verifier-v")
            .await
            .unwrap();
        assert_eq!(token.access_token, "T1");
        assert_eq!(token.refresh_token.as_deref(), Some("R1"));

        let form = captured.lock().await.clone().unwrap();
        assert_eq!(form.get("grant_type").unwrap(), "authorization_code");
        assert_eq!(form.get("client_id").unwrap(), "cid");
        assert_eq!(form.get("code").unwrap(), "abc123");
        assert_eq!(form.get("code_verifier").unwrap(), "verifier-v");
        assert!(!form.contains_key("client_secret"));
        assert!(!form.contains_key("redirect_uri"));
    }

    #[tokio::test]
    async fn exchange_sends_optionals_when_configured() {
        let (endpoint, captured) = stub_token_endpoint(
            200,
            serde_json::json!({
                "access_token": "T1",
                "token_type": "Bearer",
                "expires_in": 3600,
            }),
        )
        .await;

        let mut config = config_for(endpoint);
        config.client_secret = Some("s3cret".into());
        config.redirect_uri = Some("http://localhost:5000/callback".into());

        let client = reqwest::Client::new();
        exchange_code(&client, &config, "code", "verifier").await.unwrap();

        let form = captured.lock().await.clone().unwrap();
        assert_eq!(form.get("client_secret").unwrap(), "s3cret");
        assert_eq!(
            form.get("redirect_uri").unwrap(),
            "http://localhost:5000/callback"
        );
    }

    #[tokio::test]
    async fn exchange_error_carries_status_and_body() {
        let (endpoint, _) =
            stub_token_endpoint(401, serde_json::json!({"error": "invalid_grant"})).await;

        let client = reqwest::Client::new();
        let err = exchange_code(&client, &config_for(endpoint), "bad", "verifier")
            .await
            .unwrap_err();
        match err {
            Error::Exchange { status, body } => {
                assert_eq!(status, 401);
                assert!(body.contains("invalid_grant"), "got: {body}");
            }
            other => panic!("expected Exchange error, got: {other:?}"),
        }
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_parse_error() {
        let (endpoint, _) = stub_token_endpoint(200, serde_json::json!({"nope": true})).await;

        let client = reqwest::Client::new();
        let err = exchange_code(&client, &config_for(endpoint), "code", "verifier")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::TokenParse(_)), "got: {err:?}");
    }
}
