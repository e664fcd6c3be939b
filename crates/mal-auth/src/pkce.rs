//! PKCE (Proof Key for Code Exchange) verifier and authorization URL
//!
//! Generates the code verifier used during the OAuth authorization flow.
//! MyAnimeList uses the `plain` challenge method: the challenge carried in
//! the authorization URL is the verifier itself, with no digest step. The
//! verifier is held by the auth session and sent again during token
//! exchange so the provider can tie the exchange back to the party that
//! initiated the flow.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngExt;

use crate::session::AuthConfig;

/// Generate a cryptographically random PKCE code verifier.
///
/// Produces a 96-byte random value encoded as URL-safe base64 (no padding),
/// which lands on exactly 128 characters, the upper bound of RFC 7636's
/// required 43-128 range.
pub fn generate_verifier() -> String {
    let mut bytes = [0u8; 96];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Build the full authorization URL for the configured client.
///
/// Always carries `response_type=code`, `client_id`, and the verifier as
/// `code_challenge`. `client_secret` and `redirect_uri` appear only when
/// the configuration supplies them; an unset optional leaves no trace in
/// the query string.
pub fn build_authorization_url(config: &AuthConfig, verifier: &str) -> String {
    let mut url = format!(
        "{}?response_type=code&client_id={}&code_challenge={}",
        config.authorize_endpoint,
        urlencoded(&config.client_id),
        verifier,
    );
    if let Some(secret) = &config.client_secret {
        url.push_str("&client_secret=");
        url.push_str(&urlencoded(secret.expose()));
    }
    if let Some(redirect_uri) = &config.redirect_uri {
        url.push_str("&redirect_uri=");
        url.push_str(&urlencoded(redirect_uri));
    }
    url
}

/// Minimal URL encoding for parameter values.
/// Only encodes characters that would break URL parameter parsing.
fn urlencoded(s: &str) -> String {
    s.replace('%', "%25")
        .replace(' ', "%20")
        .replace('&', "%26")
        .replace(':', "%3A")
        .replace('=', "%3D")
        .replace('?', "%3F")
        .replace('/', "%2F")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::AUTHORIZE_ENDPOINT;

    fn minimal_config() -> AuthConfig {
        AuthConfig::new("test-client-id")
    }

    #[test]
    fn verifier_is_url_safe_base64() {
        let verifier = generate_verifier();
        // 96 bytes → 128 base64url chars exactly (no padding)
        assert_eq!(verifier.len(), 128);
        assert!(
            verifier
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'),
            "verifier must be URL-safe base64 (no padding): {verifier}"
        );
    }

    #[test]
    fn verifier_length_within_rfc_range() {
        let verifier = generate_verifier();
        assert!(
            (43..=128).contains(&verifier.len()),
            "verifier length {} outside 43-128",
            verifier.len()
        );
    }

    #[test]
    fn verifiers_are_unique() {
        let a = generate_verifier();
        let b = generate_verifier();
        assert_ne!(a, b, "two verifiers must not collide");
    }

    #[test]
    fn authorization_url_contains_required_params() {
        let url = build_authorization_url(&minimal_config(), "test-verifier");

        assert!(url.starts_with(AUTHORIZE_ENDPOINT));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("client_id=test-client-id"));
        assert!(url.contains("code_challenge=test-verifier"));
    }

    #[test]
    fn challenge_is_the_raw_verifier() {
        // plain method: the verifier appears verbatim, never hashed
        let verifier = generate_verifier();
        let url = build_authorization_url(&minimal_config(), &verifier);
        assert!(url.contains(&format!("code_challenge={verifier}")));
    }

    #[test]
    fn absent_optionals_leave_no_trace() {
        let url = build_authorization_url(&minimal_config(), "v");
        assert!(!url.contains("client_secret"));
        assert!(!url.contains("redirect_uri"));
    }

    #[test]
    fn client_secret_present_when_supplied() {
        let mut config = minimal_config();
        config.client_secret = Some("s3cret".into());
        let url = build_authorization_url(&config, "v");
        assert!(url.contains("client_secret=s3cret"));
    }

    #[test]
    fn redirect_uri_present_and_encoded_when_supplied() {
        let mut config = minimal_config();
        config.redirect_uri = Some("http://localhost:5000/callback".into());
        let url = build_authorization_url(&config, "v");
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%3A5000%2Fcallback"));
    }
}
