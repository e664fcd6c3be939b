//! MyAnimeList OAuth constants
//!
//! Endpoint defaults for the v1 OAuth2 flow. These identify the provider,
//! not the application; the client ID and optional client secret come from
//! the caller's API configuration on myanimelist.net.

/// Authorization endpoint the user visits to grant consent
pub const AUTHORIZE_ENDPOINT: &str = "https://myanimelist.net/v1/oauth2/authorize";

/// Token endpoint for exchanging an authorization code
pub const TOKEN_ENDPOINT: &str = "https://myanimelist.net/v1/oauth2/token";

/// Default location of the persisted token file
pub const DEFAULT_TOKEN_PATH: &str = "token.json";

/// Default wall-clock budget for the callback wait, in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Body served to the browser once the redirect has been captured
pub const CALLBACK_RESPONSE_BODY: &str = "You can close this window now.";
