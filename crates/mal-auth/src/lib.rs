//! MyAnimeList OAuth authentication library
//!
//! Implements the Authorization-Code-with-PKCE grant against
//! `myanimelist.net` and file-backed token storage. This crate is a
//! standalone library with no dependency on the API client crate and can
//! be tested and used independently.
//!
//! Credential flow:
//! 1. `AuthSession::new()` generates the PKCE verifier
//! 2. User authorizes via the session's `authorization_url()`
//! 3. The code arrives through `callback::CallbackListener` (or manual
//!    entry when host/port/redirect are not all configured)
//! 4. `token::exchange_code()` trades the code for a token
//! 5. `store::save()` persists the token when storage is enabled

pub mod callback;
pub mod constants;
pub mod error;
pub mod pkce;
pub mod secret;
pub mod session;
pub mod store;
pub mod token;

pub use callback::{CallbackListener, wait_for_code};
pub use constants::*;
pub use error::{Error, Result};
pub use pkce::{build_authorization_url, generate_verifier};
pub use secret::ClientSecret;
pub use session::{AuthConfig, AuthMode, AuthSession};
pub use token::{Token, exchange_code};
