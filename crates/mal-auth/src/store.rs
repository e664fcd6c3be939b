//! Token persistence
//!
//! Reads and writes the token file a session persists its credential to.
//! `load` hands back whatever was stored, however old: the record carries
//! only what the provider returned, and no expiry or integrity validation
//! happens here. Writes use atomic temp-file + rename so a crash mid-write
//! never leaves a torn file, and the file is 0600 since it holds a bearer
//! credential.

use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::token::Token;

/// Load a previously persisted token.
///
/// Returns `Ok(None)` when no file exists at `path`. A present file must
/// parse as a token object; its age is not inspected.
pub async fn load(path: &Path) -> Result<Option<Token>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| Error::Io(format!("reading token file: {e}")))?;
    let token: Token = serde_json::from_str(&contents)
        .map_err(|e| Error::TokenParse(format!("parsing token file: {e}")))?;
    debug!(path = %path.display(), "loaded persisted token");
    Ok(Some(token))
}

/// Persist a token to `path`, overwriting any existing record.
///
/// Writes to a temporary file in the same directory, then renames it over
/// the target. File permissions are set to 0600 (owner read/write only).
pub async fn save(path: &Path, token: &Token) -> Result<()> {
    let json = serde_json::to_string_pretty(token)
        .map_err(|e| Error::TokenParse(format!("serializing token: {e}")))?;

    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| std::path::PathBuf::from("."));
    let tmp_path = dir.join(format!(".token.tmp.{}", std::process::id()));

    tokio::fs::write(&tmp_path, json.as_bytes())
        .await
        .map_err(|e| Error::Io(format!("writing temp token file: {e}")))?;

    // Set 0600 permissions (unix only)
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        let perms = std::fs::Permissions::from_mode(0o600);
        tokio::fs::set_permissions(&tmp_path, perms)
            .await
            .map_err(|e| Error::Io(format!("setting token file permissions: {e}")))?;
    }

    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| Error::Io(format!("renaming temp token file: {e}")))?;

    debug!(path = %path.display(), "persisted token");
    Ok(())
}
