//! Asset key generation shared by every backend.
//!
//! A key is `<random-id><ext>` where the id is 32 bytes from the operating
//! system's entropy source, base64url encoded without padding, and the extension
//! comes from the media subtype (`image/png` becomes `.png`).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::TryRngCore;

/// Random bytes per asset id (256 bits).
pub const ASSET_ID_BYTES: usize = 32;

const FALLBACK_EXT: &str = ".bin";

/// Map a `type/subtype` media type to a file extension.
///
/// Anything that does not split into exactly two `/`-separated parts maps to `.bin`.
pub fn media_type_to_ext(media_type: &str) -> String {
    let parts: Vec<&str> = media_type.split('/').collect();
    if parts.len() != 2 {
        return FALLBACK_EXT.to_string();
    }
    format!(".{}", parts[1])
}

/// Generate a fresh asset path for the given media type.
///
/// # Panics
///
/// Panics if the operating system entropy source fails. That is an environment
/// fault, not something a single request can recover from.
pub fn generate_asset_path(media_type: &str) -> String {
    let mut buf = [0u8; ASSET_ID_BYTES];
    let mut rng = OsRng;
    if let Err(e) = rng.try_fill_bytes(&mut buf) {
        panic!("failed to read from OS entropy source: {}", e);
    }
    let id = URL_SAFE_NO_PAD.encode(buf);
    format!("{}{}", id, media_type_to_ext(media_type))
}

/// Join an orientation prefix and an asset path: `landscape/<asset_path>`.
pub fn prefixed_key(prefix: &str, asset_path: &str) -> String {
    format!("{}/{}", prefix.trim_end_matches('/'), asset_path)
}
