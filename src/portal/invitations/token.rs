//! Invitation link credentials: 256 bits from the OS RNG, encoded as
//! URL-safe base64 without padding. No sequential or time-derived component.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use rand::rngs::OsRng;
use rand::RngCore;

pub const TOKEN_BYTES: usize = 32;

/// Length of the encoded token: ceil(32 * 4 / 3) with padding stripped.
pub const TOKEN_CHARS: usize = 43;

pub fn generate() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
