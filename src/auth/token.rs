// Session token generation

use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};

use crate::auth::error::AuthError;

/// Raw entropy per token: 32 bytes = 256 bits
pub const SESSION_TOKEN_BYTES: usize = 32;

/// Produce a URL-safe session token from the OS CSPRNG.
///
/// The unguessability of every session rests on this function. It must stay
/// backed by a cryptographically secure source.
pub fn generate_session_token() -> Result<String, AuthError> {
    let mut bytes = [0u8; SESSION_TOKEN_BYTES];
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|e| AuthError::TokenGeneration(e.to_string()))?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}
