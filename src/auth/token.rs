use rand::{rngs::OsRng, RngCore};

/// Bytes of entropy in an access token (256 bits).
pub const TOKEN_BYTES: usize = 32;

/// Issues an opaque bearer token: 32 bytes from the OS CSPRNG, hex encoded.
pub fn issue() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    hex::encode(buf)
}
