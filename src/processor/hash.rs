use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Obfuscates an email with HMAC-SHA256 keyed by `secret`
///
/// # Returns
///
/// The lowercase hex digest (64 characters).
pub fn hash_email(email: &str, secret: &str) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts keys of any length");
    mac.update(email.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
