use sha2::{Digest, Sha256};

/// Short sha256 prefix used to tag export payloads in logs. Diagnostic
/// only; the coordinator never consults it for dedup decisions.
pub fn content_hash(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    let digest = hasher.finalize();
    let mut hex = String::with_capacity(16);
    for byte in digest.iter().take(8) {
        use std::fmt::Write;
        let _ = write!(&mut hex, "{byte:02x}");
    }
    hex
}
