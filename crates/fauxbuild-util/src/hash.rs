use sha2::{Digest, Sha256};
use std::path::Path;

/// SHA-256 of a file's contents as a lowercase hex string.
///
/// The file is streamed through the hasher, so snapshot files of any size
/// can be fingerprinted without loading them whole.
pub fn sha256_file(path: &Path) -> std::io::Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    std::io::copy(&mut file, &mut hasher)?;
    Ok(hex(&hasher.finalize()))
}

/// SHA-256 of an in-memory buffer as a lowercase hex string.
pub fn sha256_bytes(data: &[u8]) -> String {
    hex(&Sha256::digest(data))
}

fn hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
