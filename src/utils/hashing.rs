//! Hashing utilities

use std::io::Read;
use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::Result;

/// Chunk size for streaming file hashes (1 MiB).
const CHUNK_SIZE: usize = 1024 * 1024;

/// SHA256 digest of a file's contents as a lowercase hex string.
///
/// Reads the file in bounded chunks so large textures never load whole.
pub fn sha256_file<P: AsRef<Path>>(path: P) -> Result<String> {
    let mut file = std::fs::File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];

    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_digest() {
        let temp = tempfile::TempDir::new().unwrap();
        let path = temp.path().join("hello.txt");
        std::fs::write(&path, b"hello").unwrap();

        // sha256("hello")
        assert_eq!(
            sha256_file(&path).unwrap(),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(sha256_file("/nonexistent/file.bin").is_err());
    }
}
