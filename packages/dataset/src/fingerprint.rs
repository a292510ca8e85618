//! Content fingerprinting of the dataset input files.
//!
//! The session layer caches pipeline outputs keyed by what actually went
//! in: the bytes of the input files plus the parameter tuple. Hashing the
//! file contents (rather than paths or modification times) means a cache
//! entry survives a restart and dies the moment an input is regenerated.

use std::fs;

use sha2::{Digest, Sha256};

use crate::{DatasetError, DatasetPaths};

/// Computes a hex-encoded SHA-256 digest over the dataset input files.
///
/// Each file's length is hashed before its bytes so concatenation
/// boundaries cannot collide.
///
/// # Errors
///
/// Returns [`DatasetError::FileNotFound`] if any configured input is
/// missing, or an I/O error if one cannot be read.
pub fn snapshot_fingerprint(paths: &DatasetPaths) -> Result<String, DatasetError> {
    let mut hasher = Sha256::new();

    let mut feed = |path: &std::path::Path| -> Result<(), DatasetError> {
        if !path.exists() {
            return Err(DatasetError::FileNotFound(path.to_path_buf()));
        }
        let bytes = fs::read(path)?;
        hasher.update((bytes.len() as u64).to_le_bytes());
        hasher.update(&bytes);
        Ok(())
    };

    feed(&paths.acs)?;
    feed(&paths.food_insecurity)?;
    if let Some(county_seats) = &paths.county_seats {
        feed(county_seats)?;
    }

    Ok(hex::encode(hasher.finalize()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    fn temp_file(name: &str, content: &[u8]) -> PathBuf {
        let path = std::env::temp_dir().join(format!("food_access_fp_{}_{name}", std::process::id()));
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(content).unwrap();
        path
    }

    #[test]
    fn same_contents_same_fingerprint() {
        let paths = DatasetPaths {
            acs: temp_file("a1", b"acs"),
            food_insecurity: temp_file("f1", b"food"),
            county_seats: None,
        };
        assert_eq!(
            snapshot_fingerprint(&paths).unwrap(),
            snapshot_fingerprint(&paths).unwrap()
        );
    }

    #[test]
    fn changed_contents_change_the_fingerprint() {
        let acs = temp_file("a2", b"acs");
        let paths = DatasetPaths {
            acs: acs.clone(),
            food_insecurity: temp_file("f2", b"food"),
            county_seats: None,
        };
        let before = snapshot_fingerprint(&paths).unwrap();
        fs::write(&acs, b"acs v2").unwrap();
        let after = snapshot_fingerprint(&paths).unwrap();
        assert_ne!(before, after);
    }

    #[test]
    fn missing_input_is_file_not_found() {
        let paths = DatasetPaths {
            acs: PathBuf::from("/nonexistent/acs.msgpack"),
            food_insecurity: temp_file("f3", b"food"),
            county_seats: None,
        };
        assert!(matches!(
            snapshot_fingerprint(&paths),
            Err(DatasetError::FileNotFound(_))
        ));
    }
}
