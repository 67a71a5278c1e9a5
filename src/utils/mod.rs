//! Utility functions

use crate::error::{Result, SalesError};
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and deserialize a JSON artifact, naming the file in any error
pub fn read_json<T: DeserializeOwned>(path: impl AsRef<Path>) -> Result<T> {
    let path = path.as_ref();
    let artifact_error = |reason: String| SalesError::Artifact {
        path: path.to_path_buf(),
        reason,
    };

    let json = std::fs::read_to_string(path).map_err(|e| artifact_error(e.to_string()))?;
    serde_json::from_str(&json).map_err(|e| artifact_error(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_json_ok() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.json");
        std::fs::write(&path, r#"["a", "b"]"#).unwrap();

        let names: Vec<String> = read_json(&path).unwrap();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_read_json_missing_file_names_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");

        let err = read_json::<Vec<String>>(&path).unwrap_err();
        assert!(err.to_string().contains("absent.json"));
    }
}
