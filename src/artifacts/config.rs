//! Artifact locations, local and remote

use std::path::{Path, PathBuf};

use super::provision::DEFAULT_DOWNLOAD_URL;

/// Remote identifier of the trained model
pub const MODEL_ID: &str = "1xTiuPkNDS8ypPuSgt5U705FadAL2gypo";
/// Remote identifier of the categorical encoders
pub const ENCODERS_ID: &str = "1RtnA1kOkJ6e4kuBBw_GVMMSeiUmiGhVB";
/// Remote identifier of the feature-name ordering
pub const FEATURES_ID: &str = "1tw-tBEB1mH_KPC68jj6nYnJyn6ivBOBv";

pub const MODEL_FILE: &str = "rf_model.json";
pub const ENCODERS_FILE: &str = "rf_encoders.json";
pub const FEATURES_FILE: &str = "rf_feature_names.json";

/// Local file paths of the three artifacts
#[derive(Debug, Clone, PartialEq)]
pub struct ArtifactPaths {
    pub model: PathBuf,
    pub encoders: PathBuf,
    pub features: PathBuf,
}

impl ArtifactPaths {
    /// Standard file names inside `dir`
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            model: dir.join(MODEL_FILE),
            encoders: dir.join(ENCODERS_FILE),
            features: dir.join(FEATURES_FILE),
        }
    }
}

/// Where artifacts live and where they are fetched from
#[derive(Debug, Clone)]
pub struct ArtifactConfig {
    pub dir: PathBuf,
    pub download_base_url: String,
    pub model_id: String,
    pub encoders_id: String,
    pub features_id: String,
}

impl Default for ArtifactConfig {
    fn default() -> Self {
        Self {
            dir: std::env::var("ARTIFACTS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            download_base_url: std::env::var("DOWNLOAD_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_DOWNLOAD_URL.to_string()),
            model_id: std::env::var("MODEL_ID").unwrap_or_else(|_| MODEL_ID.to_string()),
            encoders_id: std::env::var("ENCODERS_ID").unwrap_or_else(|_| ENCODERS_ID.to_string()),
            features_id: std::env::var("FEATURES_ID").unwrap_or_else(|_| FEATURES_ID.to_string()),
        }
    }
}

impl ArtifactConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the local artifact directory
    pub fn with_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dir = dir.into();
        self
    }

    /// Builder method to set the download endpoint
    pub fn with_download_base_url(mut self, url: impl Into<String>) -> Self {
        self.download_base_url = url.into();
        self
    }

    pub fn paths(&self) -> ArtifactPaths {
        ArtifactPaths::in_dir(&self.dir)
    }

    /// (remote identifier, local path) for each artifact
    pub fn sources(&self) -> [(&str, PathBuf); 3] {
        let paths = self.paths();
        [
            (self.model_id.as_str(), paths.model),
            (self.encoders_id.as_str(), paths.encoders),
            (self.features_id.as_str(), paths.features),
        ]
    }
}
