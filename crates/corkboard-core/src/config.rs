use std::path::{Path, PathBuf};

use crate::constants::BLOB_SERVER;

#[derive(Debug, Clone)]
pub struct CoreConfig {
    pub data_dir: PathBuf,
    pub blob_server: String,
}

impl CoreConfig {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            blob_server: BLOB_SERVER.to_string(),
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        let data_dir = dirs::data_dir()
            .map(|d| d.join("corkboard"))
            .unwrap_or_else(|| PathBuf::from("corkboard_data"));
        Self::new(data_dir)
    }
}
