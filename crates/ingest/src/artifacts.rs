use std::path::{Path, PathBuf};

/// File locations of the artifacts built for one catalog version.
#[derive(Debug, Clone)]
pub struct ArtifactPaths {
    pub db_path: PathBuf,
    pub index_path: PathBuf,
    pub graph_path: PathBuf,
    pub manifest_path: PathBuf,
}

impl ArtifactPaths {
    pub fn new(output_dir: impl AsRef<Path>, catalog_version: &str) -> Self {
        let dir = output_dir.as_ref();
        Self {
            db_path: dir.join(format!("catalog_v{catalog_version}.db")),
            index_path: dir.join(format!("catalog_v{catalog_version}_index.json")),
            graph_path: dir.join(format!("catalog_v{catalog_version}_graph.json")),
            manifest_path: dir.join(format!("catalog_v{catalog_version}_manifest.json")),
        }
    }
}
