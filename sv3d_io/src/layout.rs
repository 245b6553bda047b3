//! Dataset directory layout.
//!
//! ```text
//! data_dir/
//!   <object id>/
//!     view.png          RGB view of the object
//!     voxel.npy         [D, D, D] occupancy
//!     point_cloud.npy   [N, 3] surface samples
//! ```

use std::path::{Path, PathBuf};

use crate::error::{Result, Sv3dIoError};

/// Rendered view of an object.
pub const VIEW_FILE: &str = "view.png";

/// Ground-truth occupancy grid.
pub const VOXEL_FILE: &str = "voxel.npy";

/// Ground-truth point cloud.
pub const POINT_FILE: &str = "point_cloud.npy";

/// One object directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectEntry {
    /// Directory name, used as the sample identifier.
    pub id: String,
    /// Full path of the object directory.
    pub dir: PathBuf,
}

impl ObjectEntry {
    /// Path of a file inside this object's directory.
    pub fn file(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }
}

/// Result of scanning a dataset root.
#[derive(Debug, Clone, Default)]
pub struct DatasetIndex {
    /// Complete objects in sorted id order.
    pub entries: Vec<ObjectEntry>,
    /// Directories lacking at least one required file.
    pub skipped: Vec<PathBuf>,
}

/// Index every object directory under `data_dir` that holds all `required` files.
///
/// Plain files at the top level are ignored.
pub fn index_objects<P: AsRef<Path>>(data_dir: P, required: &[&str]) -> Result<DatasetIndex> {
    let data_dir = data_dir.as_ref();
    if !data_dir.is_dir() {
        return Err(Sv3dIoError::MissingFile {
            path: data_dir.to_path_buf(),
        });
    }

    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(data_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();

    let mut index = DatasetIndex::default();
    for dir in dirs {
        let complete = required.iter().all(|name| dir.join(name).is_file());
        let id = dir.file_name().map(|n| n.to_string_lossy().into_owned());
        match (complete, id) {
            (true, Some(id)) => index.entries.push(ObjectEntry { id, dir }),
            _ => index.skipped.push(dir),
        }
    }
    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_index_is_sorted_and_skips_incomplete() {
        let root = tempfile::tempdir().unwrap();
        for id in ["b", "a", "c"] {
            let dir = root.path().join(id);
            fs::create_dir(&dir).unwrap();
            fs::write(dir.join(VIEW_FILE), b"").unwrap();
            if id != "c" {
                fs::write(dir.join(VOXEL_FILE), b"").unwrap();
            }
        }
        fs::write(root.path().join("README"), b"not an object").unwrap();

        let index = index_objects(root.path(), &[VIEW_FILE, VOXEL_FILE]).unwrap();
        let ids: Vec<_> = index.entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(index.skipped, vec![root.path().join("c")]);
        assert_eq!(index.entries[0].file(VIEW_FILE), root.path().join("a").join(VIEW_FILE));
    }

    #[test]
    fn test_missing_root() {
        let err = index_objects("/nonexistent/sv3d", &[VIEW_FILE]).unwrap_err();
        assert!(matches!(err, Sv3dIoError::MissingFile { .. }));
    }
}
