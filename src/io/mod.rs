//! Forest persistence.
//!
//! Forests are stored either as pretty-printed JSON, which mirrors the
//! [`TreeNode`](crate::tree::TreeNode) record field for field, or as bincode
//! over a packed preorder node table. The format is chosen from the file
//! extension. Every loaded forest is validated before it is returned.

mod packed;

use crate::core::error::{ForestError, Result};
use crate::tree::Forest;
use packed::PackedForest;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// On-disk encoding of a forest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SerializationFormat {
    /// Human-readable JSON
    Json,
    /// Compact bincode
    Bincode,
}

impl SerializationFormat {
    /// Picks the format from a path's extension (`json`, `bin` or `bincode`).
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(SerializationFormat::Json),
            Some("bin") | Some("bincode") => Ok(SerializationFormat::Bincode),
            _ => Err(ForestError::serialization(format!(
                "Unsupported forest file extension: {}",
                path.display()
            ))),
        }
    }
}

/// Serialises a forest as pretty-printed JSON.
pub fn forest_to_json(forest: &Forest) -> Result<String> {
    Ok(serde_json::to_string_pretty(forest)?)
}

/// Parses and validates a JSON forest.
pub fn forest_from_json(json: &str) -> Result<Forest> {
    let forest: Forest = serde_json::from_str(json)?;
    forest.validate()?;
    Ok(forest)
}

/// Encodes a forest with bincode.
pub fn forest_to_bytes(forest: &Forest) -> Result<Vec<u8>> {
    Ok(bincode::serialize(&PackedForest::pack(forest)?)?)
}

/// Decodes a bincode forest.
pub fn forest_from_bytes(bytes: &[u8]) -> Result<Forest> {
    let packed: PackedForest = bincode::deserialize(bytes)?;
    if packed.version != crate::core::constants::DECISION_FOREST_VERSION {
        log::warn!(
            "Forest was written by version {}, reading with {}",
            packed.version,
            crate::core::constants::DECISION_FOREST_VERSION
        );
    }
    let forest = packed.unpack()?;
    forest.validate()?;
    Ok(forest)
}

/// Writes `forest` to `path` in the format named by its extension.
pub fn save_forest<P: AsRef<Path>>(forest: &Forest, path: P) -> Result<()> {
    let path = path.as_ref();
    let format = SerializationFormat::from_path(path)?;
    let mut writer = BufWriter::new(File::create(path)?);
    match format {
        SerializationFormat::Json => {
            serde_json::to_writer_pretty(&mut writer, forest)?;
            writer.write_all(b"\n")?;
        }
        SerializationFormat::Bincode => {
            bincode::serialize_into(&mut writer, &PackedForest::pack(forest)?)?;
        }
    }
    writer.flush()?;
    log::info!("Saved forest of {} trees to {}", forest.len(), path.display());
    Ok(())
}

/// Reads a forest from `path`, choosing the format from its extension.
pub fn load_forest<P: AsRef<Path>>(path: P) -> Result<Forest> {
    let path = path.as_ref();
    let reader = BufReader::new(File::open(path)?);
    let forest = match SerializationFormat::from_path(path)? {
        SerializationFormat::Json => {
            let forest: Forest = serde_json::from_reader(reader)?;
            forest.validate()?;
            forest
        }
        SerializationFormat::Bincode => {
            let packed: PackedForest = bincode::deserialize_from(reader)?;
            let forest = packed.unpack()?;
            forest.validate()?;
            forest
        }
    };
    log::info!("Loaded forest of {} trees from {}", forest.len(), path.display());
    Ok(forest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tree::{Rescaling, TreeNode};
    use tempfile::tempdir;

    fn forest() -> Forest {
        Forest::new(
            vec![
                TreeNode::leaf(0.25),
                TreeNode::branch(1, 2.5, TreeNode::leaf(-1.0), TreeNode::leaf(1.0), None),
            ],
            Rescaling::LogOdds,
        )
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(SerializationFormat::from_path("a/b.json").unwrap(), SerializationFormat::Json);
        assert_eq!(SerializationFormat::from_path("m.bin").unwrap(), SerializationFormat::Bincode);
        assert!(SerializationFormat::from_path("m.txt").is_err());
        assert!(SerializationFormat::from_path("model").is_err());
    }

    #[test]
    fn test_json_omits_absent_fields() {
        let leaf = Forest::new(vec![TreeNode::leaf(1.0)], Rescaling::None);
        let json = forest_to_json(&leaf).unwrap();
        assert!(json.contains("leaf_value"));
        assert!(!json.contains("split_value"));
        assert!(json.contains("\"none\""));
    }

    #[test]
    fn test_files_in_both_formats() {
        let dir = tempdir().unwrap();
        for name in ["forest.json", "forest.bin"] {
            let path = dir.path().join(name);
            save_forest(&forest(), &path).unwrap();
            assert_eq!(load_forest(&path).unwrap(), forest());
        }
    }

    #[test]
    fn test_malformed_json_tree_is_rejected() {
        let json = concat!(
            r#"{"trees":[{"feature":0,"split_value":1.0,"left":{"leaf_value":1.0}}],"#,
            r#""rescaling":"none"}"#
        );
        let err = forest_from_json(json).unwrap_err();
        assert!(matches!(err, ForestError::Validation { .. }));
    }

    #[test]
    fn test_garbage_bytes_are_rejected() {
        assert!(forest_from_bytes(&[1, 2, 3]).is_err());
        let bytes = forest_to_bytes(&forest()).unwrap();
        assert_eq!(forest_from_bytes(&bytes).unwrap(), forest());
    }
}
