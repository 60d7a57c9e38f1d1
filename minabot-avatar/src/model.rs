// File: minabot-avatar/src/model.rs
//! Parsing of the Live2D `*.model3.json` settings file, as far as the widget
//! cares about it: the motion-group table. Rendering data (moc, textures,
//! physics) is the engine's business and is left untouched.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{AvatarError, Result};
use crate::catalog::MotionCatalog;

/// A minimal definition matching the structure of a model3.json file
/// (the "FileReferences" -> "Motions" table).
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ModelConfig {
    #[serde(rename = "Version", default)]
    pub version: Option<u32>,
    #[serde(rename = "FileReferences")]
    pub file_references: FileReferences,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FileReferences {
    #[serde(rename = "Motions", default)]
    pub motions: HashMap<String, Vec<MotionFileRef>>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct MotionFileRef {
    #[serde(rename = "File")]
    pub file: String,
}

/// A helper that attempts to parse a model settings JSON file.
pub fn load_model_config<P: AsRef<Path>>(path: P) -> Result<ModelConfig> {
    let p = path.as_ref();

    if !p.exists() {
        return Err(AvatarError::MissingElement(format!(
            "Model config does not exist: {}",
            p.display()
        )));
    }

    let bytes = fs::read(p)?;
    if bytes.is_empty() {
        return Err(AvatarError::MissingElement(format!(
            "Model config is empty: {}",
            p.display()
        )));
    }

    // Some export pipelines write a UTF-8 BOM; strip it before parsing.
    let content = if bytes.len() >= 3 && bytes[0] == 0xEF && bytes[1] == 0xBB && bytes[2] == 0xBF {
        tracing::debug!("BOM detected in {}, removing for parsing", p.display());
        &bytes[3..]
    } else {
        &bytes[..]
    };

    match serde_json::from_slice::<ModelConfig>(content) {
        Ok(cfg) => Ok(cfg),
        Err(e) => {
            tracing::error!("JSON parse error for {}: {}", p.display(), e);
            Err(e.into())
        }
    }
}

impl MotionCatalog {
    /// Catalog built from a parsed model config, keeping the stock category
    /// classification. Groups with no clip entries are skipped (just logged);
    /// requesting them later reports `InvalidGroup`.
    pub fn from_model_config(config: &ModelConfig) -> Self {
        let mut groups: HashMap<String, Vec<String>> = HashMap::new();
        for (group, refs) in &config.file_references.motions {
            if refs.is_empty() {
                tracing::warn!("Motion group '{group}' has no clips, skipping");
                continue;
            }
            groups.insert(group.clone(), refs.iter().map(|r| r.file.clone()).collect());
        }
        Self::new(groups, Self::default_categories())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_temp(tag: &str, contents: &[u8]) -> std::path::PathBuf {
        let mut path = std::env::temp_dir();
        path.push(format!("minabot_model_{}_{tag}.json", std::process::id()));
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(contents).unwrap();
        path
    }

    const SAMPLE: &str = r#"{
        "Version": 3,
        "FileReferences": {
            "Moc": "aersasi_2.moc3",
            "Motions": {
                "idle": [{"File": "motion/idle.motion3.json"}],
                "touch_head": [
                    {"File": "motion/touch_head_a.motion3.json"},
                    {"File": "motion/touch_head_b.motion3.json"}
                ],
                "hollow": []
            }
        }
    }"#;

    #[test]
    fn parses_motion_table_and_skips_empty_groups() {
        let path = write_temp("plain", SAMPLE.as_bytes());
        let config = load_model_config(&path).unwrap();
        let catalog = MotionCatalog::from_model_config(&config);
        fs::remove_file(&path).ok();

        assert_eq!(
            catalog.clips_for("touch_head").unwrap(),
            &[
                "motion/touch_head_a.motion3.json",
                "motion/touch_head_b.motion3.json"
            ]
        );
        assert!(!catalog.contains_group("hollow"));
    }

    #[test]
    fn tolerates_a_utf8_bom() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice(SAMPLE.as_bytes());
        let path = write_temp("bom", &bytes);
        let parsed = load_model_config(&path);
        fs::remove_file(&path).ok();
        assert!(parsed.is_ok());
    }

    #[test]
    fn missing_file_reports_missing_element() {
        let err = load_model_config("/definitely/not/here.model3.json").unwrap_err();
        assert!(matches!(err, AvatarError::MissingElement(_)));
    }
}
