// Data-driven phonemizer configuration.
//
// Loaded from JSON; every field has a default so a partial file (or none at
// all) is valid. The tempo section only feeds the CLI's `FixedTempo`
// converter. Hosts embedding the sequencer supply their own
// `TickConverter` and ignore it.

use crate::error::{LoadError, read_file};
use crate::voicebank::FixedTempo;
use cvvc_lang::{LookupTables, TableDefs};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Tunable phonemizer parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhonemizerConfig {
    /// VC length in ticks when the next note's alias has no timing data.
    pub default_transition_ticks: i32,
    /// Tempo used to convert preutterance/overlap milliseconds to ticks.
    pub tempo: FixedTempo,
}

impl Default for PhonemizerConfig {
    fn default() -> Self {
        PhonemizerConfig {
            default_transition_ticks: 120,
            tempo: FixedTempo::default(),
        }
    }
}

impl PhonemizerConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, LoadError> {
        Ok(Self::from_json(&read_file(path)?)?)
    }
}

/// Load custom lookup tables from a JSON file of grouped definitions.
pub fn load_tables(path: &Path) -> Result<LookupTables, LoadError> {
    let defs = TableDefs::from_json(&read_file(path)?)?;
    Ok(LookupTables::from_defs(&defs)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cvvc_lang::{TableError, VowelClass};
    use std::path::PathBuf;

    fn data_path(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../data").join(name)
    }

    fn fixture_path(name: &str) -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name)
    }

    #[test]
    fn test_load_demo_config() {
        let config = PhonemizerConfig::load(&data_path("demo_config.json")).unwrap();
        assert_eq!(config.default_transition_ticks, 120);
        assert_eq!(config.tempo, FixedTempo::default());
    }

    #[test]
    fn test_load_config_invalid_json() {
        let err = PhonemizerConfig::load(&fixture_path("truncated.json")).unwrap_err();
        assert!(matches!(err, LoadError::Json(_)));
    }

    #[test]
    fn test_load_custom_tables() {
        let tables = load_tables(&data_path("demo_tables.json")).unwrap();
        assert_eq!(tables.trailing_vowel_class("kya"), Some(VowelClass::A));
        assert_eq!(tables.leading_consonant_class("kya"), Some("ky"));
        assert_eq!(tables.substitute_class_of("ky"), Some("k"));
        assert!(tables.is_bare_mora("n"));
        // Kana are not part of these tables.
        assert_eq!(tables.leading_consonant_class("か"), None);
    }

    #[test]
    fn test_load_malformed_tables() {
        let err = load_tables(&fixture_path("malformed_tables.json")).unwrap_err();
        assert!(matches!(
            err,
            LoadError::Tables(TableError::MalformedGroup(ref group)) if group == "a,ka"
        ));
    }

    #[test]
    fn test_load_tables_invalid_json() {
        let err = load_tables(&fixture_path("truncated.json")).unwrap_err();
        assert!(matches!(err, LoadError::Tables(TableError::Json(_))));
    }

    #[test]
    fn test_load_tables_missing_file() {
        let err = load_tables(&fixture_path("absent.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
    }

    #[test]
    fn test_default_config() {
        let config = PhonemizerConfig::default();
        assert_eq!(config.default_transition_ticks, 120);
        assert_eq!(config.tempo.resolution, 480);
    }

    #[test]
    fn test_partial_config_json() {
        let config = PhonemizerConfig::from_json(r#"{"tempo": {"bpm": 90.0}}"#).unwrap();
        assert_eq!(config.default_transition_ticks, 120);
        assert_eq!(config.tempo.bpm, 90.0);
        assert_eq!(config.tempo.resolution, 480);
    }

    #[test]
    fn test_empty_config_json() {
        let config = PhonemizerConfig::from_json("{}").unwrap();
        assert_eq!(config, PhonemizerConfig::default());
    }

    #[test]
    fn test_load_missing_file() {
        let err = PhonemizerConfig::load(Path::new("/nonexistent/phonemizer.json")).unwrap_err();
        assert!(matches!(err, LoadError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/phonemizer.json"));
    }
}
