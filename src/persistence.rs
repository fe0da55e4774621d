// File: src/persistence.rs
use crate::core::language::LanguageRegistry;
use crate::core::types::FrequencyDistribution;
use crate::error::{BreakerError, Result};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::info;

/// Writes the registry atomically: the bytes land in a temp file next to `path`
/// and are renamed over it only once fully written.
pub fn save_registry(registry: &LanguageRegistry, path: &Path) -> Result<()> {
    let parent_dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        bincode::serialize_into(&mut writer, registry)?;
        writer.flush()?;
    }

    temp_file.persist(path).map_err(|e| BreakerError::Io(e.error))?;
    info!(path = %path.display(), languages = registry.languages().len(), "language registry saved");
    Ok(())
}

pub fn load_registry(path: &Path) -> Result<LanguageRegistry> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let registry: LanguageRegistry = bincode::deserialize_from(reader)?;
    Ok(registry)
}

/// Loads a letter profile. `.json` files hold `{"A": 8.12, ...}`; anything else is
/// read as `letter,percent` lines.
pub fn load_profile_file(language: &str, path: &Path) -> Result<FrequencyDistribution> {
    let content = fs::read_to_string(path)?;
    let is_json = path.extension().and_then(|e| e.to_str()).is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if !is_json {
        return LanguageRegistry::parse_frequency_table(language, &content);
    }

    let table: BTreeMap<String, f64> = serde_json::from_str(&content)?;
    let mut pairs = Vec::with_capacity(table.len());
    for (key, percent) in table {
        let mut chars = key.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => pairs.push((c, percent)),
            _ => {
                return Err(BreakerError::InvalidProfile {
                    language: language.to_string(),
                    reason: format!("'{}' is not a single Latin letter", key),
                })
            }
        }
    }
    if pairs.is_empty() {
        return Err(BreakerError::InvalidProfile {
            language: language.to_string(),
            reason: "no letter entries".to_string(),
        });
    }
    Ok(FrequencyDistribution::from_pairs(&pairs))
}

pub fn read_ciphertext(path: &Path) -> Result<String> {
    Ok(fs::read_to_string(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_registry_roundtrip_through_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("profiles").join("registry.bin");

        let mut registry = LanguageRegistry::new();
        registry.register("german", FrequencyDistribution::from_pairs(&[('E', 16.4), ('N', 9.8)]));
        save_registry(&registry, &path).unwrap();

        let loaded = load_registry(&path).unwrap();
        assert_eq!(loaded, registry);
        assert_eq!(loaded.get("german").get('N'), 9.8);
    }

    #[test]
    fn test_load_missing_registry_is_io_error() {
        let dir = tempdir().unwrap();
        let err = load_registry(&dir.path().join("absent.bin")).unwrap_err();
        assert!(matches!(err, BreakerError::Io(_)));
    }

    #[test]
    fn test_load_csv_and_json_profiles() {
        let dir = tempdir().unwrap();

        let csv_path = dir.path().join("french.csv");
        let mut csv = File::create(&csv_path).unwrap();
        writeln!(csv, "# letter,percent\nE,14.7\nA,7.6").unwrap();
        let csv_profile = load_profile_file("french", &csv_path).unwrap();
        assert_eq!(csv_profile.get('E'), 14.7);

        let json_path = dir.path().join("french.json");
        fs::write(&json_path, r#"{"E": 14.7, "a": 7.6}"#).unwrap();
        let json_profile = load_profile_file("french", &json_path).unwrap();
        assert_eq!(json_profile.get('A'), 7.6);

        fs::write(&json_path, r#"{"EE": 1.0}"#).unwrap();
        assert!(matches!(
            load_profile_file("french", &json_path),
            Err(BreakerError::InvalidProfile { .. })
        ));
    }
}
