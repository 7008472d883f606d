//! Report Store: loads input reports and loads/saves the output mapping.
//!
//! The output mapping is a JSON object keyed by report id so that a resumed
//! run can tell which ids were already processed. It is rewritten in full
//! after every insertion, through a temp file renamed over the destination.

pub mod reshape;

use std::fs;
use std::io::{BufWriter, Write};
use std::path::Path;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{Map, Value};
use tempfile::NamedTempFile;
use tracing::{debug, warn};

use crate::errors::ScorerError;

/// One text record to annotate. Fields other than `id` and `text` are kept
/// verbatim and in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl Report {
    pub fn set_field(&mut self, key: &str, value: Value) {
        self.fields.insert(key.to_string(), value);
    }
}

/// Persisted run state: report id → full record, in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OutputMapping {
    records: Map<String, Value>,
}

impl OutputMapping {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(test)]
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Value> {
        self.records.get(id)
    }

    /// Inserts or replaces the record for `report.id`. A replaced record keeps
    /// its position.
    pub fn insert(&mut self, report: Report) -> Result<(), ScorerError> {
        let record = serde_json::to_value(&report)?;
        self.records.insert(report.id, record);
        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.records.iter()
    }
}

/// Loads the input reports: a JSON array of objects, each with at least `id`.
pub fn load_reports(path: &Path) -> Result<Vec<Report>, ScorerError> {
    let reports: Vec<Report> = read_json(path)?;
    debug!("Loaded {} reports from '{}'", reports.len(), path.display());
    Ok(reports)
}

/// Loads prior output for a resumed run.
///
/// A missing file means no prior progress. An unreadable or corrupt file is
/// logged and also treated as no prior progress, so its entries will be
/// recomputed and the file overwritten on the next save.
pub fn load_existing_output(path: &Path) -> OutputMapping {
    if !path.exists() {
        return OutputMapping::default();
    }
    match read_output(path) {
        Ok(mapping) => mapping,
        Err(e) => {
            warn!(
                "Could not load existing output from '{}': {e}. Starting without prior progress",
                path.display()
            );
            OutputMapping::default()
        }
    }
}

/// Strict load of an output mapping; any failure is an error.
pub fn read_output(path: &Path) -> Result<OutputMapping, ScorerError> {
    read_json(path)
}

/// Writes the whole mapping to `path`, creating parent directories.
pub fn save(mapping: &OutputMapping, path: &Path) -> Result<(), ScorerError> {
    write_json(mapping, path)
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ScorerError> {
    let raw = fs::read_to_string(path).map_err(|source| ScorerError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ScorerError::ParseFile {
        path: path.to_path_buf(),
        source,
    })
}

pub(crate) fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<(), ScorerError> {
    let write_err = |source: std::io::Error| ScorerError::WriteFile {
        path: path.to_path_buf(),
        source,
    };

    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent).map_err(write_err)?;

    let mut temp = NamedTempFile::new_in(parent).map_err(write_err)?;
    {
        let mut writer = BufWriter::new(temp.as_file_mut());
        serde_json::to_writer_pretty(&mut writer, value)?;
        writer.flush().map_err(write_err)?;
    }
    match_permissions(temp.as_file(), path).map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}

/// Temp files are created owner-only; give the replacement the destination's
/// current mode, or 0644 for a new file.
#[cfg(unix)]
fn match_permissions(file: &fs::File, dest: &Path) -> std::io::Result<()> {
    use std::os::unix::fs::PermissionsExt;

    let permissions = match fs::metadata(dest) {
        Ok(meta) => meta.permissions(),
        Err(_) => fs::Permissions::from_mode(NEW_FILE_MODE),
    };
    file.set_permissions(permissions)
}

#[cfg(not(unix))]
fn match_permissions(_file: &fs::File, _dest: &Path) -> std::io::Result<()> {
    Ok(())
}

#[cfg(unix)]
const NEW_FILE_MODE: u32 = 0o644;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn report(id: &str, text: &str) -> Report {
        Report {
            id: id.to_string(),
            text: text.to_string(),
            fields: Map::new(),
        }
    }

    #[test]
    fn test_load_reports_defaults_text_and_keeps_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.json");
        fs::write(
            &path,
            r#"[
                {"id": "r1", "text": "Engine failed.", "date": "1999-01-01", "emotion": null},
                {"id": "r2", "source": "fax"}
            ]"#,
        )
        .unwrap();

        let reports = load_reports(&path).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].text, "Engine failed.");
        assert_eq!(reports[0].fields.get("date"), Some(&json!("1999-01-01")));
        assert_eq!(reports[0].fields.get("emotion"), Some(&Value::Null));
        assert_eq!(reports[1].text, "");
        assert_eq!(reports[1].fields.get("source"), Some(&json!("fax")));
    }

    #[test]
    fn test_load_reports_requires_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports.json");
        fs::write(&path, r#"[{"text": "no id"}]"#).unwrap();

        let err = load_reports(&path).unwrap_err();
        assert!(matches!(err, ScorerError::ParseFile { .. }));
    }

    #[test]
    fn test_load_reports_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_reports(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, ScorerError::ReadFile { .. }));
    }

    #[test]
    fn test_load_existing_output_absent_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let mapping = load_existing_output(&dir.path().join("scores.json"));
        assert!(mapping.is_empty());
    }

    #[test]
    fn test_load_existing_output_corrupt_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, r#"{"r1": {"id": "r1", "te"#).unwrap();

        assert!(load_existing_output(&path).is_empty());
        assert!(read_output(&path).is_err());
    }

    #[test]
    fn test_save_creates_parent_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/scores.json");

        let mut mapping = OutputMapping::default();
        let mut r = report("r1", "It broke.");
        r.set_field("emotion", json!("low"));
        mapping.insert(r).unwrap();
        save(&mapping, &path).unwrap();

        let loaded = load_existing_output(&path);
        assert_eq!(loaded, mapping);
        assert_eq!(
            loaded.get("r1"),
            Some(&json!({"id": "r1", "text": "It broke.", "emotion": "low"}))
        );
    }

    #[test]
    fn test_save_overwrites_previous_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        fs::write(&path, "garbage that is much longer than the new content").unwrap();

        save(&OutputMapping::default(), &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "{}");
    }

    #[cfg(unix)]
    fn mode(path: &Path) -> u32 {
        use std::os::unix::fs::PermissionsExt;
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[cfg(unix)]
    #[test]
    fn test_save_new_file_is_world_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");

        save(&OutputMapping::default(), &path).unwrap();
        assert_eq!(mode(&path), 0o644);
    }

    #[cfg(unix)]
    #[test]
    fn test_save_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let shared = dir.path().join("shared.json");
        fs::write(&shared, "{}").unwrap();
        fs::set_permissions(&shared, fs::Permissions::from_mode(0o644)).unwrap();
        let group = dir.path().join("group.json");
        fs::write(&group, "{}").unwrap();
        fs::set_permissions(&group, fs::Permissions::from_mode(0o640)).unwrap();

        let mut mapping = OutputMapping::default();
        mapping.insert(report("r1", "text")).unwrap();
        save(&mapping, &shared).unwrap();
        save(&mapping, &group).unwrap();

        assert_eq!(mode(&shared), 0o644);
        assert_eq!(mode(&group), 0o640);
        assert!(read_output(&shared).unwrap().contains("r1"));
    }

    #[test]
    fn test_insert_replaces_in_place() {
        let mut mapping = OutputMapping::default();
        mapping.insert(report("a", "1")).unwrap();
        mapping.insert(report("b", "2")).unwrap();
        mapping.insert(report("a", "3")).unwrap();

        let ids: Vec<&String> = mapping.iter().map(|(id, _)| id).collect();
        assert_eq!(ids, ["a", "b"]);
        assert_eq!(mapping.get("a").unwrap()["text"], json!("3"));
    }
}
