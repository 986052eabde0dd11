//! Model list view helpers
//!
//! Search filtering and plain-text export of a fetched model list. Neither
//! touches the fetched data itself.

use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::ExportError;
use crate::models::ModelRecord;

/// Case-insensitive substring filter. An empty or blank query keeps
/// everything. Order is preserved.
pub fn filter<'a>(models: &'a [ModelRecord], query: &str) -> Vec<&'a ModelRecord> {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return models.iter().collect();
    }
    models
        .iter()
        .filter(|m| m.id.to_lowercase().contains(&query))
        .collect()
}

/// Timestamped export file name, e.g. `model_ids_20240501_123045.txt`.
pub fn export_file_name() -> String {
    format!("model_ids_{}.txt", Local::now().format("%Y%m%d_%H%M%S"))
}

/// Write model ids, one per line, into a new timestamped file in `dir`.
pub fn export<'a, I>(models: I, dir: &Path) -> Result<PathBuf, ExportError>
where
    I: IntoIterator<Item = &'a ModelRecord>,
{
    let ids: Vec<&str> = models.into_iter().map(|m| m.id.as_str()).collect();
    if ids.is_empty() {
        return Err(ExportError::Empty);
    }

    let path = dir.join(export_file_name());
    fs::write(&path, ids.join("\n"))?;

    info!("Exported {} model ids to {:?}", ids.len(), path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(ids: &[&str]) -> Vec<ModelRecord> {
        ids.iter().map(|id| ModelRecord::new(*id)).collect()
    }

    #[test]
    fn test_filter_case_insensitive_keeps_order() {
        let models = records(&["gpt-4o", "text-embedding-3", "GPT-3.5-turbo", "whisper-1"]);
        let hits: Vec<&str> = filter(&models, "  Gpt ").iter().map(|m| m.id.as_str()).collect();
        assert_eq!(hits, vec!["gpt-4o", "GPT-3.5-turbo"]);
    }

    #[test]
    fn test_filter_blank_query_keeps_all() {
        let models = records(&["b", "a"]);
        assert_eq!(filter(&models, "").len(), 2);
        assert_eq!(filter(&models, "   ").len(), 2);
        assert!(filter(&models, "zzz").is_empty());
    }

    #[test]
    fn test_export_file_name_shape() {
        let name = export_file_name();
        assert!(name.starts_with("model_ids_"));
        assert!(name.ends_with(".txt"));
        assert_eq!(name.len(), "model_ids_YYYYMMDD_HHMMSS.txt".len());
    }

    #[test]
    fn test_export_writes_lines() {
        let dir = tempfile::tempdir().unwrap();
        let models = records(&["gpt-4", "gpt-3.5"]);
        let path = export(&models, dir.path()).unwrap();
        assert_eq!(fs::read_to_string(path).unwrap(), "gpt-4\ngpt-3.5");
    }

    #[test]
    fn test_export_refuses_empty() {
        let dir = tempfile::tempdir().unwrap();
        let empty: Vec<ModelRecord> = Vec::new();
        let err = export(&empty, dir.path()).unwrap_err();
        assert!(matches!(err, ExportError::Empty));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }
}
