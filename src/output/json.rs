use chrono::{DateTime, Utc};

use crate::backup::BackupEntry;

pub(crate) fn output_backups_json(entries: &[BackupEntry], keep: usize) -> String {
    let output: Vec<serde_json::Value> = entries
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let modified: DateTime<Utc> = entry.modified.into();
            serde_json::json!({
                "name": entry.name,
                "path": entry.path.display().to_string(),
                "size_bytes": entry.size,
                "modified": modified.to_rfc3339(),
                "expired": i >= keep,
            })
        })
        .collect();
    serde_json::to_string_pretty(&output).unwrap_or_else(|_| "[]".to_string())
}
