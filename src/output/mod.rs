mod format;
mod json;
mod table;

pub(crate) use json::output_backups_json;
pub(crate) use table::{BackupTableOptions, print_backup_table};
