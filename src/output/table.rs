use chrono::{DateTime, Utc};
use comfy_table::{Color, Table};

use crate::backup::BackupEntry;
use crate::output::format::{create_styled_table, header_cell, right_cell, styled_cell};
use crate::utils::{Timezone, format_bytes};

const LISTING_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

#[derive(Debug, Clone, Copy)]
pub(crate) struct BackupTableOptions {
    pub(crate) keep: usize,
    pub(crate) use_color: bool,
    pub(crate) timezone: Timezone,
}

pub(crate) fn build_backup_table(entries: &[BackupEntry], opts: BackupTableOptions) -> Table {
    let c = opts.use_color;
    let mut table = create_styled_table();
    table.set_header(vec![
        header_cell("#", c),
        header_cell("Backup", c),
        header_cell("Modified", c),
        header_cell("Size", c),
        header_cell("Status", c),
    ]);

    for (i, entry) in entries.iter().enumerate() {
        let modified: DateTime<Utc> = entry.modified.into();
        let (status, color) = if i < opts.keep {
            ("kept", Color::Green)
        } else {
            ("expired", Color::Yellow)
        };
        table.add_row(vec![
            right_cell(&(i + 1).to_string()),
            styled_cell(&entry.name, None, c),
            styled_cell(&opts.timezone.format(modified, LISTING_TIME_FORMAT), None, c),
            right_cell(&format_bytes(entry.size)),
            styled_cell(status, Some(color), c),
        ]);
    }
    table
}

pub(crate) fn print_backup_table(entries: &[BackupEntry], opts: BackupTableOptions) {
    let total: u64 = entries.iter().map(|e| e.size).sum();
    println!("{}", build_backup_table(entries, opts));
    println!(
        "\n  {} backups, {} total (keeping {})\n",
        entries.len(),
        format_bytes(total),
        opts.keep
    );
}
