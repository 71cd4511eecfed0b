//! Rendering of the created-files summary.

use crate::split::CreatedSegment;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;

/// Format a size as MB for files of at least 1 MiB, KB otherwise.
pub fn format_file_size(size_bytes: u64) -> String {
    let size = size_bytes as f64;
    if size >= MIB {
        format!("{:.2} MB", size / MIB)
    } else {
        format!("{:.2} KB", size / KIB)
    }
}

/// Render a two-column table of file names and sizes.
pub fn render_table(rows: &[(String, String)]) -> String {
    const NAME_HEADER: &str = "File Name";
    const SIZE_HEADER: &str = "Size";

    let name_width = rows
        .iter()
        .map(|(name, _)| name.chars().count())
        .chain(std::iter::once(NAME_HEADER.len()))
        .max()
        .unwrap_or_default();
    let size_width = rows
        .iter()
        .map(|(_, size)| size.chars().count())
        .chain(std::iter::once(SIZE_HEADER.len()))
        .max()
        .unwrap_or_default();

    let separator = format!(
        "+{}+{}+",
        "-".repeat(name_width + 2),
        "-".repeat(size_width + 2)
    );
    let row = |name: &str, size: &str| {
        format!("| {:<name_width$} | {:<size_width$} |", name, size)
    };

    let mut lines = vec![separator.clone(), row(NAME_HEADER, SIZE_HEADER), separator.clone()];
    lines.extend(rows.iter().map(|(name, size)| row(name, size)));
    lines.push(separator);

    let mut out = lines.join("\n");
    out.push('\n');
    out
}

/// Table rows for a list of created segments.
pub fn summary_rows(segments: &[CreatedSegment]) -> Vec<(String, String)> {
    segments
        .iter()
        .map(|s| (s.path.display().to_string(), format_file_size(s.byte_count())))
        .collect()
}

/// Full human-readable summary, including the heading line.
///
/// A dry run lists the files that would have been created.
pub fn render_summary(segments: &[CreatedSegment], dry_run: bool) -> String {
    let heading = if dry_run {
        "Would create files:"
    } else {
        "Summary of created files:"
    };
    format!("\n{}\n{}", heading, render_table(&summary_rows(segments)))
}
