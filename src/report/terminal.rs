use std::path::Path;

use colored::*;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};

use crate::models::{DependencyRecord, LicenseSource};
use crate::orchestrator::ResolutionSummary;

/// Print the end-of-run summary to stderr.
pub fn render(
    records: &[DependencyRecord],
    summary: &ResolutionSummary,
    output: &Path,
    written: usize,
    verbose: bool,
) {
    eprintln!(
        "\n {} v{}",
        "license-extractor".bold(),
        env!("CARGO_PKG_VERSION")
    );
    eprintln!(" Wrote {} projects to {}\n", written, output.display());

    eprintln!(" ┌────────────────────────────────────────────────────┐");
    eprintln!(" │  {:<48} │", "SUMMARY".bold());
    eprintln!(" │  {:<48} │", format!("Dependencies       : {:>5}", summary.total));
    eprintln!(" │  {:<48} │", format!("Resolved           : {:>5}", summary.resolved()));
    eprintln!(
        " │  {:<48} │",
        format!("{}  Local file      : {:>5}", "✓".green(), summary.local_file)
    );
    eprintln!(
        " │  {:<48} │",
        format!("{}  Cache           : {:>5}", "✓".green(), summary.cache)
    );
    eprintln!(
        " │  {:<48} │",
        format!("{}  Network         : {:>5}", "✓".green(), summary.network)
    );
    eprintln!(
        " │  {:<48} │",
        format!(
            "{}  Unresolved      : {:>5}",
            "✗".red(),
            summary.unresolved + summary.no_license_url
        )
    );
    eprintln!(" └────────────────────────────────────────────────────┘\n");

    if verbose {
        let unresolved = unresolved_table(records);
        if let Some(table) = unresolved {
            eprintln!(" {} Dependencies without license text:\n", "[UNRESOLVED]".red().bold());
            eprintln!("{}", table);
            eprintln!();
        }
    }
}

fn unresolved_table(records: &[DependencyRecord]) -> Option<Table> {
    let mut rows = records.iter().filter(|r| !r.is_resolved()).peekable();
    rows.peek()?;

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Dependency").add_attribute(Attribute::Bold),
            Cell::new("License").add_attribute(Attribute::Bold),
            Cell::new("License URL").add_attribute(Attribute::Bold),
            Cell::new("Reason").add_attribute(Attribute::Bold),
        ]);

    for record in rows {
        let reason_color = match record.source {
            LicenseSource::NoLicenseUrl => Color::DarkGrey,
            _ => Color::Red,
        };
        table.add_row(vec![
            Cell::new(&record.key),
            Cell::new(&record.licenses),
            Cell::new(record.license_url.as_deref().unwrap_or("-")),
            Cell::new(record.source.to_string()).fg(reason_color),
        ]);
    }

    Some(table)
}
