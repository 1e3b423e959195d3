// Colored terminal output for collection runs, keywords and stored data.
//
// main.rs delegates all formatting here; nothing in this module touches
// the network or the filesystem.

use std::path::Path;

use colored::Colorize;

use crate::papers::models::{Conference, Corpus};
use crate::pipeline::collect::CollectOutcome;
use crate::status::{format_bytes, TableStatus};
use crate::visualize::layout::matching_rows;

/// Summary of one `collect` run.
pub fn display_collection(conference: Conference, year: u16, outcome: &CollectOutcome) {
    println!(
        "\n{}",
        format!("=== {} {} ===", conference.as_str().to_uppercase(), year).bold()
    );
    println!();

    let c = &outcome.collection;
    println!("  Papers found:      {}", c.found);
    println!("  Papers collected:  {}", c.collected.to_string().green());
    if c.skipped > 0 {
        println!("  Papers skipped:    {}", c.skipped.to_string().yellow());
    }

    let s = &outcome.saved;
    if s.dropped > 0 {
        println!(
            "  Short abstracts:   {} {}",
            s.dropped.to_string().yellow(),
            "(removed)".dimmed()
        );
    }
    println!(
        "\n  Saved {} papers to {}",
        s.kept.to_string().bold(),
        s.path.display()
    );
}

/// Keyword list with how many titles each one highlights.
pub fn display_keywords(corpus: &Corpus, keywords: &[String]) {
    println!(
        "\n{}",
        format!(
            "=== Title Keywords ({} from {} papers) ===",
            keywords.len(),
            corpus.len()
        )
        .bold()
    );
    println!();

    if keywords.is_empty() {
        println!("  No keywords survived filtering.");
        return;
    }

    println!(
        "  {:>4}  {:<20} {:>7}  {}",
        "#".dimmed(),
        "Keyword".dimmed(),
        "Papers".dimmed(),
        "Example title".dimmed(),
    );
    println!("  {}", "-".repeat(78).dimmed());

    for (i, keyword) in keywords.iter().enumerate() {
        let rows = matching_rows(corpus, keyword);
        let example = rows
            .first()
            .map(|&row| super::truncate_chars(&corpus.papers()[row].title, 40))
            .unwrap_or_default();
        println!(
            "  {:>4}. {:<20} {:>7}  {}",
            i + 1,
            keyword.cyan(),
            rows.len(),
            example.dimmed()
        );
    }
    println!();
}

/// Where the rendered map went.
pub fn display_map_written(path: &Path, papers: usize, keywords: usize) {
    println!(
        "\n  {} map of {} papers with {} keywords: {}",
        "Rendered".green().bold(),
        papers,
        keywords,
        path.display()
    );
}

/// Stored tables under the data directory.
pub fn display_status(data_dir: &Path, tables: &[TableStatus]) {
    println!("Data directory: {}", data_dir.display());

    if tables.is_empty() {
        println!("Stored tables: none");
        println!("  Run `papermap collect --conf cvpr --year 2022` to collect papers");
        return;
    }

    println!(
        "\n{}",
        format!("=== Stored Tables ({}) ===", tables.len()).bold()
    );
    println!();
    println!(
        "  {:<24} {:>6}  {:>8}  {:<10} {:<12} {:>9}  {}",
        "File".dimmed(),
        "Rows".dimmed(),
        "Rejected".dimmed(),
        "Conference".dimmed(),
        "Years".dimmed(),
        "Size".dimmed(),
        "Modified".dimmed(),
    );
    println!("  {}", "-".repeat(96).dimmed());

    for table in tables {
        let name = table
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let years = table
            .years
            .iter()
            .map(u16::to_string)
            .collect::<Vec<_>>()
            .join(",");
        let modified = table
            .modified
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "unknown".to_string());

        println!(
            "  {:<24} {:>6}  {:>8}  {:<10} {:<12} {:>9}  {}",
            name,
            table.rows,
            table.rejected,
            table.conferences.join(","),
            years,
            format_bytes(table.size_bytes),
            modified.dimmed()
        );
    }

    let total: usize = tables.iter().map(|t| t.rows).sum();
    println!("\n  {} papers stored in total", total.to_string().bold());
}
