//! Caption and report rendering.
//!
//! All outward text uses the transport's HTML markup. Formats follow the
//! catalog's long-standing conventions so existing pinned messages and
//! operator-channel audits stay visually consistent.

use chrono::{DateTime, Utc};

use folio_core::{CatalogEntry, CatalogStats, DocumentMetadata, MessageId};

fn code(s: impl std::fmt::Display) -> String {
    format!("<code>{s}</code>")
}

fn bold(s: impl std::fmt::Display) -> String {
    format!("<b>{s}</b>")
}

/// Size in megabytes, rounded to two decimals.
pub fn size_in_mb(len: usize) -> f64 {
    (len as f64 / (1024.0 * 1024.0) * 100.0).round() / 100.0
}

/// The extension part of an uploaded file name, if any.
pub fn file_extension(file_name: &str) -> Option<&str> {
    file_name
        .rsplit_once('.')
        .map(|(_, ext)| ext)
        .filter(|ext| !ext.is_empty())
}

/// Caption for a published or edited document message.
pub fn render_book_caption(meta: &DocumentMetadata, ext: Option<&str>, size_mb: f64) -> String {
    let format_part = match ext {
        Some(ext) => format!("{} {}. ", bold("Format:"), code(ext)),
        None => String::new(),
    };
    format!(
        "{} {}\n{} {}\n{} {}. {}{} <code>{size_mb:.2} MB</code>.",
        bold("Title:"),
        code(&meta.title),
        bold("Authors:"),
        code(&meta.authors),
        bold("Pages:"),
        code(meta.page_count),
        format_part,
        bold("Size:"),
    )
}

/// A catalog entry's description, re-rendered from the stored fields.
pub fn render_entry_description(entry: &CatalogEntry) -> String {
    format!(
        "{} {}\n{} {}\n{} {}. {} <code>{:.2} MB</code>.",
        bold("Title:"),
        code(&entry.title),
        bold("Authors:"),
        code(&entry.authors),
        bold("Pages:"),
        code(entry.page_count),
        bold("Size:"),
        entry.size_mb,
    )
}

/// Audit caption for the operator-channel copy sent before a replacement
/// destroys the old entry.
pub fn render_replacement_audit(canonical_ref: MessageId, previous: &CatalogEntry) -> String {
    format!(
        "The book at message {} has been modified.\nPreviously, it was:\n\n{}",
        code(canonical_ref),
        render_entry_description(previous),
    )
}

/// Audit caption for the operator-channel copy of an explicitly removed
/// entry.
pub fn render_removal_audit(entry: &CatalogEntry) -> String {
    format!(
        "The following book has been removed successfully:\n{}",
        render_entry_description(entry),
    )
}

/// Notice posted back into the uploader's thread when metadata is rejected.
pub fn render_rejection_notice(file_name: &str, detail: &str) -> String {
    format!(
        "Could not catalog {}: {detail}.\nExpected \"Authors: Title\" in the document metadata.",
        code(file_name),
    )
}

/// The fixed-format statistics report: general totals, one line per
/// category, last-refreshed timestamp.
pub fn render_stats_report(stats: &CatalogStats, refreshed_at: DateTime<Utc>) -> String {
    let general = format!(
        "{} {}\n{} {}\n{} <code>{:.2} MB</code>\n{} {}",
        bold("Total books:"),
        code(stats.total_books),
        bold("Total pages:"),
        code(stats.total_pages),
        bold("Total size:"),
        stats.total_size_mb,
        bold("Total categories:"),
        code(stats.total_categories),
    );

    let mut detailed = stats
        .per_category
        .iter()
        .map(|c| {
            format!(
                "{}: <code>{} books, {} pages, {:.2} MB</code>",
                bold(&c.category),
                c.books,
                c.pages,
                c.size_mb,
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    if !detailed.is_empty() {
        detailed = format!("\n{detailed}\n");
    }

    let refreshed = format!(
        "{} {}",
        bold("Last refreshed:"),
        code(refreshed_at.format("%B %d, %Y %I:%M %p UTC")),
    );

    format!("{general}\n{detailed}\n{refreshed}")
}
