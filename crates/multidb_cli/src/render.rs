//! Plain-text report sink.

use multidb_core::{BatchReport, EntityReport};
use std::fmt::Write;

/// Renders all entity reports in phase order.
pub fn render_text(report: &BatchReport) -> String {
    let mut out = String::new();
    out.push_str("\n================ RESULTS ================\n");
    for (index, entity) in report.entities().into_iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        render_entity(&mut out, entity);
    }
    out.push_str("\n========================================\n");
    out
}

fn render_entity(out: &mut String, report: &EntityReport) {
    // Writing into a String cannot fail.
    let _ = writeln!(
        out,
        "--- {} Table ({}) ---",
        report.entity.label(),
        report.store_file_name()
    );
    let _ = writeln!(out, "Inserted: {}", report.inserted_count);
    let _ = writeln!(out, "Skipped: {}", report.skipped_count);
    for skipped in &report.skipped_details {
        let _ = writeln!(out, "  id={} -> {}", skipped.id, skipped.joined_reasons());
    }
    if report.failed_count > 0 {
        let _ = writeln!(out, "Failed: {}", report.failed_count);
        for failed in &report.failed_details {
            let _ = writeln!(
                out,
                "  id={} -> {} (after {} attempts)",
                failed.id, failed.error, failed.attempts
            );
        }
    }
}
