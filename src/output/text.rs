//! Plain-text summary of an insights response.

use crate::commands::query::QueryResponse;
use crate::parser::extract::normalize_share;

/// Render the summary, coverage notes and channel breakdown
///
/// **Public** - printed by the CLI with `--summary`
pub fn format_summary(response: &QueryResponse) -> String {
    let insights = &response.insights;
    let summary = &insights.summary;
    let mut out = String::new();

    out.push_str(&"=".repeat(60));
    out.push('\n');
    out.push_str(&format!("INSIGHTS: {} ({})\n", response.domain, response.mode));
    out.push_str(&"=".repeat(60));
    out.push('\n');
    out.push_str(&format!("Visits:           {}\n", format_metric(summary.visits, 0)));
    out.push_str(&format!(
        "Bounce rate:      {}\n",
        summary
            .bounce_rate
            .map(|rate| format!("{:.1}%", share_percent(rate)))
            .unwrap_or_else(|| "n/a".to_string())
    ));
    out.push_str(&format!("Pages per visit:  {}\n", format_metric(summary.pages_per_visit, 2)));
    out.push_str(&format!("Avg duration (s): {}\n", format_metric(summary.avg_duration, 0)));

    if !insights.channels.is_empty() {
        out.push_str("\nChannels:\n");
        for channel in &insights.channels {
            out.push_str(&format!(
                "  {:<20} {:>6.1}%\n",
                channel.channel,
                share_percent(channel.share)
            ));
        }
    }

    if insights.coverage.partial {
        out.push_str("\nPartial coverage:\n");
        if insights.coverage.notes.is_empty() {
            out.push_str("  - No data available for this domain\n");
        }
        for note in &insights.coverage.notes {
            out.push_str(&format!("  - {}\n", note));
        }
    }

    out
}

/// Percentage for display, using the same threshold rule as the parser
///
/// A value already converted to a fraction stays a fraction, so nothing
/// is divided by 100 twice.
pub fn share_percent(value: f64) -> f64 {
    normalize_share(value) * 100.0
}

fn format_metric(value: Option<f64>, precision: usize) -> String {
    value
        .map(|v| format!("{:.*}", precision, v))
        .unwrap_or_else(|| "n/a".to_string())
}
