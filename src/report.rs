//! Fixed-width text rendering of a [`SummaryStatistics`] block.

use serde::{Deserialize, Serialize};

use crate::aggregate::SummaryStatistics;
use crate::significance::SignificanceSummary;

const LABEL_WIDTH: usize = 18;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportOptions {
    pub method_name: String,
    pub width: usize,
}

impl Default for ReportOptions {
    fn default() -> Self {
        Self {
            method_name: "Method".to_string(),
            width: 72,
        }
    }
}

impl ReportOptions {
    pub fn new(method_name: impl Into<String>, width: usize) -> Self {
        Self {
            method_name: method_name.into(),
            width,
        }
    }
}

/// Positive and negative counts of the weighted totals. Explicit counts win;
/// otherwise the positive count is recovered from `positive_rate_total`.
pub fn sentiment_counts(summary: &SummaryStatistics) -> (usize, usize) {
    let positive = summary.positive_count_total.unwrap_or_else(|| {
        let estimate = (summary.n as f64 * summary.positive_rate_total).round_ties_even();
        if estimate.is_finite() && estimate > 0.0 {
            estimate as usize
        } else {
            0
        }
    });
    let negative = summary
        .negative_count_total
        .unwrap_or_else(|| summary.n.saturating_sub(positive));
    (positive, negative)
}

pub fn render_report(
    summary: &SummaryStatistics,
    options: &ReportOptions,
    significance: Option<&SignificanceSummary>,
) -> String {
    let title = format!("[{}] Evaluation Summary", options.method_name);
    let width = options.width.max(title.chars().count() + 4);
    let separator = "=".repeat(width);
    let (positive, negative) = sentiment_counts(summary);

    let mut lines = vec![
        separator.clone(),
        center(&title, width),
        separator.clone(),
        format!("{:<LABEL_WIDTH$} {:>10}", "n rows", summary.n),
        format!(
            "{:<LABEL_WIDTH$} importance={:.2}, word_count={:.2}, total={:.2}",
            "mean", summary.mean_importance, summary.mean_word_count, summary.mean_total
        ),
        format!(
            "{:<LABEL_WIDTH$} importance={:.2}, word_count={:.2}",
            "median", summary.median_importance, summary.median_word_count
        ),
        format!(
            "{:<LABEL_WIDTH$} importance={:.2}, word_count={:.2}",
            "std", summary.std_importance, summary.std_word_count
        ),
        format!(
            "{:<LABEL_WIDTH$} overall positive:{positive}, overall negative:{negative}",
            "overall sentiment"
        ),
    ];

    if let Some(significance) = significance {
        lines.push(significance_line(significance));
    }

    lines.push(separator);
    let mut rendered = lines.join("\n");
    rendered.push('\n');
    rendered
}

/// Pads `text` to `width` columns. An odd margin puts the extra space on the
/// left when `width` is odd too, and on the right otherwise.
fn center(text: &str, width: usize) -> String {
    let length = text.chars().count();
    if length >= width {
        return text.to_string();
    }

    let margin = width - length;
    let left = margin / 2 + (margin & width & 1);
    format!("{}{text}{}", " ".repeat(left), " ".repeat(margin - left))
}

fn significance_line(significance: &SignificanceSummary) -> String {
    let p_value = significance
        .sign_test_p_value
        .map(|p| format!("{p:.4}"))
        .unwrap_or_else(|| "n/a".to_string());
    let interval = significance
        .mean_total_ci95
        .map(|ci| format!("[{:.2}, {:.2}]", ci.low, ci.high))
        .unwrap_or_else(|| "n/a".to_string());

    format!(
        "{:<LABEL_WIDTH$} wins={}, losses={}, sign_test_p={p_value}, mean_total_ci95={interval}",
        "significance", significance.wins, significance.losses
    )
}
