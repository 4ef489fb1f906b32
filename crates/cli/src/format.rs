//! Human and JSON output formatting.

use datacap_core::types::{Customer, Page, TransactionOutcome, UsageReportRow};
use datacap_harness::demo::DemoReport;
use serde_json::json;

/// Output rendering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    /// Plain text for the terminal
    Human,
    /// One JSON document on stdout
    Json,
}

fn outcome_json(outcome: &TransactionOutcome) -> serde_json::Value {
    json!({
        "label": outcome.label,
        "attemptsUsed": outcome.attempts_used,
        "succeeded": outcome.succeeded(),
        "finalValueObserved": outcome.final_value,
        "error": outcome.error.as_ref().map(|e| json!({
            "code": e.code(),
            "message": e.to_string(),
        })),
    })
}

fn outcome_line(outcome: &TransactionOutcome) -> String {
    match (&outcome.final_value, &outcome.error) {
        (Some(value), _) => format!(
            "  {}: committed {} after {} attempt(s)",
            outcome.label, value, outcome.attempts_used
        ),
        (None, Some(error)) => format!(
            "  {}: FAILED after {} attempt(s): {}",
            outcome.label, outcome.attempts_used, error
        ),
        (None, None) => format!("  {}: no result", outcome.label),
    }
}

/// Render a demo report; `protected` selects the classification wording.
pub fn format_demo_report(report: &DemoReport, protected: bool, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => json!({
            "initial": report.initial,
            "expected": report.expected,
            "final": report.final_value,
            "consistent": report.consistent(),
            "lostUpdate": report.lost_update(),
            "transactions": report.outcomes.iter().map(outcome_json).collect::<Vec<_>>(),
        })
        .to_string(),
        OutputMode::Human => {
            let mut out = String::new();
            out.push_str(&format!(
                "initial {}  expected {}  final {}\n",
                report.initial, report.expected, report.final_value
            ));
            for outcome in &report.outcomes {
                out.push_str(&outcome_line(outcome));
                out.push('\n');
            }
            if report.consistent() {
                out.push_str(if protected {
                    "OK: both updates applied, no lost update\n"
                } else {
                    "consistent this run: the interleaving happened not to collide\n"
                });
            } else if report.lost_update() {
                out.push_str(if protected {
                    "WARNING: final value fell short of expectation\n"
                } else {
                    "LOST UPDATE: one increment was silently overwritten\n"
                });
            } else {
                out.push_str("WARNING: final value differs from expectation\n");
            }
            out
        }
    }
}

/// Render the exceeded-usage report.
pub fn format_usage_report(rows: &[UsageReportRow], mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => json!({ "rows": rows }).to_string(),
        OutputMode::Human => {
            if rows.is_empty() {
                return "no customers over their allowance\n".to_string();
            }
            let mut out = format!(
                "{:<4} {:<20} {:<12} {:>6} {:>10} {:>8} {:>5} {:>8}  {}\n",
                "id", "customer", "tariff", "mbps", "used GB", "over GB", "days", "avg/day", "status"
            );
            for row in rows {
                out.push_str(&format!(
                    "{:<4} {:<20} {:<12} {:>6} {:>10} {:>8} {:>5} {:>8}  {}\n",
                    row.customer_id,
                    row.customer_name,
                    row.tariff_name,
                    row.tariff_speed_mbps,
                    row.total_data_used_gb,
                    row.excess_data_gb,
                    row.days_active,
                    row.avg_daily_usage_gb,
                    row.subscription_status,
                ));
            }
            out
        }
    }
}

/// Render one page of the customer listing.
pub fn format_customer_page(page: &Page<Customer>, mode: OutputMode) -> String {
    match mode {
        OutputMode::Json => json!({
            "page": page.page,
            "perPage": page.per_page,
            "totalItems": page.total_items,
            "totalPages": page.total_pages(),
            "customers": page.items,
        })
        .to_string(),
        OutputMode::Human => {
            let mut out = String::new();
            for c in &page.items {
                out.push_str(&format!(
                    "{:<4} {:<24} {:<32} {:<10} {}\n",
                    c.id,
                    format!("{} {}", c.first_name, c.last_name),
                    c.email,
                    c.phone,
                    if c.active { "active" } else { "inactive" },
                ));
            }
            out.push_str(&format!(
                "page {} of {} ({} customers)\n",
                page.page,
                page.total_pages().max(1),
                page.total_items
            ));
            out
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn report(final_value: &str) -> DemoReport {
        DemoReport {
            initial: Decimal::from(100),
            expected: Decimal::from(180),
            final_value: final_value.parse().unwrap(),
            outcomes: [
                TransactionOutcome::success("slow-add-50", 1, Decimal::from(150)),
                TransactionOutcome::success("fast-add-30", 1, Decimal::from(130)),
            ],
        }
    }

    #[test]
    fn lost_update_is_called_out_in_human_output() {
        let text = format_demo_report(&report("150"), false, OutputMode::Human);
        assert!(text.contains("LOST UPDATE"));
    }

    #[test]
    fn json_output_carries_classification_flags() {
        let text = format_demo_report(&report("180"), true, OutputMode::Json);
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["consistent"], true);
        assert_eq!(value["lostUpdate"], false);
        assert_eq!(value["transactions"].as_array().unwrap().len(), 2);
    }
}
