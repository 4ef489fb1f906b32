//! Exceeded-usage report over the customer directory.
//!
//! A single parameterless read: every customer whose consumption is over
//! their allowance, with excess and average-daily figures to two decimals,
//! ordered by excess descending.

use rust_decimal::Decimal;

use datacap_core::types::UsageReportRow;

use crate::directory::CustomerDirectory;

/// Committed report figures carry two fractional digits.
const REPORT_SCALE: u32 = 2;

impl CustomerDirectory {
    /// Build the exceeded-usage report.
    ///
    /// Customers without subscription data, and customers within their
    /// allowance, do not appear. Rows are ordered by excess descending, then
    /// by customer id for a stable ordering.
    pub fn exceeded_usage_report(&self) -> Vec<UsageReportRow> {
        let mut rows: Vec<UsageReportRow> = self
            .customer_snapshot()
            .into_iter()
            .filter_map(|customer| {
                let sub = self
                    .subscriptions
                    .get(&customer.id)
                    .map(|entry| entry.value().clone())?;
                if sub.data_used_gb <= sub.data_cap_gb {
                    return None;
                }
                let excess = (sub.data_used_gb - sub.data_cap_gb).round_dp(REPORT_SCALE);
                let avg_daily = if sub.days_active > 0 {
                    (sub.data_used_gb / Decimal::from(sub.days_active)).round_dp(REPORT_SCALE)
                } else {
                    Decimal::ZERO
                };
                Some(UsageReportRow {
                    customer_id: customer.id,
                    customer_name: format!("{} {}", customer.first_name, customer.last_name),
                    tariff_name: sub.tariff_name,
                    tariff_speed_mbps: sub.tariff_speed_mbps,
                    total_data_used_gb: sub.data_used_gb.round_dp(REPORT_SCALE),
                    excess_data_gb: excess,
                    days_active: sub.days_active,
                    avg_daily_usage_gb: avg_daily,
                    subscription_status: if customer.active {
                        "Active".to_string()
                    } else {
                        "Inactive".to_string()
                    },
                })
            })
            .collect();

        rows.sort_by(|a, b| {
            b.excess_data_gb
                .cmp(&a.excess_data_gb)
                .then(a.customer_id.cmp(&b.customer_id))
        });
        rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use datacap_core::types::{Customer, Subscription};

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn customer(id: u32, first: &str, active: bool) -> Customer {
        Customer {
            id,
            first_name: first.into(),
            last_name: "Test".into(),
            email: format!("{}@example.com", first.to_lowercase()),
            phone: "5550100".into(),
            address: "1 Main St".into(),
            active,
        }
    }

    fn sub(cap: &str, used: &str, days: u32) -> Subscription {
        Subscription {
            tariff_name: "Fibre 100".into(),
            tariff_speed_mbps: 100,
            data_cap_gb: dec(cap),
            data_used_gb: dec(used),
            days_active: days,
        }
    }

    #[test]
    fn only_exceeders_appear() {
        let dir = CustomerDirectory::new();
        dir.insert(customer(1, "Over", true)).unwrap();
        dir.insert(customer(2, "Under", true)).unwrap();
        dir.insert(customer(3, "NoSub", true)).unwrap();
        dir.set_subscription(1, sub("500", "612.5", 25)).unwrap();
        dir.set_subscription(2, sub("500", "499.99", 25)).unwrap();

        let rows = dir.exceeded_usage_report();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].customer_id, 1);
    }

    #[test]
    fn excess_and_average_are_two_decimal_figures() {
        let dir = CustomerDirectory::new();
        dir.insert(customer(1, "Over", true)).unwrap();
        dir.set_subscription(1, sub("500", "612.505", 25)).unwrap();

        let rows = dir.exceeded_usage_report();
        assert_eq!(rows[0].excess_data_gb, dec("112.50"));
        assert_eq!(rows[0].avg_daily_usage_gb, dec("24.50"));
        assert_eq!(rows[0].total_data_used_gb, dec("612.50"));
    }

    #[test]
    fn rows_are_ordered_by_excess_descending() {
        let dir = CustomerDirectory::new();
        dir.insert(customer(1, "Small", true)).unwrap();
        dir.insert(customer(2, "Large", false)).unwrap();
        dir.set_subscription(1, sub("500", "510", 10)).unwrap();
        dir.set_subscription(2, sub("500", "700", 10)).unwrap();

        let rows = dir.exceeded_usage_report();
        let ids: Vec<u32> = rows.iter().map(|r| r.customer_id).collect();
        assert_eq!(ids, vec![2, 1]);
        assert_eq!(rows[0].subscription_status, "Inactive");
        assert_eq!(rows[1].subscription_status, "Active");
    }

    #[test]
    fn zero_active_days_does_not_divide() {
        let dir = CustomerDirectory::new();
        dir.insert(customer(1, "Fresh", true)).unwrap();
        dir.set_subscription(1, sub("500", "501", 0)).unwrap();

        let rows = dir.exceeded_usage_report();
        assert_eq!(rows[0].avg_daily_usage_gb, Decimal::ZERO);
    }
}
