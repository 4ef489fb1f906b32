//! Demo dataset for the customer-facing subcommands.
//!
//! The store is in-memory and lives for one CLI invocation, so the listing
//! and report subcommands seed a small fixed dataset first.

use datacap_core::types::{Customer, Subscription};
use datacap_store::CustomerDirectory;
use rust_decimal::Decimal;

fn dec(s: &str) -> Decimal {
    s.parse().unwrap_or(Decimal::ZERO)
}

/// Build the directory used by `datacap customers` and `datacap report`.
pub fn demo_directory() -> CustomerDirectory {
    let dir = CustomerDirectory::new();
    let rows: [(u32, &str, &str, &str, bool, &str, u32, &str, &str, u32); 8] = [
        (1, "Alice", "Archer", "5550101", true, "Fibre 300", 300, "750", "918.40", 27),
        (2, "Albert", "Brook", "5550102", true, "Fibre 100", 100, "500", "433.10", 30),
        (3, "Bella", "Archer", "5550103", false, "ADSL 24", 24, "250", "251.25", 14),
        (4, "Carol", "Chen", "5550104", true, "Fibre 100", 100, "500", "612.50", 25),
        (5, "Dmitri", "Ivanov", "5550105", true, "Fibre 1000", 1000, "2000", "1730.00", 29),
        (6, "Erin", "Okafor", "5550106", true, "Fibre 300", 300, "750", "750.00", 30),
        (7, "Farid", "Haddad", "5550107", false, "ADSL 24", 24, "250", "310.75", 30),
        (8, "Grace", "Lindqvist", "5550108", true, "Fibre 100", 100, "500", "98.60", 8),
    ];

    for (id, first, last, phone, active, tariff, speed, cap, used, days) in rows {
        let customer = Customer {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            email: format!(
                "{}.{}@example.net",
                first.to_lowercase(),
                last.to_lowercase()
            ),
            phone: phone.to_string(),
            address: format!("{id} Harbour Road"),
            active,
        };
        // The seed rows are well-formed by construction.
        if dir.insert(customer).is_ok() {
            let _ = dir.set_subscription(
                id,
                Subscription {
                    tariff_name: tariff.to_string(),
                    tariff_speed_mbps: speed,
                    data_cap_gb: dec(cap),
                    data_used_gb: dec(used),
                    days_active: days,
                },
            );
        }
    }
    dir
}
