//! Older versions of the extension keyed records by the raw hostname, so `www.github.com` and
//! `github.com` lived side by side. The migration re-keys everything by [normalize]d domain.

use std::{collections::BTreeMap, mem};

use tracing::info;

use crate::domain::{normalize, CategoryOverrides};

use super::entities::{DomainRecord, Ledger};

/// What a [migrate] run changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MigrationReport {
    pub domains: usize,
    pub overrides: usize,
    pub day_entries: usize,
}

impl MigrationReport {
    pub fn changed(&self) -> bool {
        self.domains + self.overrides + self.day_entries > 0
    }
}

/// Re-keys domain records, overrides and per-day domain entries by normalized domain, merging
/// entries that collapse into the same key. Running it on a normalized ledger changes nothing.
pub fn migrate(ledger: &mut Ledger) -> MigrationReport {
    let mut report = MigrationReport::default();

    let mut domains = BTreeMap::<String, DomainRecord>::new();
    for (raw, record) in mem::take(&mut ledger.domains) {
        let key = normalize(&raw);
        if key != raw {
            info!("Migrating domain {raw} -> {key}");
            report.domains += 1;
        }
        match domains.get_mut(&key) {
            Some(existing) => existing.absorb(record),
            None => {
                domains.insert(key, record);
            }
        }
    }
    ledger.domains = domains;

    let mut overrides = CategoryOverrides::new();
    for (raw, category) in mem::take(&mut ledger.overrides) {
        let key = normalize(&raw);
        if key != raw {
            info!("Migrating category {raw} -> {key} ({category})");
            report.overrides += 1;
        }
        overrides.insert(key, category);
    }
    ledger.overrides = overrides;

    for day in ledger.days.values_mut() {
        if day.domains.keys().all(|raw| normalize(raw) == *raw) {
            continue;
        }
        let mut domains = BTreeMap::<String, u64>::new();
        for (raw, seconds) in mem::take(&mut day.domains) {
            let key = normalize(&raw);
            if key != raw {
                report.day_entries += 1;
            }
            let merged = domains.entry(key).or_default();
            *merged = merged.saturating_add(seconds);
        }
        day.domains = domains;
    }

    report
}
