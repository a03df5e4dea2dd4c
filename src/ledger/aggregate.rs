//! Pure aggregation over a [Ledger]. Nothing here touches storage, the
//! [TimeLedger](super::TimeLedger) service wraps these operations into persisted cycles.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::{
    domain::{normalize, CategoryClassifier, CategoryOverrides},
    utils::time::{days_before, parse_day_key},
};

use super::entities::{DayRecord, DomainRecord, Ledger, UrlRecord, Visit};

/// Outcome of [Ledger::reanalyze].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReanalyzeReport {
    /// Domains whose cached category changed.
    pub recategorized: usize,
    /// Override-only domains that received an empty record.
    pub placeholders: usize,
    /// Seconds referenced by day records whose domain is missing from the ledger.
    pub skipped_seconds: u64,
}

/// Outcome of [Ledger::prune_days].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PruneReport {
    /// Day records past the horizon.
    pub expired: usize,
    /// Day records whose key could not be read as a date.
    pub unreadable: usize,
}

impl PruneReport {
    pub fn removed(&self) -> usize {
        self.expired + self.unreadable
    }
}

impl Ledger {
    /// Adds a visit to the lifetime record of its domain and to the record of `day`.
    pub fn record_visit(&mut self, visit: &Visit, classifier: &CategoryClassifier, day: &str) {
        let overrides = &self.overrides;
        let record = self
            .domains
            .entry(visit.domain.clone())
            .or_insert_with(|| DomainRecord {
                last_visit: visit.timestamp,
                category: classifier.classify(&visit.domain, overrides),
                ..Default::default()
            });

        record.total_time = record.total_time.saturating_add(visit.seconds);
        record.visit_count = record.visit_count.saturating_add(1);
        record.last_visit = record.last_visit.max(visit.timestamp);

        let url = record
            .urls
            .entry(visit.url.clone())
            .or_insert_with(|| UrlRecord {
                title: visit.title.clone(),
                ..Default::default()
            });
        if url.title.is_empty() {
            url.title = visit.title.clone();
        }
        url.total_time = url.total_time.saturating_add(visit.seconds);
        url.visit_count = url.visit_count.saturating_add(1);

        let category = record.category;
        let day = self.days.entry(day.to_string()).or_default();
        day.total_time = day.total_time.saturating_add(visit.seconds);
        let domain_time = day.domains.entry(visit.domain.clone()).or_default();
        *domain_time = domain_time.saturating_add(visit.seconds);
        let bucket = day.bucket_mut(category);
        *bucket = bucket.saturating_add(visit.seconds);
    }

    /// Replaces the override map and re-derives every cached category and every day bucket
    /// from it. `now_ms` becomes the last visit of newly created placeholders.
    pub fn reanalyze(
        &mut self,
        overrides: CategoryOverrides,
        classifier: &CategoryClassifier,
        now_ms: i64,
    ) -> ReanalyzeReport {
        let mut report = ReanalyzeReport::default();

        self.overrides = normalize_overrides(overrides);

        for (domain, record) in self.domains.iter_mut() {
            let category = classifier.classify(domain, &self.overrides);
            if category != record.category {
                debug!(
                    "Recategorizing {domain} from {} to {category}",
                    record.category
                );
                record.category = category;
                report.recategorized += 1;
            }
        }

        for (domain, category) in &self.overrides {
            if !self.domains.contains_key(domain) {
                debug!("Creating placeholder for {domain} as {category}");
                self.domains
                    .insert(domain.clone(), DomainRecord::placeholder(*category, now_ms));
                report.placeholders += 1;
            }
        }

        report.skipped_seconds = self.recompute_day_buckets();
        report
    }

    /// Recomputes the category buckets of every day from its per-domain seconds and the current
    /// cached categories. Domains unknown to the ledger are left out of the buckets. Returns the
    /// number of seconds left out.
    pub fn recompute_day_buckets(&mut self) -> u64 {
        let mut skipped = 0u64;
        for (key, day) in self.days.iter_mut() {
            let mut buckets = DayRecord::default();
            for (domain, seconds) in &day.domains {
                match self.domains.get(domain) {
                    Some(record) => {
                        let bucket = buckets.bucket_mut(record.category);
                        *bucket = bucket.saturating_add(*seconds);
                    }
                    None => {
                        warn!(
                            "Day {key} references unknown domain {domain}, excluding {seconds}s from categories"
                        );
                        skipped = skipped.saturating_add(*seconds);
                    }
                }
            }
            day.productive = buckets.productive;
            day.neutral = buckets.neutral;
            day.distracting = buckets.distracting;
        }
        skipped
    }

    /// Drops day records strictly older than `horizon_days` before `today`, and records whose
    /// key is not a date at all. A horizon reaching past the calendar keeps every dated record.
    pub fn prune_days(&mut self, today: NaiveDate, horizon_days: u32) -> PruneReport {
        let cutoff = days_before(today, horizon_days);
        let mut report = PruneReport::default();
        self.days.retain(|key, _| match (parse_day_key(key), cutoff) {
            (Some(date), Some(cutoff)) if date < cutoff => {
                report.expired += 1;
                false
            }
            (Some(_), _) => true,
            (None, _) => {
                warn!("Dropping day record with unreadable date {key:?}");
                report.unreadable += 1;
                false
            }
        });
        report
    }

    /// Forgets all recorded time. Overrides are kept.
    pub fn clear_activity(&mut self) {
        self.domains.clear();
        self.days.clear();
    }
}

/// Re-keys an override map by normalized domain. When several raw keys collapse into one, the
/// last one in iteration order wins.
pub fn normalize_overrides(overrides: CategoryOverrides) -> CategoryOverrides {
    let mut normalized = CategoryOverrides::new();
    for (domain, category) in overrides {
        let key = normalize(&domain);
        if key.is_empty() {
            warn!("Ignoring category override with empty domain {domain:?}");
            continue;
        }
        if let Some(previous) = normalized.insert(key.clone(), category) {
            if previous != category {
                debug!("Override {domain} ({category}) replaces {previous} for {key}");
            }
        }
    }
    normalized
}
