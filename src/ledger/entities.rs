use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::{normalize, Category, CategoryOverrides};

use super::error::LedgerError;

/// Breakdown of a domain's time for a single URL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UrlRecord {
    pub title: String,
    pub total_time: u64,
    pub visit_count: u64,
}

/// Lifetime statistics of a single normalized domain. The domain itself is the key of
/// [Ledger::domains].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DomainRecord {
    /// Seconds, always the sum of `urls[*].total_time`.
    pub total_time: u64,
    pub visit_count: u64,
    /// Epoch milliseconds of the latest visit.
    pub last_visit: i64,
    /// Cached result of the classifier. Overrides are the source of truth.
    pub category: Category,
    pub urls: BTreeMap<String, UrlRecord>,
}

impl DomainRecord {
    /// A record without any time, used for domains that only exist in the override map.
    pub fn placeholder(category: Category, last_visit: i64) -> Self {
        Self {
            category,
            last_visit,
            ..Default::default()
        }
    }

    /// Folds another record of the same domain into this one. Times add up, the latest visit
    /// wins, and URL entries merge with the incoming title taking precedence.
    pub fn absorb(&mut self, other: DomainRecord) {
        self.total_time = self.total_time.saturating_add(other.total_time);
        self.visit_count = self.visit_count.saturating_add(other.visit_count);
        self.last_visit = self.last_visit.max(other.last_visit);
        for (url, incoming) in other.urls {
            let entry = self.urls.entry(url).or_default();
            if !incoming.title.is_empty() {
                entry.title = incoming.title;
            }
            entry.total_time = entry.total_time.saturating_add(incoming.total_time);
            entry.visit_count = entry.visit_count.saturating_add(incoming.visit_count);
        }
    }
}

/// Totals for one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DayRecord {
    pub total_time: u64,
    /// Seconds spent on each domain during the day.
    pub domains: BTreeMap<String, u64>,
    pub productive: u64,
    pub neutral: u64,
    pub distracting: u64,
}

impl DayRecord {
    pub fn bucket(&self, category: Category) -> u64 {
        match category {
            Category::Productive => self.productive,
            Category::Neutral => self.neutral,
            Category::Distracting => self.distracting,
        }
    }

    pub fn bucket_mut(&mut self, category: Category) -> &mut u64 {
        match category {
            Category::Productive => &mut self.productive,
            Category::Neutral => &mut self.neutral,
            Category::Distracting => &mut self.distracting,
        }
    }

    pub fn categorized_time(&self) -> u64 {
        self.productive
            .saturating_add(self.neutral)
            .saturating_add(self.distracting)
    }
}

/// The whole persisted aggregation state. Field names follow the storage keys the browser
/// extension has always used, so existing dumps load as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Ledger {
    #[serde(rename = "timeTracking")]
    pub domains: BTreeMap<String, DomainRecord>,
    /// Keyed by [day_key](crate::utils::time::day_key).
    #[serde(rename = "dailyStats")]
    pub days: BTreeMap<String, DayRecord>,
    #[serde(rename = "domainCategories")]
    pub overrides: CategoryOverrides,
}

/// Longest time a single report may carry.
pub const MAX_VISIT_SECONDS: u64 = 24 * 60 * 60;

/// A single report of time spent on a page, as sent by the browser side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VisitEvent {
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub title: String,
    /// Seconds. Signed so that bogus negative values can be rejected instead of failing to
    /// parse.
    pub time_spent: i64,
    /// Epoch milliseconds. Missing timestamps are filled with the current time.
    #[serde(default)]
    pub timestamp: Option<i64>,
}

/// A [VisitEvent] that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Visit {
    pub domain: String,
    pub url: String,
    pub title: String,
    pub seconds: u64,
    pub timestamp: i64,
}

impl VisitEvent {
    /// Validates the event and normalizes its domain. `now_ms` is used when the event carries
    /// no timestamp.
    pub fn into_visit(self, now_ms: i64) -> Result<Visit, LedgerError> {
        let domain = normalize(&self.domain);
        if domain.is_empty() {
            return Err(LedgerError::InvalidEvent(format!(
                "missing domain for url {:?}",
                self.url
            )));
        }
        let seconds = u64::try_from(self.time_spent).map_err(|_| {
            LedgerError::InvalidEvent(format!(
                "negative time spent {} on {domain}",
                self.time_spent
            ))
        })?;
        if seconds > MAX_VISIT_SECONDS {
            return Err(LedgerError::InvalidEvent(format!(
                "time spent {seconds}s on {domain} is longer than a day"
            )));
        }
        // The url map needs a key, pages without one are accounted to the domain itself.
        let url = if self.url.is_empty() {
            domain.clone()
        } else {
            self.url
        };
        Ok(Visit {
            domain,
            url,
            title: self.title,
            seconds,
            timestamp: self.timestamp.unwrap_or(now_ms),
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::{domain::Category, ledger::error::LedgerError};

    use super::{DomainRecord, Ledger, UrlRecord, VisitEvent, MAX_VISIT_SECONDS};

    #[test]
    fn parses_extension_storage_dump() {
        let dump = r#"{
            "timeTracking": {
                "github.com": {
                    "totalTime": 180,
                    "visitCount": 2,
                    "lastVisit": 1700000000000,
                    "category": "productive",
                    "urls": {
                        "https://github.com/": { "title": "GitHub", "totalTime": 180, "visitCount": 2 }
                    }
                }
            },
            "dailyStats": {
                "Mon Oct 19 2026": { "totalTime": 180, "domains": { "github.com": 180 }, "productive": 180 }
            }
        }"#;
        let ledger: Ledger = serde_json::from_str(dump).unwrap();
        assert_eq!(ledger.domains["github.com"].total_time, 180);
        assert_eq!(ledger.domains["github.com"].category, Category::Productive);
        let day = &ledger.days["Mon Oct 19 2026"];
        assert_eq!(day.productive, 180);
        assert_eq!(day.neutral, 0);
        assert!(ledger.overrides.is_empty());

        let value = serde_json::to_value(&ledger).unwrap();
        assert!(value.get("domainCategories").is_some());
        assert_eq!(
            value["timeTracking"]["github.com"]["visitCount"],
            serde_json::json!(2)
        );
    }

    #[test]
    fn absorb_merges_totals_and_urls() {
        let mut record = DomainRecord {
            total_time: 10,
            visit_count: 1,
            last_visit: 5,
            category: Category::Neutral,
            urls: [(
                "https://a.com/".to_string(),
                UrlRecord {
                    title: "Old".into(),
                    total_time: 10,
                    visit_count: 1,
                },
            )]
            .into(),
        };
        record.absorb(DomainRecord {
            total_time: 30,
            visit_count: 2,
            last_visit: 3,
            category: Category::Distracting,
            urls: [
                (
                    "https://a.com/".to_string(),
                    UrlRecord {
                        title: "New".into(),
                        total_time: 20,
                        visit_count: 1,
                    },
                ),
                (
                    "https://a.com/x".to_string(),
                    UrlRecord {
                        title: "X".into(),
                        total_time: 10,
                        visit_count: 1,
                    },
                ),
            ]
            .into(),
        });

        assert_eq!(record.total_time, 40);
        assert_eq!(record.visit_count, 3);
        assert_eq!(record.last_visit, 5);
        assert_eq!(record.urls["https://a.com/"].title, "New");
        assert_eq!(record.urls["https://a.com/"].total_time, 30);
        assert_eq!(
            record.urls.values().map(|u| u.total_time).sum::<u64>(),
            record.total_time
        );
    }

    #[test]
    fn rejects_invalid_events() {
        let event = VisitEvent {
            url: "https://a.com".into(),
            domain: "".into(),
            title: "".into(),
            time_spent: 10,
            timestamp: Some(1),
        };
        assert!(matches!(
            event.into_visit(0),
            Err(LedgerError::InvalidEvent(_))
        ));

        let event = VisitEvent {
            url: "https://a.com".into(),
            domain: "a.com".into(),
            title: "".into(),
            time_spent: -1,
            timestamp: Some(1),
        };
        assert!(matches!(
            event.into_visit(0),
            Err(LedgerError::InvalidEvent(_))
        ));
    }

    #[test]
    fn rejects_reports_longer_than_a_day() {
        let event = |time_spent| VisitEvent {
            url: "https://a.com".into(),
            domain: "a.com".into(),
            title: "".into(),
            time_spent,
            timestamp: Some(1),
        };
        assert!(matches!(
            event(i64::MAX).into_visit(0),
            Err(LedgerError::InvalidEvent(_))
        ));
        assert!(matches!(
            event(MAX_VISIT_SECONDS as i64 + 1).into_visit(0),
            Err(LedgerError::InvalidEvent(_))
        ));
        assert_eq!(
            event(MAX_VISIT_SECONDS as i64).into_visit(0).unwrap().seconds,
            MAX_VISIT_SECONDS
        );
    }

    #[test]
    fn absorb_saturates() {
        let mut record = DomainRecord {
            total_time: u64::MAX - 1,
            visit_count: 1,
            ..Default::default()
        };
        record.absorb(DomainRecord {
            total_time: 10,
            visit_count: u64::MAX,
            ..Default::default()
        });
        assert_eq!(record.total_time, u64::MAX);
        assert_eq!(record.visit_count, u64::MAX);
    }

    #[test]
    fn visit_defaults() {
        let event: VisitEvent =
            serde_json::from_str(r#"{"domain": "WWW.A.com", "timeSpent": 4}"#).unwrap();
        let visit = event.into_visit(99).unwrap();
        assert_eq!(visit.domain, "a.com");
        assert_eq!(visit.url, "a.com");
        assert_eq!(visit.seconds, 4);
        assert_eq!(visit.timestamp, 99);
    }
}
