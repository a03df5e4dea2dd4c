use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::Serialize;

use crate::ledger::entities::Ledger;

use super::{time_stats, TimeStats};

pub const EXTENSION_NAME: &str = "Smart Tabs";

/// The document users download from the analytics page: the `getTimeStats` payload, the raw
/// ledger and some metadata about the export itself.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument<'a> {
    pub export_date: String,
    pub extension_name: &'static str,
    pub version: &'static str,
    #[serde(flatten)]
    pub stats: TimeStats,
    #[serde(flatten)]
    pub ledger: &'a Ledger,
}

pub fn export_document(
    ledger: &Ledger,
    today: NaiveDate,
    now: DateTime<Utc>,
    top: usize,
) -> ExportDocument<'_> {
    ExportDocument {
        export_date: now.to_rfc3339_opts(SecondsFormat::Millis, true),
        extension_name: EXTENSION_NAME,
        version: env!("CARGO_PKG_VERSION"),
        stats: time_stats(ledger, today, top),
        ledger,
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};

    use crate::{
        domain::{Category, CategoryOverrides},
        ledger::entities::{DomainRecord, Ledger},
    };

    use super::export_document;

    #[test]
    fn export_contains_stats_ledger_and_metadata() {
        let mut ledger = Ledger::default();
        ledger.domains.insert(
            "a.com".into(),
            DomainRecord {
                total_time: 5,
                ..Default::default()
            },
        );
        ledger.overrides = CategoryOverrides::from([("a.com".into(), Category::Productive)]);
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 8, 30, 0).unwrap();

        let value = serde_json::to_value(export_document(&ledger, today, now, 10)).unwrap();

        assert_eq!(value["exportDate"], "2026-10-19T08:30:00.000Z");
        assert_eq!(value["version"], env!("CARGO_PKG_VERSION"));
        assert_eq!(value["totalDomains"], 1);
        assert_eq!(value["weekStats"].as_array().unwrap().len(), 7);
        assert_eq!(value["timeTracking"]["a.com"]["totalTime"], 5);
        assert_eq!(value["domainCategories"]["a.com"], "productive");
        assert!(value["dailyStats"].is_object());
    }
}
