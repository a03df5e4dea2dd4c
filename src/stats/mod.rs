//! Read-side projections of a [Ledger]. Everything here takes a snapshot by reference and never
//! mutates it; missing data turns into zeroes instead of errors.

pub mod export;

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use tracing::warn;

use crate::{
    domain::Category,
    ledger::entities::{DayRecord, Ledger},
    utils::time::{day_key, weekday_label},
};

/// Category split of a single day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySummary {
    pub total_time: u64,
    pub productive: u64,
    pub neutral: u64,
    pub distracting: u64,
}

impl From<&DayRecord> for DaySummary {
    fn from(day: &DayRecord) -> Self {
        Self {
            total_time: day.total_time,
            productive: day.productive,
            neutral: day.neutral,
            distracting: day.distracting,
        }
    }
}

/// Entry of [top_domains].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainRanking {
    pub domain: String,
    pub total_time: u64,
    pub today_time: u64,
    pub category: Category,
    pub visit_count: u64,
}

/// Entry of [weekly_rollup].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeekDay {
    /// Day key, see [day_key].
    pub date: String,
    /// Three letter weekday, e.g. `Mon`.
    pub day: String,
    #[serde(flatten)]
    pub record: DayRecord,
}

/// Payload of the `getTimeStats` message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeStats {
    pub today: DaySummary,
    pub top_domains: Vec<DomainRanking>,
    pub week_stats: Vec<WeekDay>,
    pub total_domains: usize,
}

pub fn today(ledger: &Ledger, today: NaiveDate) -> DaySummary {
    ledger
        .days
        .get(&day_key(today))
        .map(DaySummary::from)
        .unwrap_or_default()
}

/// The `n` domains with the most lifetime time, most first. Equal times keep the ledger's key
/// order.
pub fn top_domains(ledger: &Ledger, today: NaiveDate, n: usize) -> Vec<DomainRanking> {
    let today_record = ledger.days.get(&day_key(today));
    let mut records = ledger.domains.iter().collect::<Vec<_>>();
    records.sort_by(|(_, a), (_, b)| b.total_time.cmp(&a.total_time));
    records
        .into_iter()
        .take(n)
        .map(|(domain, record)| DomainRanking {
            domain: domain.clone(),
            total_time: record.total_time,
            today_time: today_record
                .and_then(|day| day.domains.get(domain))
                .copied()
                .unwrap_or(0),
            category: record.category,
            visit_count: record.visit_count,
        })
        .collect()
}

/// The seven days ending with `today`, oldest first. Days without records are filled with
/// zeroes.
pub fn weekly_rollup(ledger: &Ledger, today: NaiveDate) -> Vec<WeekDay> {
    (0..7i64)
        .rev()
        .map(|offset| today - Duration::days(offset))
        .map(|date| {
            let key = day_key(date);
            let record = ledger.days.get(&key).cloned().unwrap_or_default();
            for domain in record.domains.keys() {
                if !ledger.domains.contains_key(domain) {
                    warn!("Day {key} references unknown domain {domain}");
                }
            }
            WeekDay {
                day: weekday_label(date),
                date: key,
                record,
            }
        })
        .collect()
}

pub fn total_domains(ledger: &Ledger) -> usize {
    ledger.domains.len()
}

pub fn time_stats(ledger: &Ledger, today_date: NaiveDate, top: usize) -> TimeStats {
    TimeStats {
        today: today(ledger, today_date),
        top_domains: top_domains(ledger, today_date, top),
        week_stats: weekly_rollup(ledger, today_date),
        total_domains: total_domains(ledger),
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, NaiveDate};

    use crate::{
        domain::Category,
        ledger::entities::{DayRecord, DomainRecord, Ledger},
        utils::time::day_key,
    };

    use super::{time_stats, today, top_domains, total_domains, weekly_rollup, DaySummary};

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn domain(total_time: u64) -> DomainRecord {
        DomainRecord {
            total_time,
            visit_count: 1,
            category: Category::Neutral,
            ..Default::default()
        }
    }

    fn ledger() -> Ledger {
        let mut ledger = Ledger::default();
        ledger.domains.insert("c.com".into(), domain(10));
        ledger.domains.insert("a.com".into(), domain(50));
        ledger.domains.insert("b.com".into(), domain(30));
        ledger.days.insert(
            day_key(date()),
            DayRecord {
                total_time: 12,
                domains: [("b.com".to_string(), 12)].into(),
                neutral: 12,
                ..Default::default()
            },
        );
        ledger.days.insert(
            day_key(date() - Duration::days(2)),
            DayRecord {
                total_time: 7,
                domains: [("a.com".to_string(), 7)].into(),
                neutral: 7,
                ..Default::default()
            },
        );
        ledger
    }

    #[test]
    fn top_domains_orders_by_total_time() {
        let ledger = ledger();
        let top = top_domains(&ledger, date(), 2);
        assert_eq!(
            top.iter().map(|d| d.domain.as_str()).collect::<Vec<_>>(),
            ["a.com", "b.com"]
        );
        assert_eq!(top[0].today_time, 0);
        assert_eq!(top[1].today_time, 12);
    }

    #[test]
    fn top_domains_ties_keep_key_order() {
        let mut ledger = Ledger::default();
        for name in ["d.com", "b.com", "c.com"] {
            ledger.domains.insert(name.into(), domain(5));
        }
        let top = top_domains(&ledger, date(), 10);
        assert_eq!(
            top.iter().map(|d| d.domain.as_str()).collect::<Vec<_>>(),
            ["b.com", "c.com", "d.com"]
        );
    }

    #[test]
    fn today_defaults_to_zero() {
        assert_eq!(today(&Ledger::default(), date()), DaySummary::default());
        assert_eq!(today(&ledger(), date()).neutral, 12);
    }

    #[test]
    fn weekly_rollup_covers_seven_days() {
        let ledger = ledger();
        let week = weekly_rollup(&ledger, date());
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, day_key(date() - Duration::days(6)));
        assert_eq!(week[6].date, day_key(date()));
        assert_eq!(week[6].day, "Mon");
        assert_eq!(week[5].day, "Sun");
        assert_eq!(week[4].record.total_time, 7);
        assert_eq!(week[6].record.total_time, 12);
        assert_eq!(week[0].record, DayRecord::default());
    }

    #[test]
    fn weekly_rollup_tolerates_unknown_domains() {
        let mut ledger = ledger();
        ledger.domains.remove("b.com");
        let week = weekly_rollup(&ledger, date());
        assert_eq!(week[6].record.total_time, 12);
    }

    #[test]
    fn projections_leave_the_ledger_alone() {
        let ledger = ledger();
        let before = ledger.clone();
        let stats = time_stats(&ledger, date(), 10);
        assert_eq!(ledger, before);
        assert_eq!(stats.total_domains, total_domains(&ledger));
        assert_eq!(stats.top_domains.len(), 3);

        let value = serde_json::to_value(&stats).unwrap();
        assert!(value["today"]["totalTime"].is_u64());
        assert_eq!(value["weekStats"].as_array().unwrap().len(), 7);
        assert_eq!(value["weekStats"][6]["day"], "Mon");
        assert!(value["weekStats"][6]["domains"].is_object());
        assert_eq!(value["topDomains"][0]["todayTime"], 0);
    }
}
