use chrono::{Days, NaiveDate};

/// Format of day keys, the same one `Date.prototype.toDateString` produces in the browser.
const DAY_KEY_FORMAT: &str = "%a %b %d %Y";

/// This is the standard way of converting a date into a key of
/// [Ledger::days](crate::ledger::entities::Ledger::days).
pub fn day_key(date: NaiveDate) -> String {
    date.format(DAY_KEY_FORMAT).to_string()
}

/// Parses a day key back into a date. ISO dates are accepted as well, since hand-edited or
/// foreign dumps tend to use them.
pub fn parse_day_key(key: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(key.trim(), DAY_KEY_FORMAT)
        .or_else(|_| NaiveDate::parse_from_str(key.trim(), "%Y-%m-%d"))
        .ok()
}

/// Three letter weekday label, e.g. `Mon`.
pub fn weekday_label(date: NaiveDate) -> String {
    date.format("%a").to_string()
}

/// `None` when the result falls before the earliest representable date.
pub fn days_before(date: NaiveDate, days: u32) -> Option<NaiveDate> {
    date.checked_sub_days(Days::new(days.into()))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::{day_key, days_before, parse_day_key, weekday_label};

    #[test]
    fn day_key_matches_browser_format() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 5).unwrap();
        assert_eq!(day_key(date), "Mon Oct 05 2026");
        assert_eq!(weekday_label(date), "Mon");
        assert_eq!(parse_day_key("Mon Oct 05 2026"), Some(date));
        assert_eq!(parse_day_key("2026-10-05"), Some(date));
        assert_eq!(parse_day_key("yesterday"), None);
    }

    #[test]
    fn days_before_crosses_months() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(
            days_before(date, 1),
            NaiveDate::from_ymd_opt(2026, 2, 28)
        );
    }

    #[test]
    fn days_before_out_of_range() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        assert_eq!(days_before(date, u32::MAX), None);
    }
}
