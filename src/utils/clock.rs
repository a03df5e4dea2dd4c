use async_trait::async_trait;
use chrono::{DateTime, Local, NaiveDate, Utc};
use tokio::time::Instant;

/// Represents an entity responsible for providing dates across application. This can allow it to
/// be used for testing
#[async_trait]
pub trait Clock: Sync + Send + 'static {
    fn time(&self) -> DateTime<Utc>;

    fn instant(&self) -> Instant;

    async fn sleep_until(&self, instant: Instant);

    /// The calendar day day records are attributed to. Days follow the local timezone, the same
    /// way the browser computes them.
    fn today(&self) -> NaiveDate {
        self.time().with_timezone(&Local).date_naive()
    }

    fn now_millis(&self) -> i64 {
        self.time().timestamp_millis()
    }
}

pub struct DefaultClock;

#[async_trait]
impl Clock for DefaultClock {
    fn time(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }
}

/// Clock frozen at a given moment, with the local day pinned so tests don't depend on the
/// timezone of the machine.
#[cfg(test)]
pub(crate) struct FixedClock {
    pub time: DateTime<Utc>,
    pub today: NaiveDate,
}

#[cfg(test)]
impl FixedClock {
    pub fn on(today: NaiveDate) -> Self {
        use chrono::TimeZone;
        Self {
            time: Utc.from_utc_datetime(&today.and_hms_opt(12, 0, 0).unwrap()),
            today,
        }
    }
}

#[cfg(test)]
#[async_trait]
impl Clock for FixedClock {
    fn time(&self) -> DateTime<Utc> {
        self.time
    }

    fn instant(&self) -> Instant {
        Instant::now()
    }

    async fn sleep_until(&self, instant: Instant) {
        tokio::time::sleep_until(instant).await;
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}
