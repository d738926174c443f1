use chrono::{DateTime, SecondsFormat, Utc};
use chrono_tz::Tz;

// Dashboard dates are keyed to Brazilian civil time regardless of where the
// service runs.
pub const MARKET_TIMEZONE: Tz = chrono_tz::America::Sao_Paulo;

/// Injectable time source so date-keyed logic is testable.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock pinned to one instant, for tests.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Today's history key: the current São Paulo calendar day as `DD/MM`.
pub fn today_key(clock: &dyn Clock) -> String {
    clock
        .now()
        .with_timezone(&MARKET_TIMEZONE)
        .format("%d/%m")
        .to_string()
}

/// ISO-8601 timestamp with millisecond precision, e.g.
/// `2025-05-10T12:00:00.000Z`.
pub fn iso_timestamp(clock: &dyn Clock) -> String {
    clock.now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn today_key_is_zero_padded_day_month() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 5, 10, 15, 0, 0).unwrap());
        assert_eq!(today_key(&clock), "10/05");
    }

    #[test]
    fn today_key_uses_sao_paulo_civil_time() {
        // 01:30 UTC is still the previous evening in São Paulo (UTC-3).
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 5, 10, 1, 30, 0).unwrap());
        assert_eq!(today_key(&clock), "09/05");
    }

    #[test]
    fn iso_timestamp_has_millis_and_zulu_suffix() {
        let clock = FixedClock(Utc.with_ymd_and_hms(2025, 5, 10, 12, 0, 0).unwrap());
        assert_eq!(iso_timestamp(&clock), "2025-05-10T12:00:00.000Z");
    }
}
