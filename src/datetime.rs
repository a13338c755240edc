//! Date ↔ Excel serial conversion (spec §4.1/§4.11), preserving the
//! historical "1900 was a leap year" bug: day 61 is 1900-03-01, with the
//! fictitious 1900-02-29 occupying day 60.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Timelike};

fn excel_epoch() -> NaiveDate {
    NaiveDate::from_ymd_opt(1899, 12, 31).expect("valid calendar date")
}

fn bug_cutoff() -> NaiveDate {
    NaiveDate::from_ymd_opt(1900, 3, 1).expect("valid calendar date")
}

fn whole_days_to_serial(date: NaiveDate) -> i64 {
    let days = (date - excel_epoch()).num_days();
    if date >= bug_cutoff() {
        days + 1
    } else {
        days
    }
}

fn serial_to_whole_days(serial_days: i64) -> NaiveDate {
    // Serial 60 is the fictitious 1900-02-29; it has no real calendar
    // date, so it folds into 1900-03-01 along with serial 61.
    if serial_days >= 61 {
        excel_epoch() + chrono::Duration::days(serial_days - 1)
    } else {
        excel_epoch() + chrono::Duration::days(serial_days)
    }
}

/// Converts an absolute instant, rendered in `tz`, to its Excel serial
/// day number (whole days since 1899-12-30 plus the fractional time of
/// day).
pub fn to_excel_serial(instant: DateTime<FixedOffset>, tz: FixedOffset) -> f64 {
    let local = instant.with_timezone(&tz);
    let date = local.date_naive();
    let whole = whole_days_to_serial(date);
    let time = local.time();
    let seconds = time.num_seconds_from_midnight() as f64 + time.nanosecond() as f64 / 1e9;
    whole as f64 + seconds / 86_400.0
}

/// Inverse of [`to_excel_serial`]: rebuilds the instant (attributed to
/// `tz`) that a serial day number represents.
pub fn from_excel_serial(serial: f64, tz: FixedOffset) -> DateTime<FixedOffset> {
    let whole = serial.floor() as i64;
    let frac = (serial - whole as f64).clamp(0.0, 1.0 - f64::EPSILON);
    let date = serial_to_whole_days(whole);
    let total_seconds = (frac * 86_400.0).round() as u32;
    let (h, rem) = (total_seconds / 3600, total_seconds % 3600);
    let (m, s) = (rem / 60, rem % 60);
    let time = NaiveTime::from_hms_opt(h.min(23), m.min(59), s.min(59)).unwrap_or(NaiveTime::MIN);
    let naive = NaiveDateTime::new(date, time);
    tz.from_local_datetime(&naive)
        .single()
        .unwrap_or_else(|| tz.from_utc_datetime(&naive))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn utc_offset() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn anchors_match_spec_examples() {
        let tz = utc_offset();
        let jan_1_1900 = tz.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap();
        let mar_1_1900 = tz.with_ymd_and_hms(1900, 3, 1, 0, 0, 0).unwrap();
        assert!((to_excel_serial(jan_1_1900, tz) - 1.0).abs() < 1e-9);
        assert!((to_excel_serial(mar_1_1900, tz) - 61.0).abs() < 1e-9);
    }

    #[test]
    fn round_trip_within_tolerance() {
        let tz = utc_offset();
        let instant = tz.with_ymd_and_hms(2024, 6, 15, 13, 45, 30).unwrap();
        let serial = to_excel_serial(instant, tz);
        let back = from_excel_serial(serial, tz);
        let delta = (back - instant).num_milliseconds().abs();
        assert!(delta < 1000, "round trip drifted by {delta}ms");
    }

    #[test]
    fn serial_round_trip_tolerance_on_the_number_itself() {
        let tz = utc_offset();
        let instant = tz.with_ymd_and_hms(2000, 2, 29, 6, 0, 0).unwrap();
        let serial = to_excel_serial(instant, tz);
        let back_serial = to_excel_serial(from_excel_serial(serial, tz), tz);
        assert!((serial - back_serial).abs() < 1e-4);
    }
}
