use chrono::{DateTime, Duration, Local, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

/// This is the standard way of converting a date to a string in quarterlog. Day files and report
/// snapshots are both named with it.
pub fn date_to_record_name(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Returns start of the next day.
pub fn next_day_start<Tz: TimeZone>(date: DateTime<Tz>) -> DateTime<Tz> {
    (date + Duration::days(1)).with_time(NaiveTime::MIN).unwrap()
}

/// Local calendar day an instant belongs to. Day files are partitioned by this, not by the UTC
/// date of the stored timestamp.
pub fn local_date(instant: DateTime<Utc>) -> NaiveDate {
    instant.with_timezone(&Local).date_naive()
}

/// UTC range covering a local calendar day, [midnight, next midnight).
pub fn local_day_bounds(date: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = Local
        .from_local_datetime(&date.and_time(NaiveTime::MIN))
        .earliest()
        .expect("Local midnight should exist");
    (start.to_utc(), next_day_start(start).to_utc())
}

/// Floors an instant to its quarter-hour and formats it as "YYYY-MM-DD HH:MM" in local time.
/// Used as the dedup key preventing two entries for one boundary; carrying the date keeps keys
/// of different days distinct no matter how long the process was suspended.
pub fn quarter_key(instant: DateTime<Utc>) -> String {
    let local = instant.with_timezone(&Local);
    format!(
        "{} {:02}:{:02}",
        local.date_naive().format("%Y-%m-%d"),
        local.hour(),
        local.minute() / 15 * 15
    )
}

#[cfg(test)]
mod tests {
    use chrono::{Local, TimeZone};

    use super::{date_to_record_name, quarter_key};

    #[test]
    fn test_record_name() {
        let date = chrono::NaiveDate::from_ymd_opt(2024, 1, 7).unwrap();
        assert_eq!(date_to_record_name(date), "2024-01-07");
    }

    #[test]
    fn test_quarter_key_floors_to_boundary() {
        // Instants are built from local time so the expected keys hold in any timezone.
        let at = |h, m, s| {
            Local
                .with_ymd_and_hms(2024, 1, 7, h, m, s)
                .single()
                .unwrap()
                .to_utc()
        };
        assert_eq!(quarter_key(at(9, 0, 0)), "2024-01-07 09:00");
        assert_eq!(quarter_key(at(9, 14, 59)), "2024-01-07 09:00");
        assert_eq!(quarter_key(at(9, 15, 0)), "2024-01-07 09:15");
        assert_eq!(quarter_key(at(23, 59, 59)), "2024-01-07 23:45");
    }
}
