use chrono::{DateTime, Duration, TimeZone, Timelike};

/// Computes the next instant whose minute is a multiple of 15 and whose seconds are zero,
/// strictly after `now`, plus the time left until it. An input sitting exactly on a boundary
/// advances to the following one, so a caller polling at the boundary itself can't re-trigger
/// for the same instant. Rolls over hour and day edges through plain instant arithmetic, which
/// also keeps it correct across DST shifts.
pub fn next_boundary<Tz: TimeZone>(now: &DateTime<Tz>) -> (DateTime<Tz>, Duration) {
    let into_quarter = Duration::minutes((now.minute() % 15) as i64)
        + Duration::seconds(now.second() as i64)
        + Duration::nanoseconds(now.nanosecond() as i64);
    let boundary = now.clone() - into_quarter + Duration::minutes(15);
    let wait = boundary.clone() - now.clone();
    (boundary, wait)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, TimeZone, Timelike, Utc};

    use super::next_boundary;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, h, m, s).unwrap()
    }

    #[test]
    fn test_rounds_up_to_quarter() {
        let (boundary, wait) = next_boundary(&at(14, 7, 30));
        assert_eq!(boundary, at(14, 15, 0));
        assert_eq!(wait, Duration::seconds(7 * 60 + 30));
    }

    #[test]
    fn test_exact_boundary_advances() {
        let (boundary, wait) = next_boundary(&at(14, 15, 0));
        assert_eq!(boundary, at(14, 30, 0));
        assert_eq!(wait, Duration::minutes(15));
    }

    #[test]
    fn test_rolls_over_hour_and_day() {
        let (boundary, _) = next_boundary(&at(14, 59, 59));
        assert_eq!(boundary, at(15, 0, 0));

        let (boundary, wait) = next_boundary(&at(23, 58, 0));
        assert_eq!(boundary, Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap());
        assert_eq!(wait, Duration::minutes(2));
    }

    #[test]
    fn test_boundary_is_always_aligned_and_in_the_future() {
        for hour in [0, 7, 23] {
            for minute in 0..60 {
                for second in [0, 1, 30, 59] {
                    let now = at(hour, minute, second);
                    let (boundary, wait) = next_boundary(&now);
                    assert!(boundary > now);
                    assert_eq!(boundary.minute() % 15, 0);
                    assert_eq!(boundary.second(), 0);
                    assert_eq!(boundary.nanosecond(), 0);
                    assert_eq!(boundary - now, wait);
                    assert!(wait <= Duration::minutes(15));
                }
            }
        }
    }

    #[test]
    fn test_sub_second_input_still_lands_on_whole_second() {
        let now = at(9, 3, 20) + Duration::milliseconds(250);
        let (boundary, _) = next_boundary(&now);
        assert_eq!(boundary, at(9, 15, 0));
    }
}
