// Property-based tests for schedule timing

use chrono::{Datelike, Duration, TimeZone, Utc};
use common::schedule::{Recurrence, ScheduleTiming};
use proptest::prelude::*;

fn interval_timing(every_seconds: u32) -> ScheduleTiming {
    ScheduleTiming {
        recurrence: Recurrence::Interval { every_seconds },
        from: None,
        until: None,
        days: None,
    }
}

proptest! {
    /// *For any* interval, a schedule that has never run is due whenever its
    /// window allows it.
    #[test]
    fn property_never_run_is_due(every_seconds in 1u32..1_000_000u32) {
        let timing = interval_timing(every_seconds);
        prop_assert!(timing.is_due(None, Utc::now()).unwrap());
    }

    /// *For any* elapsed time shorter than the interval, the schedule is not
    /// due; for any elapsed time at or past it, it is.
    #[test]
    fn property_interval_elapse_boundary(
        every_seconds in 2u32..1_000_000u32,
        elapsed_fraction in 0.0f64..2.0f64,
    ) {
        let timing = interval_timing(every_seconds);
        let now = Utc::now();
        let elapsed = (every_seconds as f64 * elapsed_fraction) as i64;
        let last = now - Duration::seconds(elapsed);

        let due = timing.is_due(Some(last), now).unwrap();
        prop_assert_eq!(due, elapsed >= every_seconds as i64);
    }

    /// *For any* `until` in the past, the timing is expired and never due.
    #[test]
    fn property_past_until_means_expired(
        every_seconds in 1u32..100_000u32,
        hours_past in 1i64..10_000i64,
    ) {
        let mut timing = interval_timing(every_seconds);
        let now = Utc::now();
        timing.until = Some(now - Duration::hours(hours_past));

        prop_assert!(timing.is_expired(now));
        prop_assert!(!timing.is_due(None, now).unwrap());
    }

    /// *For any* day mask, the schedule is due only when today's bit is set.
    #[test]
    fn property_day_mask_gates_due(mask in 0u8..128u8) {
        let timing = ScheduleTiming {
            recurrence: Recurrence::Interval { every_seconds: 1 },
            from: None,
            until: None,
            days: Some(mask),
        };
        let now = Utc::now();
        let today_bit = 1u8 << now.weekday().num_days_from_monday();

        let due = timing.is_due(None, now).unwrap();
        prop_assert_eq!(due, mask & today_bit != 0);
    }

    /// *For any* daily-noon cron schedule, due-ness is equivalent to "a noon
    /// lies between the last run and now".
    #[test]
    fn property_daily_cron_fires_once_per_day(last_hour in 0u32..24u32, now_hour in 0u32..24u32) {
        let timing = ScheduleTiming {
            recurrence: Recurrence::Cron {
                expression: "0 0 12 * * * *".to_string(),
                timezone: chrono_tz::UTC,
            },
            from: None,
            until: None,
            days: None,
        };
        let last = Utc.with_ymd_and_hms(2026, 3, 2, last_hour, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 3, 2, now_hour, 0, 0).unwrap();
        prop_assume!(last <= now);

        let due = timing.is_due(Some(last), now).unwrap();
        prop_assert_eq!(due, last_hour < 12 && now_hour >= 12);
    }
}
