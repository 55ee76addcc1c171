// Schedule timing: recurrence and validity-window evaluation
//
// Due-ness is computed fresh on every sweep from the item's timing field,
// the persisted last-run timestamp, and the current time. Nothing here is
// cached between sweeps.

use crate::errors::ScheduleError;
use chrono::{DateTime, Datelike, Duration, Utc};
use chrono_tz::Tz;
use cron::Schedule as CronSchedule;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How often a schedule fires, once its validity window allows it
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recurrence {
    /// Fire when at least `every_seconds` have elapsed since the last run
    Interval { every_seconds: u32 },
    /// Fire when a cron fire time has passed since the last run,
    /// evaluated in the schedule's timezone
    Cron {
        expression: String,
        #[serde(default = "default_timezone")]
        timezone: Tz,
    },
}

/// Timing contract of one schedule item: a recurrence constrained by an
/// optional validity window and day-of-week mask.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleTiming {
    pub recurrence: Recurrence,
    /// Not due before this instant
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<DateTime<Utc>>,
    /// Not due after this instant; also drives expiry
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub until: Option<DateTime<Utc>>,
    /// Day-of-week bitmask, bit 0 = Monday; `None` means every day
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub days: Option<u8>,
}

/// Default timezone for cron recurrences
pub fn default_timezone() -> Tz {
    chrono_tz::UTC
}

/// Parse and validate a cron expression
pub fn parse_cron_expression(expression: &str) -> Result<CronSchedule, ScheduleError> {
    CronSchedule::from_str(expression).map_err(|e| ScheduleError::InvalidCronExpression {
        expression: expression.to_string(),
        reason: e.to_string(),
    })
}

impl Recurrence {
    /// Whether the recurrence fires at `now`, given the last execution.
    ///
    /// A schedule that has never run is due immediately.
    pub fn fires(
        &self,
        last_run: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<bool, ScheduleError> {
        let last = match last_run {
            Some(last) => last,
            None => return Ok(true),
        };

        match self {
            Recurrence::Interval { every_seconds } => {
                Ok(now - last >= Duration::seconds(*every_seconds as i64))
            }
            Recurrence::Cron {
                expression,
                timezone,
            } => {
                let schedule = parse_cron_expression(expression)?;
                let last_in_tz = last.with_timezone(timezone);
                match schedule.after(&last_in_tz).next() {
                    Some(next) => Ok(next.with_timezone(&Utc) <= now),
                    // No fire time after the last run: the expression is exhausted
                    None => Ok(false),
                }
            }
        }
    }
}

impl ScheduleTiming {
    /// Whether the schedule is due at `now`
    pub fn is_due(
        &self,
        last_run: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> Result<bool, ScheduleError> {
        if let Some(from) = self.from {
            if now < from {
                return Ok(false);
            }
        }
        if self.is_expired(now) {
            return Ok(false);
        }
        if !self.allows_day(now) {
            return Ok(false);
        }
        self.recurrence.fires(last_run, now)
    }

    /// Whether the validity window has passed
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.until.is_some_and(|until| now > until)
    }

    fn allows_day(&self, now: DateTime<Utc>) -> bool {
        match self.days {
            Some(mask) => mask & (1 << now.weekday().num_days_from_monday()) != 0,
            None => true,
        }
    }
}
