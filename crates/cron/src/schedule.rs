// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Fyreflow Labs

//! Pure cron-arithmetic helpers: no I/O, no pipeline store, no run table.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use cron::Schedule as CronSchedule;
use fyreflow_core::Schedule;

use crate::error::CronError;

fn parse(schedule: &Schedule) -> Result<(CronSchedule, Tz), CronError> {
    let tz = Tz::from_str(&schedule.timezone)
        .map_err(|_| CronError::InvalidTimezone(schedule.timezone.clone()))?;
    // the `cron` crate's expressions carry a leading seconds field; schedules
    // are authored as 5-field minute/hour/dom/month/dow strings.
    let expr = format!("0 {}", schedule.cron);
    let cron_schedule =
        CronSchedule::from_str(&expr).map_err(|e| CronError::InvalidCron(e.to_string()))?;
    Ok((cron_schedule, tz))
}

/// The first occurrence strictly after `after`, converted back to UTC.
pub fn next_fire_after(
    schedule: &Schedule,
    after: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, CronError> {
    let (cron_schedule, tz) = parse(schedule)?;
    let after_tz = after.with_timezone(&tz);
    Ok(cron_schedule
        .after(&after_tz)
        .next()
        .map(|dt| dt.with_timezone(&Utc)))
}

/// Is there an occurrence in `(last_considered, now]`?
///
/// `last_considered` is exclusive so a fire time exactly equal to it (the
/// previous tick's base time) is not reported as due twice.
pub fn is_due_now(
    schedule: &Schedule,
    last_considered: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Result<bool, CronError> {
    match next_fire_after(schedule, last_considered)? {
        Some(fire) => Ok(fire <= now),
        None => Ok(false),
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;
