//! Run schedule
//!
//! Cron expressions decide when the job list runs again. Both the classic
//! five-field form (`*/2 * * * *`) and the seconds-first six or seven field
//! form understood by the `cron` crate are accepted.

use chrono::{DateTime, Utc};
use std::str::FromStr;
use std::time::Duration;

/// A parsed cron schedule
#[derive(Debug, Clone)]
pub struct RunSchedule {
    expression: String,
    schedule: cron::Schedule,
}

impl RunSchedule {
    /// Parses a cron expression
    pub fn parse(expression: &str) -> Result<Self, cron::error::Error> {
        let expression = expression.trim();
        let normalized = if expression.split_whitespace().count() == 5 {
            format!("0 {}", expression)
        } else {
            expression.to_string()
        };

        Ok(Self {
            expression: expression.to_string(),
            schedule: cron::Schedule::from_str(&normalized)?,
        })
    }

    /// The expression as configured
    pub fn expression(&self) -> &str {
        &self.expression
    }

    /// First scheduled time strictly after `now`
    pub fn next_after(&self, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
        self.schedule.after(&now).next()
    }

    /// How long to wait from `now` until the next scheduled time
    pub fn delay_from(&self, now: DateTime<Utc>) -> Option<Duration> {
        let next = self.next_after(now)?;
        Some((next - now).to_std().unwrap_or(Duration::ZERO))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(h: u32, m: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 14, h, m, s).unwrap()
    }

    #[test]
    fn test_five_field_expression() {
        let schedule = RunSchedule::parse("*/2 * * * *").unwrap();

        assert_eq!(schedule.expression(), "*/2 * * * *");
        assert_eq!(schedule.next_after(at(12, 0, 30)), Some(at(12, 2, 0)));
        assert_eq!(schedule.next_after(at(12, 2, 0)), Some(at(12, 4, 0)));
    }

    #[test]
    fn test_six_field_expression() {
        let schedule = RunSchedule::parse("30 0 6 * * *").unwrap();
        assert_eq!(schedule.next_after(at(5, 59, 0)), Some(at(6, 0, 30)));
    }

    #[test]
    fn test_delay_until_next_run() {
        let schedule = RunSchedule::parse("0 * * * *").unwrap();
        assert_eq!(
            schedule.delay_from(at(12, 45, 0)),
            Some(Duration::from_secs(15 * 60))
        );
    }

    #[test]
    fn test_invalid_expression() {
        assert!(RunSchedule::parse("every five minutes").is_err());
        assert!(RunSchedule::parse("").is_err());
    }
}
