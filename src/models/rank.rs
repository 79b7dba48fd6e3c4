use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, TimeDelta, Utc};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};

/// Time window a rank aggregate is computed over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum MetricPeriod {
    Day,
    Week,
    Month,
    Year,
    #[default]
    AllTime,
}

impl MetricPeriod {
    /// Every period, shortest window first
    pub const ALL: [MetricPeriod; 5] = [
        MetricPeriod::Day,
        MetricPeriod::Week,
        MetricPeriod::Month,
        MetricPeriod::Year,
        MetricPeriod::AllTime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricPeriod::Day => "Day",
            MetricPeriod::Week => "Week",
            MetricPeriod::Month => "Month",
            MetricPeriod::Year => "Year",
            MetricPeriod::AllTime => "AllTime",
        }
    }

    /// Start of the window ending at `now`; the unbounded window starts at the
    /// Unix epoch
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let length = match self {
            MetricPeriod::Day => TimeDelta::days(1),
            MetricPeriod::Week => TimeDelta::days(7),
            MetricPeriod::Month => TimeDelta::days(30),
            MetricPeriod::Year => TimeDelta::days(365),
            MetricPeriod::AllTime => return DateTime::<Utc>::UNIX_EPOCH,
        };
        now - length
    }
}

impl fmt::Display for MetricPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MetricPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MetricPeriod::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| format!("Unknown period: {}", s))
    }
}

/// Heart and answer counts of a question for a single period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PeriodCounts {
    pub heart_count: i32,
    pub answer_count: i32,
}

/// Precomputed popularity aggregates of a question, one column pair per period
#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq, Eq, Default)]
#[diesel(table_name = crate::schema::question_ranks)]
#[diesel(primary_key(question_id))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct QuestionRank {
    pub question_id: i32,
    pub heart_count_day: i32,
    pub heart_count_week: i32,
    pub heart_count_month: i32,
    pub heart_count_year: i32,
    pub heart_count_all_time: i32,
    pub answer_count_day: i32,
    pub answer_count_week: i32,
    pub answer_count_month: i32,
    pub answer_count_year: i32,
    pub answer_count_all_time: i32,
}

impl QuestionRank {
    /// Looks up the column pair stored for `period`
    #[cfg(test)]
    pub fn counts(&self, period: MetricPeriod) -> PeriodCounts {
        let (heart_count, answer_count) = match period {
            MetricPeriod::Day => (self.heart_count_day, self.answer_count_day),
            MetricPeriod::Week => (self.heart_count_week, self.answer_count_week),
            MetricPeriod::Month => (self.heart_count_month, self.answer_count_month),
            MetricPeriod::Year => (self.heart_count_year, self.answer_count_year),
            MetricPeriod::AllTime => (self.heart_count_all_time, self.answer_count_all_time),
        };
        PeriodCounts { heart_count, answer_count }
    }

    /// Stores `counts` in the column pair for `period`
    pub fn set_counts(&mut self, period: MetricPeriod, counts: PeriodCounts) {
        let (heart, answer) = match period {
            MetricPeriod::Day => (&mut self.heart_count_day, &mut self.answer_count_day),
            MetricPeriod::Week => (&mut self.heart_count_week, &mut self.answer_count_week),
            MetricPeriod::Month => (&mut self.heart_count_month, &mut self.answer_count_month),
            MetricPeriod::Year => (&mut self.heart_count_year, &mut self.answer_count_year),
            MetricPeriod::AllTime => (&mut self.heart_count_all_time, &mut self.answer_count_all_time),
        };
        *heart = counts.heart_count;
        *answer = counts.answer_count;
    }
}
