#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Aggregate result types for the admin dashboard.
//!
//! These are the shapes the dashboard charts consume. Field names and JSON
//! layouts follow what the frontend already reads, which is why growth
//! points serialize as `[label, count]` pairs and gendered tallies use the
//! `Man`/`Woman` keys verbatim.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display, EnumString};

/// One labelled bucket of a growth chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "(String, u64)", into = "(String, u64)")]
pub struct TimeSeriesPoint {
    /// Bucket label (e.g. "Mon", "07 Mar", "Mar 2024").
    pub label: String,
    /// Records counted into this bucket.
    pub count: u64,
}

impl From<(String, u64)> for TimeSeriesPoint {
    fn from((label, count): (String, u64)) -> Self {
        Self { label, count }
    }
}

impl From<TimeSeriesPoint> for (String, u64) {
    fn from(point: TimeSeriesPoint) -> Self {
        (point.label, point.count)
    }
}

/// User growth over the five preset chart windows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthSeries {
    /// Seven daily buckets labelled by weekday.
    pub last_week: Vec<TimeSeriesPoint>,
    /// Thirty daily buckets labelled by day and month.
    pub last_month: Vec<TimeSeriesPoint>,
    /// Four monthly buckets.
    pub last_4_months: Vec<TimeSeriesPoint>,
    /// Six monthly buckets.
    pub last_6_months: Vec<TimeSeriesPoint>,
    /// Twelve monthly buckets.
    pub last_year: Vec<TimeSeriesPoint>,
}

/// Recency window used to weight demographic tallies.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
pub enum Period {
    /// Last day.
    #[serde(rename = "day")]
    #[strum(serialize = "day")]
    Day,
    /// Last 7 days.
    #[serde(rename = "week")]
    #[strum(serialize = "week")]
    Week,
    /// Last 30 days.
    #[serde(rename = "month")]
    #[strum(serialize = "month")]
    Month,
    /// Last 182 days.
    #[serde(rename = "6months")]
    #[strum(serialize = "6months")]
    SixMonths,
    /// Last 365 days.
    #[serde(rename = "year")]
    #[strum(serialize = "year")]
    Year,
}

impl Period {
    /// Every period, shortest first.
    pub const ALL: [Self; 5] = [
        Self::Day,
        Self::Week,
        Self::Month,
        Self::SixMonths,
        Self::Year,
    ];

    /// Window length in days.
    #[must_use]
    pub const fn days(self) -> i64 {
        match self {
            Self::Day => 1,
            Self::Week => 7,
            Self::Month => 30,
            Self::SixMonths => 182,
            Self::Year => 365,
        }
    }
}

/// Top values of one attribute, split by gender.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenderTop {
    /// Top values among men.
    #[serde(rename = "Man")]
    pub man: Vec<String>,
    /// Top values among women.
    #[serde(rename = "Woman")]
    pub woman: Vec<String>,
}

/// Most popular attribute values within one [`Period`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeriodTop {
    /// Heights.
    pub top_heights: GenderTop,
    /// Skin colors.
    pub top_skin_colors: GenderTop,
    /// Job prominences.
    pub top_job_prominences: GenderTop,
    /// Yearly income brackets.
    pub top_yearly_incomes: GenderTop,
    /// Hobbies.
    pub top_hobbies: GenderTop,
    /// Colleges, regardless of gender.
    pub top_colleges: Vec<String>,
    /// Resolved home cities, regardless of gender.
    pub top_cities: Vec<String>,
}

/// Likes-weighted demographics for every [`Period`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DemographicsReport {
    periods: BTreeMap<Period, PeriodTop>,
}

impl DemographicsReport {
    /// Records the result for one period, replacing any previous one.
    pub fn insert(&mut self, period: Period, top: PeriodTop) {
        self.periods.insert(period, top);
    }

    /// Result for `period`, if computed.
    #[must_use]
    pub fn get(&self, period: Period) -> Option<&PeriodTop> {
        self.periods.get(&period)
    }

    /// Results in period order.
    pub fn iter(&self) -> impl Iterator<Item = (Period, &PeriodTop)> {
        self.periods.iter().map(|(p, t)| (*p, t))
    }
}

/// Users whose home resolves to a city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationCount {
    /// City name.
    pub name: String,
    /// Number of users living nearest to it.
    pub user_count: u64,
}

/// Users who listed a college.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollegeCount {
    /// College or school name.
    pub college: String,
    /// Number of users.
    pub user_count: u64,
}

/// Accounts created recently.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecentAccounts {
    /// Created within the last 12 hours.
    pub recent_users_12h_count: u64,
    /// Created within the last 4 hours.
    pub recent_users_4h_count: u64,
}

/// A user's home coordinates for the dashboard map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserLocation {
    /// User document key.
    pub id: String,
    /// Latitude.
    pub latitude: f64,
    /// Longitude.
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn period_strings_match_dashboard_keys() {
        let names: Vec<String> = Period::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(names, vec!["day", "week", "month", "6months", "year"]);
        assert_eq!("6months".parse::<Period>().unwrap(), Period::SixMonths);
    }

    #[test]
    fn periods_order_shortest_first() {
        let mut sorted = Period::ALL;
        sorted.sort();
        assert_eq!(sorted, Period::ALL);
        assert!(Period::ALL.windows(2).all(|w| w[0].days() < w[1].days()));
    }
}
