//! Likes-weighted demographic tallies.
//!
//! Each user's attributes are weighted by how many likes the user received
//! inside the period, so the report reflects who is popular recently rather
//! than who signed up.

use chrono::{DateTime, TimeDelta, Utc};
use kintr_analytics_models::{DemographicsReport, GenderTop, Period, PeriodTop};
use kintr_geography::{GeoIndex, GeographyError};
use kintr_user_models::{Gender, UserRecord};

use crate::tally::WeightedTally;
use crate::time::{count_in_window, parse_instants_lenient};

/// Entries kept per attribute.
pub const TOP_K: usize = 4;

#[derive(Debug, Default)]
struct GenderTally {
    man: WeightedTally,
    woman: WeightedTally,
}

impl GenderTally {
    fn add(&mut self, gender: Gender, key: &str, weight: u64) {
        match gender {
            Gender::Man => self.man.add(key, weight),
            Gender::Woman => self.woman.add(key, weight),
        }
    }

    fn top(&self) -> GenderTop {
        GenderTop {
            man: self.man.top_k(TOP_K),
            woman: self.woman.top_k(TOP_K),
        }
    }
}

#[derive(Debug, Default)]
struct PeriodTally {
    heights: GenderTally,
    skin_colors: GenderTally,
    job_prominences: GenderTally,
    yearly_incomes: GenderTally,
    hobbies: GenderTally,
    colleges: WeightedTally,
    cities: WeightedTally,
}

impl PeriodTally {
    fn add_gendered(&mut self, user: &UserRecord, gender: Gender, weight: u64) {
        let categories = [
            (&mut self.heights, &user.height),
            (&mut self.skin_colors, &user.skin_color),
            (&mut self.job_prominences, &user.job_prominence),
            (&mut self.yearly_incomes, &user.yearly_income),
        ];
        for (tally, value) in categories {
            if let Some(value) = value {
                tally.add(gender, value, weight);
            }
        }
        for hobby in &user.hobbies {
            self.hobbies.add(gender, hobby, weight);
        }
    }

    fn top(&self) -> PeriodTop {
        PeriodTop {
            top_heights: self.heights.top(),
            top_skin_colors: self.skin_colors.top(),
            top_job_prominences: self.job_prominences.top(),
            top_yearly_incomes: self.yearly_incomes.top(),
            top_hobbies: self.hobbies.top(),
            top_colleges: self.colleges.top_k(TOP_K),
            top_cities: self.cities.top_k(TOP_K),
        }
    }
}

/// Computes the top attribute values for every [`Period`], weighting each
/// user by the likes they received inside it.
///
/// Users with no likes in a period are left out of that period entirely.
/// Likes with unparseable timestamps are ignored.
///
/// # Errors
///
/// Returns [`GeographyError::EmptyIndex`] if a weighted user has home
/// coordinates but `geo` holds no cities.
pub fn tally(
    users: &[UserRecord],
    now: DateTime<Utc>,
    geo: &GeoIndex,
) -> Result<DemographicsReport, GeographyError> {
    let mut tallies: Vec<(Period, PeriodTally)> = Period::ALL
        .iter()
        .map(|period| (*period, PeriodTally::default()))
        .collect();

    for user in users {
        let likes = parse_instants_lenient(user.likes_received.iter().map(String::as_str));
        if likes.is_empty() {
            continue;
        }

        let mut city: Option<Option<&str>> = None;

        for (period, period_tally) in &mut tallies {
            let weight = count_in_window(&likes, now, TimeDelta::days(period.days()));
            if weight == 0 {
                continue;
            }

            if let Some(gender) = user.gender {
                period_tally.add_gendered(user, gender, weight);
            }
            if let Some(college) = &user.college_or_school {
                period_tally.colleges.add(college, weight);
            }

            let resolved = match city {
                Some(resolved) => resolved,
                None => {
                    let resolved = user
                        .coordinates()
                        .map(|(lat, lon)| geo.nearest_name(lat, lon))
                        .transpose()?;
                    city = Some(resolved);
                    resolved
                }
            };
            if let Some(name) = resolved {
                period_tally.cities.add(name, weight);
            }
        }
    }

    let mut report = DemographicsReport::default();
    for (period, period_tally) in &tallies {
        report.insert(*period, period_tally.top());
    }

    log::debug!("Tallied demographics over {} users", users.len());

    Ok(report)
}
