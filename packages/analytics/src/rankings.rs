//! Headline counts and rankings for the dashboard overview.

use chrono::{DateTime, Utc};
use kintr_analytics_models::{CollegeCount, LocationCount, UserLocation};
use kintr_geography::{GeoIndex, GeographyError};
use kintr_user_models::UserRecord;

use crate::tally::WeightedTally;
use crate::time::parse_instants_lenient;

/// Entries returned by the overview rankings.
pub const RANKING_LIMIT: usize = 10;

/// Users with a creation timestamp and both home coordinates.
#[must_use]
pub fn total_users(users: &[UserRecord]) -> u64 {
    users
        .iter()
        .filter(|u| u.created_at.is_some() && u.coordinates().is_some())
        .count() as u64
}

/// Creation instants of users that have a creation timestamp and a
/// `livesIn` block.
#[must_use]
pub fn growth_instants(users: &[UserRecord]) -> Vec<DateTime<Utc>> {
    parse_instants_lenient(
        users
            .iter()
            .filter(|u| u.lives_in.is_some())
            .filter_map(|u| u.created_at.as_deref()),
    )
}

/// Creation instants of every user that has a parseable timestamp.
#[must_use]
pub fn creation_instants(users: &[UserRecord]) -> Vec<DateTime<Utc>> {
    parse_instants_lenient(users.iter().filter_map(|u| u.created_at.as_deref()))
}

/// Users with both home coordinates.
#[must_use]
pub fn user_locations(users: &[UserRecord]) -> Vec<UserLocation> {
    users
        .iter()
        .filter_map(|u| {
            u.coordinates().map(|(latitude, longitude)| UserLocation {
                id: u.id.clone(),
                latitude,
                longitude,
            })
        })
        .collect()
}

/// Cities ranked by how many users live nearest to them.
///
/// Every city starts at zero in load order, so with few users the list is
/// padded with zero-count cities.
///
/// # Errors
///
/// Returns [`GeographyError::EmptyIndex`] if there are coordinates to
/// resolve but no cities.
pub fn top_locations(
    geo: &GeoIndex,
    coordinates: impl IntoIterator<Item = (f64, f64)>,
    limit: usize,
) -> Result<Vec<LocationCount>, GeographyError> {
    let mut tally = WeightedTally::new();
    for city in geo.cities() {
        tally.add(&city.name, 0);
    }

    for (latitude, longitude) in coordinates {
        tally.add(geo.nearest_name(latitude, longitude)?, 1);
    }

    Ok(tally
        .top_k_with_counts(limit)
        .into_iter()
        .map(|(name, user_count)| LocationCount { name, user_count })
        .collect())
}

/// Colleges ranked by how many users listed them.
#[must_use]
pub fn top_colleges(users: &[UserRecord], limit: usize) -> Vec<CollegeCount> {
    let mut tally = WeightedTally::new();
    for college in users.iter().filter_map(|u| u.college_or_school.as_deref()) {
        tally.add(college, 1);
    }

    tally
        .top_k_with_counts(limit)
        .into_iter()
        .map(|(college, user_count)| CollegeCount {
            college,
            user_count,
        })
        .collect()
}
