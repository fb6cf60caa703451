#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! API request and response types for the admin server.
//!
//! Field names are snake case because that is what the dashboard reads.
//! Every body except the demographics report and the health check carries a
//! human-readable `msg`.

use kintr_analytics_models::{CollegeCount, GrowthSeries, LocationCount, RecentAccounts, UserLocation};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `msg` of most successful responses.
pub const MSG_SUCCESS: &str = "Success";

/// `msg` of successful user listings.
pub const MSG_USERS_FETCHED: &str = "Users fetched successfully";

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiHealth {
    /// Whether the service is healthy.
    pub healthy: bool,
    /// Service version.
    pub version: String,
}

/// A body carrying only a message, used for empty results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiMessage {
    /// Why there is nothing to return.
    pub msg: String,
}

impl ApiMessage {
    /// Creates a message body.
    #[must_use]
    pub fn new(msg: impl Into<String>) -> Self {
        Self { msg: msg.into() }
    }
}

/// A failed request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    /// What was being attempted.
    pub msg: String,
    /// The underlying error message.
    pub error: String,
}

/// `GET /api/v1/total_users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TotalUsersResponse {
    /// Outcome message.
    pub msg: String,
    /// Users with a creation timestamp and home coordinates.
    pub total_users: u64,
    /// Cumulative growth per chart window.
    pub gained_user: GrowthSeries,
}

/// `GET /api/v1/top_locations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopLocationsResponse {
    /// Outcome message.
    pub msg: String,
    /// Cities ranked by resident users.
    pub top_locations: Vec<LocationCount>,
}

/// `GET /api/v1/top_colleges`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopCollegesResponse {
    /// Outcome message.
    pub msg: String,
    /// Colleges ranked by users.
    pub top_colleges: Vec<CollegeCount>,
}

/// `GET /api/v1/user_locations`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserLocationsResponse {
    /// Outcome message.
    pub msg: String,
    /// Users with home coordinates.
    pub locations: Vec<UserLocation>,
}

/// `GET /api/v1/recent_accounts`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecentAccountsResponse {
    /// Outcome message.
    pub msg: String,
    /// Counts for both windows, inlined into the body.
    #[serde(flatten)]
    pub counts: RecentAccounts,
}

/// `GET /api/v1/get_all_users` and `GET /api/v1/get_paginated_users`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UsersResponse {
    /// Outcome message.
    pub msg: String,
    /// Users matching the request before paging.
    pub count: usize,
    /// The raw collection for the full listing, or a page of users with
    /// their `id` merged in.
    pub users: Value,
}

/// Query parameters for the paginated users endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaginatedUsersParams {
    /// Case-insensitive substring filter.
    pub search: Option<String>,
    /// 1-based page number (default 1).
    pub page: Option<usize>,
    /// Page size (default 10).
    pub limit: Option<usize>,
}

impl PaginatedUsersParams {
    /// Default page size.
    pub const DEFAULT_LIMIT: usize = 10;

    /// Index range of the requested page, clamped to `len`.
    #[must_use]
    pub fn page_range(&self, len: usize) -> std::ops::Range<usize> {
        let page = self.page.unwrap_or(1).max(1);
        let limit = self.limit.unwrap_or(Self::DEFAULT_LIMIT);
        let start = (page - 1).saturating_mul(limit).min(len);
        let end = start.saturating_add(limit).min(len);
        start..end
    }
}
