//! HTTP handler functions for the admin API.

use std::fmt::Display;

use actix_web::{HttpResponse, web};
use chrono::Utc;
use kintr_analytics::rankings::{self, RANKING_LIMIT};
use kintr_analytics::time::{growth_series, recent_accounts as count_recent};
use kintr_analytics_models::RecentAccounts;
use kintr_server_models::{
    ApiError, ApiHealth, ApiMessage, MSG_SUCCESS, MSG_USERS_FETCHED, PaginatedUsersParams,
    RecentAccountsResponse, TopCollegesResponse, TopLocationsResponse, TotalUsersResponse,
    UserLocationsResponse, UsersResponse,
};
use kintr_user_models::{UserDocument, decode_users, documents};
use serde_json::Value;

use crate::{AppState, USERS_PATH};

const FETCH_DATA_ERROR: &str = "Error fetching data";
const FETCH_USERS_ERROR: &str = "Error fetching users";
const NO_DATA: &str = "No data available";
const NO_USERS: &str = "No users found";

fn not_found(msg: &str) -> HttpResponse {
    HttpResponse::NotFound().json(ApiMessage::new(msg))
}

fn server_error(msg: &str, e: &impl Display) -> HttpResponse {
    log::error!("{msg}: {e}");
    HttpResponse::InternalServerError().json(ApiError {
        msg: msg.to_string(),
        error: e.to_string(),
    })
}

/// Reads the `users` collection, or the response to send when it is empty
/// or unreadable.
async fn load_users(
    state: &AppState,
    empty_msg: &str,
    error_msg: &str,
) -> Result<Value, HttpResponse> {
    match state.store.get(USERS_PATH).await {
        Ok(Some(users)) => Ok(users),
        Ok(None) => Err(not_found(empty_msg)),
        Err(e) => Err(server_error(error_msg, &e)),
    }
}

/// `GET /api/v1/health`
pub async fn health() -> HttpResponse {
    HttpResponse::Ok().json(ApiHealth {
        healthy: true,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// `GET /api/v1/total_users`
///
/// Located users with a creation timestamp, plus cumulative growth over
/// the five chart windows.
pub async fn total_users(state: web::Data<AppState>) -> HttpResponse {
    let users = match load_users(&state, NO_DATA, FETCH_DATA_ERROR).await {
        Ok(users) => users,
        Err(resp) => return resp,
    };

    let records = decode_users(&users);
    let created = rankings::growth_instants(&records);

    HttpResponse::Ok().json(TotalUsersResponse {
        msg: MSG_SUCCESS.to_string(),
        total_users: rankings::total_users(&records),
        gained_user: growth_series(&created, Utc::now()),
    })
}

/// `GET /api/v1/top_locations`
///
/// The ten cities with the most users living nearest to them.
pub async fn top_locations(state: web::Data<AppState>) -> HttpResponse {
    let users = match load_users(&state, "No user data available", FETCH_DATA_ERROR).await {
        Ok(users) => users,
        Err(resp) => return resp,
    };

    let coordinates: Vec<(f64, f64)> = decode_users(&users)
        .iter()
        .filter_map(|u| u.coordinates())
        .collect();

    if coordinates.is_empty() {
        return not_found("No user data available");
    }

    match rankings::top_locations(&state.geo, coordinates, RANKING_LIMIT) {
        Ok(top_locations) => HttpResponse::Ok().json(TopLocationsResponse {
            msg: MSG_SUCCESS.to_string(),
            top_locations,
        }),
        Err(e) => server_error(FETCH_DATA_ERROR, &e),
    }
}

/// `GET /api/v1/top_colleges`
pub async fn top_colleges(state: web::Data<AppState>) -> HttpResponse {
    let users = match load_users(&state, "No college data available", FETCH_DATA_ERROR).await {
        Ok(users) => users,
        Err(resp) => return resp,
    };

    let top_colleges = rankings::top_colleges(&decode_users(&users), RANKING_LIMIT);
    if top_colleges.is_empty() {
        return not_found("No college data available");
    }

    HttpResponse::Ok().json(TopCollegesResponse {
        msg: MSG_SUCCESS.to_string(),
        top_colleges,
    })
}

/// `GET /api/v1/user_locations`
pub async fn user_locations(state: web::Data<AppState>) -> HttpResponse {
    let users = match load_users(&state, "No user locations found", FETCH_DATA_ERROR).await {
        Ok(users) => users,
        Err(resp) => return resp,
    };

    let locations = rankings::user_locations(&decode_users(&users));
    if locations.is_empty() {
        return not_found("No user locations found");
    }

    HttpResponse::Ok().json(UserLocationsResponse {
        msg: MSG_SUCCESS.to_string(),
        locations,
    })
}

/// `GET /api/v1/recent_accounts`
///
/// Accounts created in the last 12 and 4 hours. An empty collection
/// reports zero for both.
pub async fn recent_accounts(state: web::Data<AppState>) -> HttpResponse {
    let counts = match state.store.get(USERS_PATH).await {
        Ok(Some(users)) => {
            let created = rankings::creation_instants(&decode_users(&users));
            count_recent(&created, Utc::now())
        }
        Ok(None) => RecentAccounts {
            recent_users_12h_count: 0,
            recent_users_4h_count: 0,
        },
        Err(e) => return server_error(FETCH_DATA_ERROR, &e),
    };

    HttpResponse::Ok().json(RecentAccountsResponse {
        msg: MSG_SUCCESS.to_string(),
        counts,
    })
}

/// `GET /api/v1/get_user_demographics`
///
/// Likes-weighted top attributes for each recency period.
pub async fn user_demographics(state: web::Data<AppState>) -> HttpResponse {
    const ERROR: &str = "error getting user demographics";

    let users = match load_users(&state, NO_DATA, ERROR).await {
        Ok(users) => users,
        Err(resp) => return resp,
    };

    match kintr_analytics::tally(&decode_users(&users), Utc::now(), &state.geo) {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => server_error(ERROR, &e),
    }
}

/// `GET /api/v1/get_all_users`
///
/// The raw collection as stored.
pub async fn all_users(state: web::Data<AppState>) -> HttpResponse {
    let users = match load_users(&state, NO_USERS, FETCH_USERS_ERROR).await {
        Ok(users) => users,
        Err(resp) => return resp,
    };

    let count = documents(&users).len();

    HttpResponse::Ok().json(UsersResponse {
        msg: MSG_USERS_FETCHED.to_string(),
        count,
        users,
    })
}

/// `GET /api/v1/get_paginated_users`
///
/// Users matching `search`, one page at a time, each with its `id` merged
/// in. `count` is the number of matches before paging.
pub async fn paginated_users(
    state: web::Data<AppState>,
    params: web::Query<PaginatedUsersParams>,
) -> HttpResponse {
    let users = match load_users(&state, NO_USERS, FETCH_USERS_ERROR).await {
        Ok(users) => users,
        Err(resp) => return resp,
    };

    let search = params.search.as_deref().unwrap_or_default();
    let matching: Vec<UserDocument<'_>> = documents(&users)
        .into_iter()
        .filter(|doc| doc.matches_search(search))
        .collect();

    let page: Vec<Value> = matching[params.page_range(matching.len())]
        .iter()
        .map(UserDocument::with_id)
        .collect();

    HttpResponse::Ok().json(UsersResponse {
        msg: MSG_USERS_FETCHED.to_string(),
        count: matching.len(),
        users: Value::Array(page),
    })
}
