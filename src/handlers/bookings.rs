use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::db::queries;
use crate::errors::{AppError, AppJson, FieldError};
use crate::models::booking::rules;
use crate::models::{Booking, BookingStatus, NewBooking};
use crate::state::AppState;

#[derive(Serialize)]
pub struct ListResponse {
    success: bool,
    count: usize,
    data: Vec<Booking>,
}

#[derive(Serialize)]
pub struct BookingResponse {
    success: bool,
    message: String,
    data: Booking,
}

// GET /api/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ListResponse>, AppError> {
    let bookings = {
        let db = state.db.lock().unwrap();
        queries::list_bookings(&db)?
    };

    Ok(Json(ListResponse {
        success: true,
        count: bookings.len(),
        data: bookings,
    }))
}

// POST /api/bookings
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub number_of_guests: Option<i64>,
    pub notes: Option<String>,
}

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    AppJson(body): AppJson<CreateBookingRequest>,
) -> Result<(StatusCode, Json<BookingResponse>), AppError> {
    let candidate = validate_create(body).map_err(AppError::Validation)?;

    let booking = {
        let db = state.db.lock().unwrap();
        queries::insert_booking(&db, &candidate)?
    };

    tracing::info!(id = %booking.id, "booking created");

    Ok((
        StatusCode::CREATED,
        Json(BookingResponse {
            success: true,
            message: "Booking created successfully".to_string(),
            data: booking,
        }),
    ))
}

// PATCH /api/bookings/:id
#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

pub async fn update_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    AppJson(body): AppJson<UpdateStatusRequest>,
) -> Result<Json<BookingResponse>, AppError> {
    // Reject out-of-enum values before touching the store, so both layers
    // enforce the same three-member enumeration.
    let status = body
        .status
        .as_deref()
        .and_then(BookingStatus::parse)
        .ok_or_else(|| {
            AppError::Validation(vec![FieldError::new(
                "status",
                "Status must be one of: pending, confirmed, cancelled",
            )])
        })?;

    let booking = {
        let db = state.db.lock().unwrap();
        queries::update_booking_status(&db, &id, status)?
    }
    .ok_or_else(|| AppError::NotFound("Booking not found".to_string()))?;

    tracing::info!(id = %booking.id, status = status.as_str(), "booking status updated");

    Ok(Json(BookingResponse {
        success: true,
        message: "Booking status updated successfully".to_string(),
        data: booking,
    }))
}

/// Request-level validation: trims and normalizes every field, collects one
/// message per offending field, and only yields a candidate when the whole
/// request is clean. Bound checks come from the shared rules so the store
/// backstop cannot diverge.
fn validate_create(body: CreateBookingRequest) -> Result<NewBooking, Vec<FieldError>> {
    let mut errors = Vec::new();

    let name = body.name.map(|v| v.trim().to_string()).unwrap_or_default();
    if name.is_empty() {
        errors.push(FieldError::new("name", "Name is required"));
    } else if let Some(msg) = rules::name(&name) {
        errors.push(FieldError::new("name", msg));
    }

    let email = body
        .email
        .map(|v| v.trim().to_lowercase())
        .unwrap_or_default();
    if email.is_empty() {
        errors.push(FieldError::new("email", "Email is required"));
    } else if let Some(msg) = rules::email(&email) {
        errors.push(FieldError::new("email", msg));
    }

    let phone = body.phone.map(|v| v.trim().to_string()).unwrap_or_default();
    if let Some(msg) = rules::phone(&phone) {
        errors.push(FieldError::new("phone", msg));
    }

    let date_raw = body.date.map(|v| v.trim().to_string()).unwrap_or_default();
    let date = if date_raw.is_empty() {
        errors.push(FieldError::new("date", "Booking date is required"));
        None
    } else {
        let parsed = parse_iso_date(&date_raw);
        if parsed.is_none() {
            errors.push(FieldError::new("date", "Please enter a valid date"));
        }
        parsed
    };

    let time = body.time.map(|v| v.trim().to_string()).unwrap_or_default();
    if let Some(msg) = rules::time(&time) {
        errors.push(FieldError::new("time", msg));
    }

    let number_of_guests = body.number_of_guests;
    match number_of_guests {
        None => errors.push(FieldError::new(
            "numberOfGuests",
            "Number of guests is required",
        )),
        Some(n) => {
            if let Some(msg) = rules::guests(n) {
                errors.push(FieldError::new("numberOfGuests", msg));
            }
        }
    }

    let notes = body
        .notes
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty());
    if let Some(notes) = &notes {
        if let Some(msg) = rules::notes(notes) {
            errors.push(FieldError::new("notes", msg));
        }
    }

    match (date, number_of_guests) {
        (Some(date), Some(number_of_guests)) if errors.is_empty() => Ok(NewBooking {
            name,
            email,
            phone,
            date,
            time,
            number_of_guests,
            notes,
        }),
        _ => Err(errors),
    }
}

fn parse_iso_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}
