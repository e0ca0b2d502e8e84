use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::errors::FieldError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: NaiveDate,
    pub time: String,
    pub number_of_guests: i64,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    /// Strict parse; out-of-enum values are rejected at the service
    /// boundary rather than silently coerced.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

/// A candidate booking: normalized input that has passed request-level
/// validation but has not yet been assigned an id, timestamps, or status.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date: NaiveDate,
    pub time: String,
    pub number_of_guests: i64,
    pub notes: Option<String>,
}

impl NewBooking {
    /// Bound checks shared with the service boundary. The store runs this
    /// again before insert as a backstop so the two layers cannot diverge.
    pub fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        if let Some(msg) = rules::name(&self.name) {
            errors.push(FieldError::new("name", msg));
        }
        if let Some(msg) = rules::email(&self.email) {
            errors.push(FieldError::new("email", msg));
        }
        if let Some(msg) = rules::phone(&self.phone) {
            errors.push(FieldError::new("phone", msg));
        }
        if let Some(msg) = rules::time(&self.time) {
            errors.push(FieldError::new("time", msg));
        }
        if let Some(msg) = rules::guests(self.number_of_guests) {
            errors.push(FieldError::new("numberOfGuests", msg));
        }
        if let Some(notes) = &self.notes {
            if let Some(msg) = rules::notes(notes) {
                errors.push(FieldError::new("notes", msg));
            }
        }
        errors
    }
}

/// Field-bound rules, defined once and used by both validation layers.
/// Each rule returns the client-facing message on violation.
pub mod rules {
    pub fn name(v: &str) -> Option<&'static str> {
        let len = v.chars().count();
        if !(2..=100).contains(&len) {
            return Some("Name must be 2-100 characters");
        }
        None
    }

    pub fn email(v: &str) -> Option<&'static str> {
        if is_valid_email(v) {
            None
        } else {
            Some("Please enter a valid email")
        }
    }

    pub fn phone(v: &str) -> Option<&'static str> {
        if v.trim().is_empty() {
            Some("Phone number is required")
        } else {
            None
        }
    }

    pub fn time(v: &str) -> Option<&'static str> {
        if v.trim().is_empty() {
            Some("Booking time is required")
        } else {
            None
        }
    }

    pub fn guests(n: i64) -> Option<&'static str> {
        if (1..=100).contains(&n) {
            None
        } else {
            Some("Guests must be between 1 and 100")
        }
    }

    pub fn notes(v: &str) -> Option<&'static str> {
        if v.chars().count() > 500 {
            Some("Notes cannot exceed 500 characters")
        } else {
            None
        }
    }

    // Simple local@domain check, equivalent to /^\S+@\S+\.\S+$/.
    fn is_valid_email(v: &str) -> bool {
        if v.chars().any(char::is_whitespace) {
            return false;
        }
        let Some((local, domain)) = v.split_once('@') else {
            return false;
        };
        let Some((host, tld)) = domain.rsplit_once('.') else {
            return false;
        };
        !local.is_empty() && !host.is_empty() && !tld.is_empty()
    }
}
