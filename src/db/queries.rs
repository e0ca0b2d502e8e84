use chrono::{NaiveDate, NaiveDateTime, Timelike, Utc};
use rusqlite::{params, Connection};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::{Booking, BookingStatus, NewBooking};

// Millisecond precision so createdAt can break ordering ties between
// records inserted within the same second.
const TIMESTAMP_FMT: &str = "%Y-%m-%d %H:%M:%S%.3f";
const DATE_FMT: &str = "%Y-%m-%d";

const BOOKING_COLUMNS: &str =
    "id, name, email, phone, date, time, number_of_guests, notes, status, created_at, updated_at";

/// Persists a candidate booking, assigning the identifier, timestamps, and
/// the default `pending` status. Re-runs the shared bound checks as a
/// backstop; a violation persists nothing.
pub fn insert_booking(conn: &Connection, candidate: &NewBooking) -> Result<Booking, AppError> {
    let errors = candidate.validate();
    if !errors.is_empty() {
        return Err(AppError::Validation(errors));
    }

    let now = now_millis();
    let booking = Booking {
        id: Uuid::new_v4().to_string(),
        name: candidate.name.clone(),
        email: candidate.email.clone(),
        phone: candidate.phone.clone(),
        date: candidate.date,
        time: candidate.time.clone(),
        number_of_guests: candidate.number_of_guests,
        notes: candidate.notes.clone(),
        status: BookingStatus::Pending,
        created_at: now,
        updated_at: now,
    };

    conn.execute(
        "INSERT INTO bookings (id, name, email, phone, date, time, number_of_guests, notes, status, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            booking.id,
            booking.name,
            booking.email,
            booking.phone,
            booking.date.format(DATE_FMT).to_string(),
            booking.time,
            booking.number_of_guests,
            booking.notes,
            booking.status.as_str(),
            booking.created_at.format(TIMESTAMP_FMT).to_string(),
            booking.updated_at.format(TIMESTAMP_FMT).to_string(),
        ],
    )?;

    Ok(booking)
}

/// Full table fetch, newest booking date first, creation time breaking ties.
pub fn list_bookings(conn: &Connection) -> Result<Vec<Booking>, AppError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY date DESC, created_at DESC"
    ))?;

    let rows = stmt.query_map([], parse_booking_row)?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row?);
    }
    Ok(bookings)
}

/// A malformed identifier simply matches no row.
pub fn get_booking_by_id(conn: &Connection, id: &str) -> Result<Option<Booking>, AppError> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        parse_booking_row,
    );

    match result {
        Ok(booking) => Ok(Some(booking)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Overwrites only the status and updated-at timestamp of the matching
/// record, returning it, or `None` if the identifier is unknown.
pub fn update_booking_status(
    conn: &Connection,
    id: &str,
    status: BookingStatus,
) -> Result<Option<Booking>, AppError> {
    let now = now_millis().format(TIMESTAMP_FMT).to_string();
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3",
        params![status.as_str(), now, id],
    )?;

    if count == 0 {
        return Ok(None);
    }
    get_booking_by_id(conn, id)
}

// Truncated to the stored precision so a record serializes identically
// before and after a round trip through the store.
fn now_millis() -> NaiveDateTime {
    let now = Utc::now().naive_utc();
    now.with_nanosecond(now.nanosecond() / 1_000_000 * 1_000_000)
        .unwrap_or(now)
}

fn parse_booking_row(row: &rusqlite::Row) -> rusqlite::Result<Booking> {
    let date_str: String = row.get(4)?;
    let status_str: String = row.get(8)?;
    let created_at_str: String = row.get(9)?;
    let updated_at_str: String = row.get(10)?;

    Ok(Booking {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        date: NaiveDate::parse_from_str(&date_str, DATE_FMT)
            .unwrap_or_else(|_| Utc::now().date_naive()),
        time: row.get(5)?,
        number_of_guests: row.get(6)?,
        notes: row.get(7)?,
        status: BookingStatus::parse(&status_str).unwrap_or(BookingStatus::Pending),
        created_at: NaiveDateTime::parse_from_str(&created_at_str, TIMESTAMP_FMT)
            .unwrap_or_else(|_| Utc::now().naive_utc()),
        updated_at: NaiveDateTime::parse_from_str(&updated_at_str, TIMESTAMP_FMT)
            .unwrap_or_else(|_| Utc::now().naive_utc()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;

    fn candidate(date: &str) -> NewBooking {
        NewBooking {
            name: "John Doe".to_string(),
            email: "john@example.com".to_string(),
            phone: "+1234567890".to_string(),
            date: NaiveDate::parse_from_str(date, DATE_FMT).unwrap(),
            time: "18:00".to_string(),
            number_of_guests: 4,
            notes: Some("Birthday celebration".to_string()),
        }
    }

    #[test]
    fn insert_assigns_defaults() {
        let conn = db::init_db(":memory:").unwrap();

        let booking = insert_booking(&conn, &candidate("2024-12-25")).unwrap();
        assert!(!booking.id.is_empty());
        assert_eq!(booking.status, BookingStatus::Pending);
        assert_eq!(booking.created_at, booking.updated_at);
    }

    #[test]
    fn insert_assigns_distinct_ids() {
        let conn = db::init_db(":memory:").unwrap();

        let a = insert_booking(&conn, &candidate("2024-12-25")).unwrap();
        let b = insert_booking(&conn, &candidate("2024-12-25")).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn insert_backstop_rejects_out_of_bounds() {
        let conn = db::init_db(":memory:").unwrap();

        let mut bad = candidate("2024-12-25");
        bad.number_of_guests = 0;
        let err = insert_booking(&conn, &bad).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(list_bookings(&conn).unwrap().is_empty());
    }

    #[test]
    fn insert_backstop_rejects_empty_phone_and_time() {
        let conn = db::init_db(":memory:").unwrap();

        let mut bad = candidate("2024-12-25");
        bad.phone = String::new();
        bad.time = String::new();

        match insert_booking(&conn, &bad).unwrap_err() {
            AppError::Validation(errors) => {
                let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();
                assert!(fields.contains(&"phone"));
                assert!(fields.contains(&"time"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
        assert!(list_bookings(&conn).unwrap().is_empty());
    }

    #[test]
    fn list_orders_by_date_then_creation() {
        let conn = db::init_db(":memory:").unwrap();

        let early = insert_booking(&conn, &candidate("2024-12-20")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let tied_old = insert_booking(&conn, &candidate("2024-12-25")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));
        let tied_new = insert_booking(&conn, &candidate("2024-12-25")).unwrap();

        let ids: Vec<String> = list_bookings(&conn)
            .unwrap()
            .into_iter()
            .map(|b| b.id)
            .collect();
        assert_eq!(ids, vec![tied_new.id, tied_old.id, early.id]);
    }

    #[test]
    fn lookup_unknown_and_malformed_ids() {
        let conn = db::init_db(":memory:").unwrap();

        assert!(get_booking_by_id(&conn, "no-such-id").unwrap().is_none());
        assert!(get_booking_by_id(&conn, "' OR 1=1 --").unwrap().is_none());
        assert!(get_booking_by_id(&conn, "").unwrap().is_none());
    }

    #[test]
    fn update_touches_only_status_and_updated_at() {
        let conn = db::init_db(":memory:").unwrap();

        let before = insert_booking(&conn, &candidate("2024-12-25")).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(5));

        let after = update_booking_status(&conn, &before.id, BookingStatus::Confirmed)
            .unwrap()
            .unwrap();

        assert_eq!(after.status, BookingStatus::Confirmed);
        assert!(after.updated_at > before.updated_at);
        assert_eq!(after.id, before.id);
        assert_eq!(after.name, before.name);
        assert_eq!(after.email, before.email);
        assert_eq!(after.phone, before.phone);
        assert_eq!(after.date, before.date);
        assert_eq!(after.time, before.time);
        assert_eq!(after.number_of_guests, before.number_of_guests);
        assert_eq!(after.notes, before.notes);
        assert_eq!(after.created_at, before.created_at);
    }

    #[test]
    fn update_unknown_id_is_none() {
        let conn = db::init_db(":memory:").unwrap();

        let result = update_booking_status(&conn, "missing", BookingStatus::Cancelled).unwrap();
        assert!(result.is_none());
    }
}
