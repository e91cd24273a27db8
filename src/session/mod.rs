//! Capacity-bounded sessions and their bookings.

pub mod calendar;
pub mod handle;

use cragclub_shared::session::{handle::SessionDescriptor, Session};
use sqlx::SqlitePool;

use crate::{
    catalog::{Catalog, BASIC},
    membership, Error,
};

const SELECT_SESSION: &str = "SELECT id, session_type, title, date, time, capacity, booked_slots,
    required_membership FROM sessions";

pub async fn list(db: &SqlitePool) -> Result<Vec<Session>, Error> {
    Ok(
        sqlx::query_as::<_, Session>(&format!("{SELECT_SESSION} ORDER BY date, time, id"))
            .fetch_all(db)
            .await?,
    )
}

pub async fn get(db: &SqlitePool, id: i64) -> Result<Option<Session>, Error> {
    Ok(
        sqlx::query_as::<_, Session>(&format!("{SELECT_SESSION} WHERE id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await?,
    )
}

/// Checks a descriptor against the catalogs and returns its gate.
async fn validate(db: &SqlitePool, desc: &SessionDescriptor) -> Result<String, Error> {
    if desc.title.trim().is_empty() {
        return Err(Error::InvalidInput("title must not be empty"));
    }
    if desc.capacity <= 0 {
        return Err(Error::InvalidInput("capacity must be positive"));
    }
    Catalog::Session.check(db, &desc.session_type).await?;
    let gate = desc
        .required_membership
        .clone()
        .unwrap_or_else(|| BASIC.to_owned());
    Catalog::Membership.check(db, &gate).await?;
    Ok(gate)
}

pub async fn create(db: &SqlitePool, desc: SessionDescriptor) -> Result<i64, Error> {
    let gate = validate(db, &desc).await?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO sessions (session_type, title, date, time, capacity, required_membership)
        VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&desc.session_type)
    .bind(desc.title.trim())
    .bind(&desc.date)
    .bind(&desc.time)
    .bind(desc.capacity)
    .bind(&gate)
    .fetch_one(db)
    .await?;

    tracing::info!("session {id} created: {} on {}", desc.title, desc.date);
    Ok(id)
}

/// Rewrites a session. `booked_slots` overrides the counter as given.
pub async fn update(
    db: &SqlitePool,
    id: i64,
    desc: SessionDescriptor,
    booked_slots: Option<i64>,
) -> Result<(), Error> {
    let gate = validate(db, &desc).await?;
    if booked_slots.map_or(false, |b| b < 0) {
        return Err(Error::InvalidInput("booked slots must not be negative"));
    }

    let mut tx = db.begin().await?;
    let (capacity, booked): (i64, i64) = sqlx::query_as(
        "UPDATE sessions SET session_type = ?, title = ?, date = ?, time = ?, capacity = ?,
            required_membership = ?, booked_slots = COALESCE(?, booked_slots)
        WHERE id = ? RETURNING capacity, booked_slots",
    )
    .bind(&desc.session_type)
    .bind(desc.title.trim())
    .bind(&desc.date)
    .bind(&desc.time)
    .bind(desc.capacity)
    .bind(&gate)
    .bind(booked_slots)
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(Error::NotFound("session"))?;
    if booked > capacity {
        return Err(Error::InvalidInput("booked slots exceed capacity"));
    }
    tx.commit().await?;

    tracing::info!("session {id} updated");
    Ok(())
}

/// Deletes a session together with its bookings.
pub async fn delete(db: &SqlitePool, id: i64) -> Result<(), Error> {
    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM bookings WHERE session_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let done = sqlx::query("DELETE FROM sessions WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if done.rows_affected() == 0 {
        return Err(Error::NotFound("session"));
    }
    tx.commit().await?;

    tracing::info!("session {id} deleted");
    Ok(())
}

/// Books a slot of a session.
///
/// The capacity check and the increment are one statement, and the
/// booking row commits with it or not at all.
pub async fn book(db: &SqlitePool, user_id: &str, session_id: i64) -> Result<(), Error> {
    let booked: Option<i64> =
        sqlx::query_scalar("SELECT 1 FROM bookings WHERE user_id = ? AND session_id = ?")
            .bind(user_id)
            .bind(session_id)
            .fetch_optional(db)
            .await?;
    if booked.is_some() {
        return Err(Error::AlreadyBooked);
    }

    let session = get(db, session_id)
        .await?
        .ok_or(Error::NotFound("session"))?;
    if !membership::holds_active(
        db,
        user_id,
        &session.required_membership,
        &membership::current_academic_year(),
    )
    .await?
    {
        return Err(Error::MembershipRequired(session.required_membership));
    }

    let mut tx = db.begin().await?;
    let done = sqlx::query(
        "UPDATE sessions SET booked_slots = booked_slots + 1
        WHERE id = ? AND booked_slots < capacity",
    )
    .bind(session_id)
    .execute(&mut *tx)
    .await?;
    if done.rows_affected() == 0 {
        let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM sessions WHERE id = ?")
            .bind(session_id)
            .fetch_optional(&mut *tx)
            .await?;
        return Err(if exists.is_some() {
            Error::SessionFull
        } else {
            Error::NotFound("session")
        });
    }
    sqlx::query("INSERT INTO bookings (user_id, session_id) VALUES (?, ?)")
        .bind(user_id)
        .bind(session_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!("account {user_id} booked session {session_id}");
    Ok(())
}

/// Cancels a booking and gives its slot back.
pub async fn cancel(db: &SqlitePool, user_id: &str, session_id: i64) -> Result<(), Error> {
    let mut tx = db.begin().await?;
    let done = sqlx::query("DELETE FROM bookings WHERE user_id = ? AND session_id = ?")
        .bind(user_id)
        .bind(session_id)
        .execute(&mut *tx)
        .await?;
    if done.rows_affected() == 0 {
        return Err(Error::NotBooked);
    }
    sqlx::query("UPDATE sessions SET booked_slots = booked_slots - 1 WHERE id = ? AND booked_slots > 0")
        .bind(session_id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!("account {user_id} cancelled session {session_id}");
    Ok(())
}

/// Ids of the sessions an account booked.
pub async fn my_bookings(db: &SqlitePool, user_id: &str) -> Result<Vec<i64>, Error> {
    Ok(sqlx::query_scalar(
        "SELECT session_id FROM bookings WHERE user_id = ? ORDER BY session_id",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?)
}

/// Sessions an account booked, in date order.
pub async fn booked_sessions(db: &SqlitePool, user_id: &str) -> Result<Vec<Session>, Error> {
    Ok(sqlx::query_as::<_, Session>(
        "SELECT s.id, s.session_type, s.title, s.date, s.time, s.capacity, s.booked_slots,
            s.required_membership
        FROM sessions s JOIN bookings b ON b.session_id = s.id
        WHERE b.user_id = ? ORDER BY s.date, s.time, s.id",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?)
}
