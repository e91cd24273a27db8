//! Stock-bounded lending of club equipment.

pub mod handle;

use chrono::Utc;
use cragclub_shared::gear::{handle::GearDescriptor, GearItem, GearRequest, GearRequestStatus};
use sqlx::SqlitePool;

use crate::Error;

const SELECT_GEAR: &str =
    "SELECT id, name, description, total_quantity, available_quantity FROM gear";
const SELECT_REQUEST: &str =
    "SELECT id, user_id, gear_id, status, request_date, return_date FROM gear_requests";

fn validate(desc: &GearDescriptor) -> Result<(), Error> {
    if desc.name.trim().is_empty() {
        return Err(Error::InvalidInput("name must not be empty"));
    }
    if desc.total_quantity < 0 {
        return Err(Error::InvalidInput("total quantity must not be negative"));
    }
    Ok(())
}

pub async fn list(db: &SqlitePool) -> Result<Vec<GearItem>, Error> {
    Ok(
        sqlx::query_as::<_, GearItem>(&format!("{SELECT_GEAR} ORDER BY name, id"))
            .fetch_all(db)
            .await?,
    )
}

pub async fn get(db: &SqlitePool, id: i64) -> Result<Option<GearItem>, Error> {
    Ok(
        sqlx::query_as::<_, GearItem>(&format!("{SELECT_GEAR} WHERE id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await?,
    )
}

/// Adds a gear item with its whole stock available.
pub async fn create(db: &SqlitePool, desc: GearDescriptor) -> Result<i64, Error> {
    validate(&desc)?;
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO gear (name, description, total_quantity, available_quantity)
        VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(desc.name.trim())
    .bind(&desc.description)
    .bind(desc.total_quantity)
    .bind(desc.total_quantity)
    .fetch_one(db)
    .await?;

    tracing::info!("gear {id} created: {} x{}", desc.name, desc.total_quantity);
    Ok(id)
}

/// Rewrites a gear item.
///
/// `available` overrides the stock and must lie within the new total.
/// Without it the stock is capped at the new total.
pub async fn update(
    db: &SqlitePool,
    id: i64,
    desc: GearDescriptor,
    available: Option<i64>,
) -> Result<(), Error> {
    validate(&desc)?;
    if available.map_or(false, |a| a < 0 || a > desc.total_quantity) {
        return Err(Error::InvalidInput("available quantity out of range"));
    }

    let done = sqlx::query(
        "UPDATE gear SET name = ?, description = ?, total_quantity = ?,
            available_quantity = COALESCE(?, MIN(available_quantity, ?))
        WHERE id = ?",
    )
    .bind(desc.name.trim())
    .bind(&desc.description)
    .bind(desc.total_quantity)
    .bind(available)
    .bind(desc.total_quantity)
    .bind(id)
    .execute(db)
    .await?;
    if done.rows_affected() == 0 {
        return Err(Error::NotFound("gear"));
    }

    tracing::info!("gear {id} updated");
    Ok(())
}

/// Deletes a gear item together with its requests.
pub async fn delete(db: &SqlitePool, id: i64) -> Result<(), Error> {
    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM gear_requests WHERE gear_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    let done = sqlx::query("DELETE FROM gear WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    if done.rows_affected() == 0 {
        return Err(Error::NotFound("gear"));
    }
    tx.commit().await?;

    tracing::info!("gear {id} deleted");
    Ok(())
}

/// Files a pending request. Stock is only taken on approval.
pub async fn request(db: &SqlitePool, user_id: &str, gear_id: i64) -> Result<i64, Error> {
    let gear = get(db, gear_id).await?.ok_or(Error::NotFound("gear"))?;
    if gear.available_quantity <= 0 {
        return Err(Error::OutOfStock);
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO gear_requests (user_id, gear_id, status, request_date)
        VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(gear_id)
    .bind(GearRequestStatus::Pending)
    .bind(Utc::now().to_rfc3339())
    .fetch_one(db)
    .await?;

    tracing::info!("account {user_id} requested gear {gear_id} (request {id})");
    Ok(id)
}

/// Status of a request, or [`Error::NotFound`].
async fn status_of(
    exec: &mut sqlx::SqliteConnection,
    request_id: i64,
) -> Result<GearRequestStatus, Error> {
    sqlx::query_scalar("SELECT status FROM gear_requests WHERE id = ?")
        .bind(request_id)
        .fetch_optional(exec)
        .await?
        .ok_or(Error::NotFound("gear request"))
}

/// Approves a pending request and takes one unit of stock.
pub async fn approve(db: &SqlitePool, request_id: i64) -> Result<(), Error> {
    let mut tx = db.begin().await?;
    let gear_id: Option<i64> = sqlx::query_scalar(
        "UPDATE gear_requests SET status = 'approved' WHERE id = ? AND status = 'pending'
        RETURNING gear_id",
    )
    .bind(request_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some(gear_id) = gear_id else {
        status_of(&mut tx, request_id).await?;
        return Err(Error::NotPending);
    };

    let done = sqlx::query(
        "UPDATE gear SET available_quantity = available_quantity - 1
        WHERE id = ? AND available_quantity > 0",
    )
    .bind(gear_id)
    .execute(&mut *tx)
    .await?;
    if done.rows_affected() == 0 {
        return Err(Error::OutOfStock);
    }
    tx.commit().await?;

    tracing::info!("gear request {request_id} approved");
    Ok(())
}

/// Rejects a pending request.
pub async fn reject(db: &SqlitePool, request_id: i64) -> Result<(), Error> {
    let mut tx = db.begin().await?;
    let done = sqlx::query(
        "UPDATE gear_requests SET status = 'rejected' WHERE id = ? AND status = 'pending'",
    )
    .bind(request_id)
    .execute(&mut *tx)
    .await?;
    if done.rows_affected() == 0 {
        status_of(&mut tx, request_id).await?;
        return Err(Error::NotPending);
    }
    tx.commit().await?;

    tracing::info!("gear request {request_id} rejected");
    Ok(())
}

/// Marks an approved request returned and gives its unit back.
pub async fn return_gear(db: &SqlitePool, request_id: i64) -> Result<(), Error> {
    let mut tx = db.begin().await?;
    let gear_id: Option<i64> = sqlx::query_scalar(
        "UPDATE gear_requests SET status = 'returned', return_date = ?
        WHERE id = ? AND status = 'approved' RETURNING gear_id",
    )
    .bind(Utc::now().to_rfc3339())
    .bind(request_id)
    .fetch_optional(&mut *tx)
    .await?;
    let Some(gear_id) = gear_id else {
        status_of(&mut tx, request_id).await?;
        return Err(Error::NotApproved);
    };

    sqlx::query(
        "UPDATE gear SET available_quantity = MIN(available_quantity + 1, total_quantity)
        WHERE id = ?",
    )
    .bind(gear_id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    tracing::info!("gear request {request_id} returned");
    Ok(())
}

/// Requests of one account, or of everyone when `user_id` is `None`.
pub async fn requests(db: &SqlitePool, user_id: Option<&str>) -> Result<Vec<GearRequest>, Error> {
    Ok(match user_id {
        Some(user_id) => {
            sqlx::query_as::<_, GearRequest>(&format!(
                "{SELECT_REQUEST} WHERE user_id = ? ORDER BY id DESC"
            ))
            .bind(user_id)
            .fetch_all(db)
            .await?
        }
        None => {
            sqlx::query_as::<_, GearRequest>(&format!("{SELECT_REQUEST} ORDER BY id DESC"))
                .fetch_all(db)
                .await?
        }
    })
}
