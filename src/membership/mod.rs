//! Per-user, per-type, per-year memberships and the account status they drive.

pub mod handle;

use chrono::{Datelike, NaiveDate, Utc};
use cragclub_shared::{
    account::{handle::RegisterDescriptor, handle::RegisterResult, Role},
    membership::{MembershipRow, MembershipStatus},
};
use rand::Rng;
use sqlx::{Sqlite, SqlitePool};

use crate::{
    catalog::{Catalog, BASIC},
    config::Config,
    notify::{Mail, Notifier},
    Error,
};

/// The academic year containing `date`, rolling over every September.
pub fn academic_year_of(date: NaiveDate) -> String {
    let year = date.year();
    if date.month0() < 8 {
        format!("{}/{}", year - 1, year)
    } else {
        format!("{}/{}", year, year + 1)
    }
}

#[inline]
pub fn current_academic_year() -> String {
    academic_year_of(Utc::now().date_naive())
}

/// Inserts a row or settles a conflict by status priority:
/// the stored status is replaced when it is `rejected` or ranks lower.
const UPSERT_BY_PRIORITY: &str = "INSERT INTO user_memberships
        (user_id, membership_type, status, membership_year) VALUES (?, ?, ?, ?)
    ON CONFLICT (user_id, membership_type, membership_year) DO UPDATE SET status = excluded.status
    WHERE user_memberships.status = 'rejected'
        OR (CASE excluded.status WHEN 'active' THEN 2 WHEN 'pending' THEN 1 ELSE 0 END)
            > (CASE user_memberships.status WHEN 'active' THEN 2 WHEN 'pending' THEN 1 ELSE 0 END)";

/// Inserts a row or overwrites the stored status unconditionally.
const UPSERT_FORCED: &str = "INSERT INTO user_memberships
        (user_id, membership_type, status, membership_year) VALUES (?, ?, ?, ?)
    ON CONFLICT (user_id, membership_type, membership_year) DO UPDATE SET status = excluded.status";

async fn upsert<'e, E>(
    exec: E,
    sql: &'static str,
    user_id: &str,
    membership_type: &str,
    status: MembershipStatus,
    year: &str,
) -> Result<(), Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    sqlx::query(sql)
        .bind(user_id)
        .bind(membership_type)
        .bind(status)
        .bind(year)
        .execute(exec)
        .await?;
    Ok(())
}

/// Overwrites the `basic` row of `user_id` for `year` with `status`.
pub(crate) async fn force_basic<'e, E>(
    exec: E,
    user_id: &str,
    status: MembershipStatus,
    year: &str,
) -> Result<(), Error>
where
    E: sqlx::Executor<'e, Database = Sqlite>,
{
    upsert(exec, UPSERT_FORCED, user_id, BASIC, status, year).await
}

/// Status a new request starts at for an account of `role`.
#[inline]
fn initial_status(role: Role) -> MembershipStatus {
    match role {
        Role::Committee => MembershipStatus::Active,
        Role::Member => MembershipStatus::Pending,
    }
}

/// Validates and normalizes an email address.
pub(crate) fn normalize_email(email: &str) -> Result<String, Error> {
    let email = email.trim().to_lowercase();
    email.parse::<lettre::Address>()?;
    Ok(email)
}

/// Generates an opaque account id.
pub(crate) fn new_user_id() -> String {
    format!("{:016x}", rand::thread_rng().gen::<u64>())
}

/// Creates an account together with its `basic` membership for the current year.
///
/// Addresses on a committee domain, and the root address, join as active
/// committee members.
pub async fn register_user(
    db: &SqlitePool,
    config: &Config,
    desc: RegisterDescriptor,
) -> Result<RegisterResult, Error> {
    let email = normalize_email(&desc.email)?;
    if desc.password.is_empty() {
        return Err(Error::InvalidInput("password must not be empty"));
    }

    let exists: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(db)
        .await?;
    if exists.is_some() {
        return Err(Error::DuplicateEmail);
    }

    let role = if config.is_committee_email(&email) || config.is_root_email(&email) {
        Role::Committee
    } else {
        Role::Member
    };
    let status = initial_status(role);
    let year = current_academic_year();
    let id = new_user_id();

    let mut tx = db.begin().await?;
    sqlx::query(
        "INSERT INTO users (id, email, password_sha, first_name, last_name, role,
            membership_status, membership_year, registered_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(&id)
    .bind(&email)
    .bind(sha256::digest(desc.password))
    .bind(desc.first_name.trim())
    .bind(desc.last_name.trim())
    .bind(role)
    .bind(status)
    .bind(&year)
    .bind(Utc::now().to_rfc3339())
    .execute(&mut *tx)
    .await?;
    upsert(&mut *tx, UPSERT_BY_PRIORITY, &id, BASIC, status, &year).await?;
    tx.commit().await?;

    tracing::info!("account registered: {email} (id {id}, {role})");
    Ok(RegisterResult {
        account_id: id,
        role,
        membership_status: status,
    })
}

/// Sets the top-level status of an account and its `basic` row for the
/// account's membership year, then notifies the account.
async fn decide_user(
    db: &SqlitePool,
    config: &Config,
    notifier: &Notifier,
    user_id: &str,
    status: MembershipStatus,
) -> Result<(), Error> {
    let (email, year): (String, String) =
        sqlx::query_as("SELECT email, membership_year FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or(Error::NotFound("account"))?;
    if config.is_root_email(&email) && status != MembershipStatus::Active {
        return Err(Error::PermissionDenied);
    }

    let mut tx = db.begin().await?;
    sqlx::query("UPDATE users SET membership_status = ? WHERE id = ?")
        .bind(status)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    upsert(&mut *tx, UPSERT_FORCED, user_id, BASIC, status, &year).await?;
    tx.commit().await?;

    tracing::info!("account {user_id} set {status} for {year}");
    notifier
        .notify(Mail::membership_decision(
            &email,
            BASIC,
            &year,
            status == MembershipStatus::Active,
        ))
        .await;
    Ok(())
}

#[inline]
pub async fn approve_user(
    db: &SqlitePool,
    config: &Config,
    notifier: &Notifier,
    user_id: &str,
) -> Result<(), Error> {
    decide_user(db, config, notifier, user_id, MembershipStatus::Active).await
}

/// The root account can't be rejected.
#[inline]
pub async fn reject_user(
    db: &SqlitePool,
    config: &Config,
    notifier: &Notifier,
    user_id: &str,
) -> Result<(), Error> {
    decide_user(db, config, notifier, user_id, MembershipStatus::Rejected).await
}

/// Sets the status of one membership row. A `basic` row carries its
/// status over to the owning account, so the root account's `basic` rows
/// can only be approved.
async fn decide_row(
    db: &SqlitePool,
    config: &Config,
    notifier: &Notifier,
    row_id: i64,
    status: MembershipStatus,
) -> Result<(), Error> {
    let mut tx = db.begin().await?;
    let (user_id, membership_type, year): (String, String, String) = sqlx::query_as(
        "UPDATE user_memberships SET status = ? WHERE id = ?
        RETURNING user_id, membership_type, membership_year",
    )
    .bind(status)
    .bind(row_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(Error::NotFound("membership"))?;

    let email: String = sqlx::query_scalar("SELECT email FROM users WHERE id = ?")
        .bind(&user_id)
        .fetch_one(&mut *tx)
        .await?;
    if membership_type == BASIC {
        if config.is_root_email(&email) && status != MembershipStatus::Active {
            return Err(Error::PermissionDenied);
        }
        sqlx::query("UPDATE users SET membership_status = ? WHERE id = ?")
            .bind(status)
            .bind(&user_id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!("membership {row_id} ({membership_type} {year}) of {user_id} set {status}");
    notifier
        .notify(Mail::membership_decision(
            &email,
            &membership_type,
            &year,
            status == MembershipStatus::Active,
        ))
        .await;
    Ok(())
}

#[inline]
pub async fn approve_row(
    db: &SqlitePool,
    config: &Config,
    notifier: &Notifier,
    row_id: i64,
) -> Result<(), Error> {
    decide_row(db, config, notifier, row_id, MembershipStatus::Active).await
}

#[inline]
pub async fn reject_row(
    db: &SqlitePool,
    config: &Config,
    notifier: &Notifier,
    row_id: i64,
) -> Result<(), Error> {
    decide_row(db, config, notifier, row_id, MembershipStatus::Rejected).await
}

/// Removes a membership row. Removing the last active `basic` row of an
/// account reverts the account to `pending`.
///
/// `basic` rows of the root account can't be removed.
pub async fn delete_row(db: &SqlitePool, config: &Config, row_id: i64) -> Result<(), Error> {
    let mut tx = db.begin().await?;
    let (user_id, membership_type, status): (String, String, MembershipStatus) = sqlx::query_as(
        "DELETE FROM user_memberships WHERE id = ? RETURNING user_id, membership_type, status",
    )
    .bind(row_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(Error::NotFound("membership"))?;

    if membership_type == BASIC {
        let email: String = sqlx::query_scalar("SELECT email FROM users WHERE id = ?")
            .bind(&user_id)
            .fetch_one(&mut *tx)
            .await?;
        if config.is_root_email(&email) {
            return Err(Error::PermissionDenied);
        }
    }
    if membership_type == BASIC && status == MembershipStatus::Active {
        let remaining: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM user_memberships
            WHERE user_id = ? AND membership_type = ? AND status = 'active'",
        )
        .bind(&user_id)
        .bind(BASIC)
        .fetch_one(&mut *tx)
        .await?;
        if remaining == 0 {
            sqlx::query("UPDATE users SET membership_status = 'pending' WHERE id = ?")
                .bind(&user_id)
                .execute(&mut *tx)
                .await?;
            tracing::info!("account {user_id} reverted to pending");
        }
    }
    tx.commit().await?;

    tracing::info!("membership {row_id} of {user_id} deleted");
    Ok(())
}

async fn row(
    db: &SqlitePool,
    user_id: &str,
    membership_type: &str,
    year: &str,
) -> Result<MembershipRow, Error> {
    Ok(sqlx::query_as::<_, MembershipRow>(
        "SELECT id, user_id, membership_type, status, membership_year FROM user_memberships
        WHERE user_id = ? AND membership_type = ? AND membership_year = ?",
    )
    .bind(user_id)
    .bind(membership_type)
    .bind(year)
    .fetch_one(db)
    .await?)
}

/// Requests a membership of `membership_type` for `year`, the current
/// academic year by default.
///
/// Concurrent requests for the same key settle on one row by status priority.
pub async fn request_additional(
    db: &SqlitePool,
    user_id: &str,
    role: Role,
    membership_type: &str,
    year: Option<String>,
) -> Result<MembershipRow, Error> {
    Catalog::Membership.check(db, membership_type).await?;
    let year = year.unwrap_or_else(current_academic_year);
    upsert(
        db,
        UPSERT_BY_PRIORITY,
        user_id,
        membership_type,
        initial_status(role),
        &year,
    )
    .await?;

    tracing::info!("account {user_id} requested {membership_type} for {year}");
    row(db, user_id, membership_type, &year).await
}

/// Starts a new membership year for an account.
///
/// The account status is reset and one row per type is requested. `types`
/// defaults to `basic` alone.
pub async fn renew(
    db: &SqlitePool,
    user_id: &str,
    role: Role,
    year: Option<String>,
    mut types: Vec<String>,
) -> Result<Vec<MembershipRow>, Error> {
    if types.is_empty() {
        types.push(BASIC.to_owned());
    }
    for t in &types {
        Catalog::Membership.check(db, t).await?;
    }
    let year = year.unwrap_or_else(current_academic_year);
    let status = initial_status(role);

    let mut tx = db.begin().await?;
    let done = sqlx::query("UPDATE users SET membership_status = ?, membership_year = ? WHERE id = ?")
        .bind(status)
        .bind(&year)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;
    if done.rows_affected() == 0 {
        return Err(Error::NotFound("account"));
    }
    for t in &types {
        upsert(&mut *tx, UPSERT_BY_PRIORITY, user_id, t, status, &year).await?;
    }
    tx.commit().await?;

    tracing::info!("account {user_id} renewed for {year}: {types:?}");
    Ok(rows_of(db, user_id)
        .await?
        .into_iter()
        .filter(|r| r.membership_year == year)
        .collect())
}

/// Asks again after a rejection: the account and its `basic` row for the
/// current academic year go back to `pending`.
///
/// Only rejected accounts may ask again. The root account never can.
pub async fn re_request(db: &SqlitePool, config: &Config, user_id: &str) -> Result<(), Error> {
    let (email, status): (String, MembershipStatus) =
        sqlx::query_as("SELECT email, membership_status FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(db)
            .await?
            .ok_or(Error::NotFound("account"))?;
    if config.is_root_email(&email) {
        return Err(Error::PermissionDenied);
    }
    if status != MembershipStatus::Rejected {
        return Err(Error::NotRejected);
    }
    let year = current_academic_year();

    let mut tx = db.begin().await?;
    let done = sqlx::query(
        "UPDATE users SET membership_status = 'pending', membership_year = ?
        WHERE id = ? AND membership_status = 'rejected'",
    )
    .bind(&year)
    .bind(user_id)
    .execute(&mut *tx)
    .await?;
    if done.rows_affected() == 0 {
        return Err(Error::NotRejected);
    }
    force_basic(&mut *tx, user_id, MembershipStatus::Pending, &year).await?;
    tx.commit().await?;

    tracing::info!("account {user_id} re-requested membership for {year}");
    Ok(())
}

pub async fn rows_of(db: &SqlitePool, user_id: &str) -> Result<Vec<MembershipRow>, Error> {
    Ok(sqlx::query_as::<_, MembershipRow>(
        "SELECT id, user_id, membership_type, status, membership_year FROM user_memberships
        WHERE user_id = ? ORDER BY membership_year DESC, membership_type",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?)
}

/// Whether an account holds an active membership of `membership_type` in `year`.
pub async fn holds_active(
    db: &SqlitePool,
    user_id: &str,
    membership_type: &str,
    year: &str,
) -> Result<bool, Error> {
    let found: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM user_memberships
        WHERE user_id = ? AND membership_type = ? AND membership_year = ? AND status = 'active'",
    )
    .bind(user_id)
    .bind(membership_type)
    .bind(year)
    .fetch_optional(db)
    .await?;
    Ok(found.is_some())
}
