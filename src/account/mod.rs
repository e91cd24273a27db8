//! Accounts, credentials and committee privileges.

pub mod handle;
pub mod token;

use std::str::FromStr;

use cragclub_shared::{
    account::{handle::AccountEditDescriptor, CommitteeRole, Role, UserView},
    membership::MembershipStatus,
};
use sqlx::SqlitePool;

use crate::{config::Config, membership, Auth, Error};

#[derive(sqlx::FromRow)]
struct UserRow {
    id: String,
    email: String,
    password_sha: String,
    first_name: String,
    last_name: String,
    role: Role,
    membership_status: MembershipStatus,
    membership_year: String,
}

const SELECT_USER: &str = "SELECT id, email, password_sha, first_name, last_name, role,
    membership_status, membership_year FROM users";

async fn user(db: &SqlitePool, id: &str) -> Result<Option<UserRow>, Error> {
    Ok(
        sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE id = ?"))
            .bind(id)
            .fetch_optional(db)
            .await?,
    )
}

/// Committee roles of an account in declaration order.
pub async fn committee_roles(db: &SqlitePool, id: &str) -> Result<Vec<CommitteeRole>, Error> {
    let names: Vec<String> =
        sqlx::query_scalar("SELECT role FROM user_committee_roles WHERE user_id = ?")
            .bind(id)
            .fetch_all(db)
            .await?;
    let mut roles: Vec<CommitteeRole> = names
        .iter()
        .filter_map(|n| match CommitteeRole::from_str(n) {
            Ok(role) => Some(role),
            Err(err) => {
                tracing::warn!("account {id} holds {err}");
                None
            }
        })
        .collect();
    roles.sort();
    Ok(roles)
}

/// Resolves the principal behind a verified token.
///
/// Returns `None` if the account no longer exists.
pub async fn principal(
    db: &SqlitePool,
    config: &Config,
    account: &str,
    token: &str,
) -> Result<Option<Auth>, Error> {
    let Some(user) = user(db, account).await? else {
        return Ok(None);
    };
    Ok(Some(Auth {
        committee_roles: committee_roles(db, account).await?,
        is_root: config.is_root_email(&user.email),
        account: user.id,
        token: token.to_owned(),
        role: user.role,
    }))
}

/// Checks the credential of an account by email.
///
/// Returns the account id.
pub async fn verify_password(db: &SqlitePool, email: &str, password: &str) -> Result<String, Error> {
    let user = sqlx::query_as::<_, UserRow>(&format!("{SELECT_USER} WHERE email = ?"))
        .bind(email.trim().to_lowercase())
        .fetch_optional(db)
        .await?
        .ok_or(Error::UsernameOrPasswordIncorrect)?;
    if user.password_sha == sha256::digest(password) {
        Ok(user.id)
    } else {
        Err(Error::UsernameOrPasswordIncorrect)
    }
}

async fn check_password(db: &SqlitePool, id: &str, password: &str) -> Result<(), Error> {
    let user = user(db, id).await?.ok_or(Error::NotFound("account"))?;
    if user.password_sha == sha256::digest(password) {
        Ok(())
    } else {
        Err(Error::UsernameOrPasswordIncorrect)
    }
}

/// The API view of an account, including its membership rows.
pub async fn view(db: &SqlitePool, id: &str) -> Result<UserView, Error> {
    let user = user(db, id).await?.ok_or(Error::NotFound("account"))?;
    Ok(UserView {
        committee_roles: committee_roles(db, id).await?,
        memberships: membership::rows_of(db, id).await?,
        id: user.id,
        email: user.email,
        first_name: user.first_name,
        last_name: user.last_name,
        role: user.role,
        membership_status: user.membership_status,
        membership_year: user.membership_year,
    })
}

/// Edits the profile of an account. A password change needs the old one.
pub async fn edit(db: &SqlitePool, id: &str, desc: AccountEditDescriptor) -> Result<(), Error> {
    if let Some(change) = &desc.password {
        check_password(db, id, &change.old).await?;
        if change.new.is_empty() {
            return Err(Error::InvalidInput("password must not be empty"));
        }
    }

    let mut tx = db.begin().await?;
    if let Some(first_name) = &desc.first_name {
        sqlx::query("UPDATE users SET first_name = ? WHERE id = ?")
            .bind(first_name.trim())
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    if let Some(last_name) = &desc.last_name {
        sqlx::query("UPDATE users SET last_name = ? WHERE id = ?")
            .bind(last_name.trim())
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    if let Some(change) = &desc.password {
        sqlx::query("UPDATE users SET password_sha = ? WHERE id = ?")
            .bind(sha256::digest(change.new.as_str()))
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!("account {id} edited");
    Ok(())
}

pub async fn list(db: &SqlitePool) -> Result<Vec<UserView>, Error> {
    let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM users ORDER BY registered_at, id")
        .fetch_all(db)
        .await?;
    let mut views = Vec::with_capacity(ids.len());
    for id in ids {
        views.push(view(db, &id).await?);
    }
    Ok(views)
}

async fn email_of(db: &SqlitePool, id: &str) -> Result<String, Error> {
    sqlx::query_scalar("SELECT email FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(Error::NotFound("account"))
}

/// Makes an account an active committee member, along with its `basic`
/// row for the account's membership year.
pub async fn promote(db: &SqlitePool, id: &str) -> Result<(), Error> {
    let mut tx = db.begin().await?;
    let year: String = sqlx::query_scalar(
        "UPDATE users SET role = 'committee', membership_status = 'active' WHERE id = ?
        RETURNING membership_year",
    )
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(Error::NotFound("account"))?;
    membership::force_basic(&mut *tx, id, MembershipStatus::Active, &year).await?;
    tx.commit().await?;

    tracing::info!("account {id} promoted");
    Ok(())
}

/// Makes a committee member an ordinary member and clears its committee roles.
pub async fn demote(db: &SqlitePool, config: &Config, id: &str) -> Result<(), Error> {
    if config.is_root_email(&email_of(db, id).await?) {
        return Err(Error::PermissionDenied);
    }

    let mut tx = db.begin().await?;
    sqlx::query("UPDATE users SET role = 'member' WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    sqlx::query("DELETE FROM user_committee_roles WHERE user_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!("account {id} demoted");
    Ok(())
}

/// Replaces the committee roles of a committee member.
pub async fn set_committee_roles(
    db: &SqlitePool,
    id: &str,
    roles: &[CommitteeRole],
) -> Result<(), Error> {
    let role: Role = sqlx::query_scalar("SELECT role FROM users WHERE id = ?")
        .bind(id)
        .fetch_optional(db)
        .await?
        .ok_or(Error::NotFound("account"))?;
    if role != Role::Committee {
        return Err(Error::InvalidInput("committee roles need a committee member"));
    }

    let mut tx = db.begin().await?;
    sqlx::query("DELETE FROM user_committee_roles WHERE user_id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    for role in roles {
        sqlx::query("INSERT OR IGNORE INTO user_committee_roles (user_id, role) VALUES (?, ?)")
            .bind(id)
            .bind(role)
            .execute(&mut *tx)
            .await?;
    }
    tx.commit().await?;

    tracing::info!("account {id} holds {roles:?}");
    Ok(())
}

/// Deletes an account and everything it owns in one transaction.
///
/// Sessions give back the slots of the account's bookings. Gear lent to
/// the account is not restocked.
pub async fn delete_user(db: &SqlitePool, config: &Config, id: &str) -> Result<(), Error> {
    if config.is_root_email(&email_of(db, id).await?) {
        return Err(Error::PermissionDenied);
    }

    let mut tx = db.begin().await?;
    sqlx::query(
        "UPDATE sessions SET booked_slots = booked_slots - 1
        WHERE booked_slots > 0 AND id IN (SELECT session_id FROM bookings WHERE user_id = ?)",
    )
    .bind(id)
    .execute(&mut *tx)
    .await?;
    for table in [
        "bookings",
        "votes",
        "referendum_votes",
        "candidates",
        "gear_requests",
        "user_committee_roles",
        "user_memberships",
    ] {
        sqlx::query(&format!("DELETE FROM {table} WHERE user_id = ?"))
            .bind(id)
            .execute(&mut *tx)
            .await?;
    }
    sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    tracing::info!("account {id} deleted");
    Ok(())
}

/// Deletes the caller's own account after checking its password.
pub async fn delete_self(
    db: &SqlitePool,
    config: &Config,
    id: &str,
    password: &str,
) -> Result<(), Error> {
    check_password(db, id, password).await?;
    delete_user(db, config, id).await
}

/// Creates the root account, or restores its privileges if it exists.
pub async fn ensure_root(db: &SqlitePool, config: &Config) -> Result<(), Error> {
    let email = membership::normalize_email(&config.root_email)?;
    let year = membership::current_academic_year();

    let existing: Option<String> = sqlx::query_scalar("SELECT id FROM users WHERE email = ?")
        .bind(&email)
        .fetch_optional(db)
        .await?;
    let mut tx = db.begin().await?;
    let id = match existing {
        Some(id) => {
            sqlx::query(
                "UPDATE users SET role = 'committee', membership_status = 'active' WHERE id = ?",
            )
            .bind(&id)
            .execute(&mut *tx)
            .await?;
            id
        }
        None => {
            let id = membership::new_user_id();
            sqlx::query(
                "INSERT INTO users (id, email, password_sha, first_name, last_name, role,
                    membership_status, membership_year, registered_at)
                VALUES (?, ?, ?, 'Root', '', 'committee', 'active', ?, ?)",
            )
            .bind(&id)
            .bind(&email)
            .bind(sha256::digest(config.root_password.as_str()))
            .bind(&year)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await?;
            tracing::info!("root account {email} created (id {id})");
            id
        }
    };
    membership::force_basic(&mut *tx, &id, MembershipStatus::Active, &year).await?;
    tx.commit().await?;
    Ok(())
}
