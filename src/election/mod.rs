//! Committee elections and referendums, gated by the elections switch.

pub mod handle;

use std::str::FromStr;

use chrono::Utc;
use cragclub_shared::{
    account::CommitteeRole,
    election::{handle::ApplyDescriptor, Candidate, Choice, ElectionStatus, Referendum},
};
use sqlx::SqlitePool;

use crate::{settings, Error};

async fn ensure_open(db: &SqlitePool) -> Result<(), Error> {
    if settings::load(db).await?.elections_open {
        Ok(())
    } else {
        Err(Error::ElectionsClosed)
    }
}

pub async fn status(db: &SqlitePool) -> Result<ElectionStatus, Error> {
    Ok(ElectionStatus {
        elections_open: settings::load(db).await?.elections_open,
    })
}

pub async fn set_open(db: &SqlitePool, open: bool) -> Result<(), Error> {
    settings::set_elections_open(db, open).await?;
    tracing::info!("elections {}", if open { "opened" } else { "closed" });
    Ok(())
}

/// Stands an account for a committee role.
pub async fn apply(db: &SqlitePool, user_id: &str, desc: ApplyDescriptor) -> Result<i64, Error> {
    ensure_open(db).await?;
    let role = CommitteeRole::from_str(&desc.role).map_err(|_| Error::InvalidType(desc.role))?;
    if desc.manifesto.trim().is_empty() {
        return Err(Error::InvalidInput("manifesto must not be empty"));
    }

    let standing: Option<i64> = sqlx::query_scalar("SELECT id FROM candidates WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(db)
        .await?;
    if standing.is_some() {
        return Err(Error::AlreadyCandidate);
    }

    let id: i64 = sqlx::query_scalar(
        "INSERT INTO candidates (user_id, role, manifesto, presentation_link)
        VALUES (?, ?, ?, ?) RETURNING id",
    )
    .bind(user_id)
    .bind(role)
    .bind(&desc.manifesto)
    .bind(desc.presentation_link.filter(|l| !l.trim().is_empty()))
    .fetch_one(db)
    .await?;

    tracing::info!("account {user_id} stands for {role} (candidate {id})");
    Ok(id)
}

/// Withdraws the candidacy of an account, if any.
pub async fn withdraw(db: &SqlitePool, user_id: &str) -> Result<(), Error> {
    ensure_open(db).await?;
    let done = sqlx::query("DELETE FROM candidates WHERE user_id = ?")
        .bind(user_id)
        .execute(db)
        .await?;
    if done.rows_affected() > 0 {
        tracing::info!("account {user_id} withdrew");
    }
    Ok(())
}

/// Casts the single vote of an account. Votes can't be changed.
pub async fn cast_vote(db: &SqlitePool, user_id: &str, candidate_id: i64) -> Result<(), Error> {
    ensure_open(db).await?;
    let voted: Option<i64> = sqlx::query_scalar("SELECT 1 FROM votes WHERE user_id = ?")
        .bind(user_id)
        .fetch_optional(db)
        .await?;
    if voted.is_some() {
        return Err(Error::AlreadyVoted);
    }
    let candidate: Option<i64> = sqlx::query_scalar("SELECT 1 FROM candidates WHERE id = ?")
        .bind(candidate_id)
        .fetch_optional(db)
        .await?;
    if candidate.is_none() {
        return Err(Error::NotFound("candidate"));
    }

    sqlx::query("INSERT INTO votes (user_id, candidate_id, cast_at) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(candidate_id)
        .bind(Utc::now().to_rfc3339())
        .execute(db)
        .await?;

    tracing::info!("account {user_id} voted");
    Ok(())
}

/// Candidates with their vote counts.
pub async fn candidates(db: &SqlitePool) -> Result<Vec<Candidate>, Error> {
    Ok(sqlx::query_as::<_, Candidate>(
        "SELECT c.id, c.user_id, u.first_name, u.last_name, c.role, c.manifesto,
            c.presentation_link,
            (SELECT COUNT(*) FROM votes v WHERE v.candidate_id = c.id) AS votes
        FROM candidates c JOIN users u ON u.id = c.user_id
        ORDER BY c.role, c.id",
    )
    .fetch_all(db)
    .await?)
}

pub async fn create_referendum(
    db: &SqlitePool,
    title: &str,
    description: &str,
) -> Result<i64, Error> {
    if title.trim().is_empty() {
        return Err(Error::InvalidInput("title must not be empty"));
    }
    let id: i64 = sqlx::query_scalar(
        "INSERT INTO referendums (title, description, created_at) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(title.trim())
    .bind(description)
    .bind(Utc::now().to_rfc3339())
    .fetch_one(db)
    .await?;

    tracing::info!("referendum {id} created: {title}");
    Ok(id)
}

pub async fn vote_referendum(
    db: &SqlitePool,
    user_id: &str,
    referendum_id: i64,
    choice: &str,
) -> Result<(), Error> {
    ensure_open(db).await?;
    let choice = Choice::from_str(choice).map_err(|err| Error::InvalidChoice(err.0))?;

    let referendum: Option<i64> = sqlx::query_scalar("SELECT 1 FROM referendums WHERE id = ?")
        .bind(referendum_id)
        .fetch_optional(db)
        .await?;
    if referendum.is_none() {
        return Err(Error::NotFound("referendum"));
    }
    let voted: Option<i64> = sqlx::query_scalar(
        "SELECT 1 FROM referendum_votes WHERE user_id = ? AND referendum_id = ?",
    )
    .bind(user_id)
    .bind(referendum_id)
    .fetch_optional(db)
    .await?;
    if voted.is_some() {
        return Err(Error::AlreadyVoted);
    }

    sqlx::query("INSERT INTO referendum_votes (user_id, referendum_id, choice) VALUES (?, ?, ?)")
        .bind(user_id)
        .bind(referendum_id)
        .bind(choice)
        .execute(db)
        .await?;

    tracing::info!("account {user_id} answered referendum {referendum_id}");
    Ok(())
}

/// Referendums with their tallies and the answer of `user_id`.
pub async fn referendums(db: &SqlitePool, user_id: &str) -> Result<Vec<Referendum>, Error> {
    Ok(sqlx::query_as::<_, Referendum>(
        "SELECT r.id, r.title, r.description, r.created_at,
            (SELECT COUNT(*) FROM referendum_votes v
                WHERE v.referendum_id = r.id AND v.choice = 'yes') AS yes,
            (SELECT COUNT(*) FROM referendum_votes v
                WHERE v.referendum_id = r.id AND v.choice = 'no') AS no,
            (SELECT COUNT(*) FROM referendum_votes v
                WHERE v.referendum_id = r.id AND v.choice = 'abstain') AS abstain,
            (SELECT v.choice FROM referendum_votes v
                WHERE v.referendum_id = r.id AND v.user_id = ?) AS my_choice
        FROM referendums r ORDER BY r.id DESC",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?)
}

/// Clears votes, candidacies and referendums, and closes the elections.
pub async fn reset(db: &SqlitePool) -> Result<(), Error> {
    let mut tx = db.begin().await?;
    for table in ["votes", "candidates", "referendum_votes", "referendums"] {
        sqlx::query(&format!("DELETE FROM {table}"))
            .execute(&mut *tx)
            .await?;
    }
    settings::set_elections_open(&mut *tx, false).await?;
    tx.commit().await?;

    tracing::info!("election cycle reset");
    Ok(())
}
