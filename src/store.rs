//! Connection setup, schema migrations and constraint translation.

use std::{str::FromStr, time::Duration};

use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};

use crate::Error;

/// Opens a pool on the SQLite database at `url`, creating the file if needed.
pub async fn connect(url: &str, max_connections: u32) -> Result<SqlitePool, Error> {
    let options = SqliteConnectOptions::from_str(url)?
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .foreign_keys(true)
        .busy_timeout(Duration::from_secs(5));

    let filename = options.clone().get_filename();
    if let Some(parent) = filename.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|err| {
                tracing::error!("failed to create database directory {parent:?}: {err}");
                Error::Store
            })?;
        }
    }

    Ok(SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await?)
}

/// A forward-only schema change.
pub struct Migration {
    pub version: i64,
    pub name: &'static str,
    pub statements: &'static [&'static str],
}

/// The linear migration log. Versions are applied in order, once.
pub const MIGRATIONS: &[Migration] = &[
    Migration {
        version: 1,
        name: "accounts",
        statements: &[
            "CREATE TABLE users (
                id TEXT PRIMARY KEY NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_sha TEXT NOT NULL,
                first_name TEXT NOT NULL DEFAULT '',
                last_name TEXT NOT NULL DEFAULT '',
                role TEXT NOT NULL DEFAULT 'member',
                membership_status TEXT NOT NULL DEFAULT 'pending',
                membership_year TEXT NOT NULL,
                registered_at TEXT NOT NULL
            )",
            "CREATE TABLE user_committee_roles (
                user_id TEXT NOT NULL REFERENCES users(id) ON DELETE CASCADE,
                role TEXT NOT NULL,
                PRIMARY KEY (user_id, role)
            )",
        ],
    },
    Migration {
        version: 2,
        name: "memberships",
        statements: &[
            "CREATE TABLE membership_types (
                id TEXT PRIMARY KEY NOT NULL,
                label TEXT NOT NULL
            )",
            "INSERT INTO membership_types (id, label) VALUES ('basic', 'Basic')",
            "CREATE TABLE user_memberships (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL REFERENCES users(id),
                membership_type TEXT NOT NULL,
                status TEXT NOT NULL,
                membership_year TEXT NOT NULL,
                UNIQUE (user_id, membership_type, membership_year)
            )",
        ],
    },
    Migration {
        version: 3,
        name: "sessions",
        statements: &[
            "CREATE TABLE session_types (
                id TEXT PRIMARY KEY NOT NULL,
                label TEXT NOT NULL
            )",
            "INSERT INTO session_types (id, label) VALUES
                ('indoor', 'Indoor climbing'),
                ('bouldering', 'Bouldering'),
                ('outdoor', 'Outdoor trip'),
                ('social', 'Social')",
            "CREATE TABLE sessions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                session_type TEXT NOT NULL,
                title TEXT NOT NULL,
                date TEXT NOT NULL,
                time TEXT NOT NULL DEFAULT '',
                capacity INTEGER NOT NULL,
                booked_slots INTEGER NOT NULL DEFAULT 0,
                required_membership TEXT NOT NULL DEFAULT 'basic'
            )",
            "CREATE TABLE bookings (
                user_id TEXT NOT NULL REFERENCES users(id),
                session_id INTEGER NOT NULL REFERENCES sessions(id),
                PRIMARY KEY (user_id, session_id)
            )",
        ],
    },
    Migration {
        version: 4,
        name: "gear",
        statements: &[
            "CREATE TABLE gear (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                total_quantity INTEGER NOT NULL,
                available_quantity INTEGER NOT NULL
            )",
            "CREATE TABLE gear_requests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL REFERENCES users(id),
                gear_id INTEGER NOT NULL REFERENCES gear(id),
                status TEXT NOT NULL DEFAULT 'pending',
                request_date TEXT NOT NULL,
                return_date TEXT
            )",
        ],
    },
    Migration {
        version: 5,
        name: "elections",
        statements: &[
            "CREATE TABLE candidates (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                user_id TEXT NOT NULL UNIQUE REFERENCES users(id),
                role TEXT NOT NULL,
                manifesto TEXT NOT NULL,
                presentation_link TEXT
            )",
            // candidate_id is not a foreign key: votes outlive a withdrawn candidacy
            "CREATE TABLE votes (
                user_id TEXT PRIMARY KEY NOT NULL REFERENCES users(id),
                candidate_id INTEGER NOT NULL,
                cast_at TEXT NOT NULL
            )",
            "CREATE TABLE referendums (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL
            )",
            "CREATE TABLE referendum_votes (
                user_id TEXT NOT NULL REFERENCES users(id),
                referendum_id INTEGER NOT NULL REFERENCES referendums(id),
                choice TEXT NOT NULL,
                PRIMARY KEY (user_id, referendum_id)
            )",
            "CREATE TABLE settings (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                elections_open INTEGER NOT NULL DEFAULT 0
            )",
            "INSERT INTO settings (id, elections_open) VALUES (1, 0)",
        ],
    },
];

/// Applies every migration not yet recorded in `schema_version`.
///
/// Each migration and its version record commit together.
pub async fn migrate(db: &SqlitePool) -> Result<(), Error> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            applied_at TEXT NOT NULL
        )",
    )
    .execute(db)
    .await?;

    let applied: Vec<i64> = sqlx::query_scalar("SELECT version FROM schema_version")
        .fetch_all(db)
        .await?;

    for migration in MIGRATIONS {
        if applied.contains(&migration.version) {
            continue;
        }

        let mut tx = db.begin().await?;
        for statement in migration.statements {
            sqlx::query(statement).execute(&mut *tx).await?;
        }
        sqlx::query("INSERT INTO schema_version (version, name, applied_at) VALUES (?, ?, ?)")
            .bind(migration.version)
            .bind(migration.name)
            .bind(chrono::Utc::now().to_rfc3339())
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(
            "applied migration {} ({})",
            migration.version,
            migration.name
        );
    }

    Ok(())
}

/// Maps a unique-constraint violation on a known key to its domain error.
pub(crate) fn unique_violation(err: &sqlx::Error) -> Option<Error> {
    let err = err.as_database_error()?;
    if !err.is_unique_violation() {
        return None;
    }

    // SQLite reports "UNIQUE constraint failed: table.col[, table.col]"
    let key = err
        .message()
        .strip_prefix("UNIQUE constraint failed: ")?
        .trim();
    Some(match key {
        "users.email" => Error::DuplicateEmail,
        "bookings.user_id, bookings.session_id" => Error::AlreadyBooked,
        "votes.user_id" | "referendum_votes.user_id, referendum_votes.referendum_id" => {
            Error::AlreadyVoted
        }
        "candidates.user_id" => Error::AlreadyCandidate,
        "membership_types.id" | "session_types.id" => Error::TypeExists,
        _ => return None,
    })
}
