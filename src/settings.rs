//! The single-row club settings table.

use sqlx::{Executor, Sqlite};

use crate::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::FromRow)]
pub struct Settings {
    pub elections_open: bool,
}

pub async fn load<'e, E>(exec: E) -> Result<Settings, Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    Ok(
        sqlx::query_as::<_, Settings>("SELECT elections_open FROM settings WHERE id = 1")
            .fetch_one(exec)
            .await?,
    )
}

pub async fn set_elections_open<'e, E>(exec: E, open: bool) -> Result<(), Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query("UPDATE settings SET elections_open = ? WHERE id = 1")
        .bind(open)
        .execute(exec)
        .await?;
    Ok(())
}
