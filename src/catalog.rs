//! Admin-editable lists of valid type identifiers.

use cragclub_shared::membership::CatalogEntry;
use sqlx::SqlitePool;

use crate::Error;

/// The membership type every account is seeded with.
pub const BASIC: &str = "basic";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Catalog {
    Membership,
    Session,
}

impl Catalog {
    #[inline]
    fn table(self) -> &'static str {
        match self {
            Catalog::Membership => "membership_types",
            Catalog::Session => "session_types",
        }
    }

    pub async fn list(self, db: &SqlitePool) -> Result<Vec<CatalogEntry>, Error> {
        Ok(sqlx::query_as::<_, CatalogEntry>(&format!(
            "SELECT id, label FROM {} ORDER BY id",
            self.table()
        ))
        .fetch_all(db)
        .await?)
    }

    pub async fn exists(self, db: &SqlitePool, id: &str) -> Result<bool, Error> {
        let found: Option<i64> =
            sqlx::query_scalar(&format!("SELECT 1 FROM {} WHERE id = ?", self.table()))
                .bind(id)
                .fetch_optional(db)
                .await?;
        Ok(found.is_some())
    }

    /// Fails with [`Error::InvalidType`] if `id` is not listed.
    pub async fn check(self, db: &SqlitePool, id: &str) -> Result<(), Error> {
        if self.exists(db, id).await? {
            Ok(())
        } else {
            Err(Error::InvalidType(id.to_owned()))
        }
    }

    pub async fn add(self, db: &SqlitePool, id: &str, label: &str) -> Result<(), Error> {
        let id = id.trim();
        if id.is_empty() {
            return Err(Error::InvalidInput("type id must not be empty"));
        }
        sqlx::query(&format!(
            "INSERT INTO {} (id, label) VALUES (?, ?)",
            self.table()
        ))
        .bind(id)
        .bind(label)
        .execute(db)
        .await?;
        tracing::info!("added {} {id}", self.table());
        Ok(())
    }

    /// Removes a type. Rows already referencing it are left alone.
    pub async fn remove(self, db: &SqlitePool, id: &str) -> Result<(), Error> {
        if self == Catalog::Membership && id == BASIC {
            return Err(Error::ProtectedType);
        }
        let done = sqlx::query(&format!("DELETE FROM {} WHERE id = ?", self.table()))
            .bind(id)
            .execute(db)
            .await?;
        if done.rows_affected() == 0 {
            return Err(Error::NotFound("type"));
        }
        tracing::info!("removed {} {id}", self.table());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn basic_is_protected() {
        let db = crate::tests::migrated_store().await;
        assert!(matches!(
            Catalog::Membership.remove(&db, BASIC).await,
            Err(Error::ProtectedType)
        ));
        assert!(Catalog::Membership.exists(&db, BASIC).await.unwrap());
    }

    #[tokio::test]
    async fn add_and_remove() {
        let db = crate::tests::migrated_store().await;
        Catalog::Session.add(&db, "yoga", "Yoga").await.unwrap();
        assert!(matches!(
            Catalog::Session.add(&db, "yoga", "Yoga again").await,
            Err(Error::TypeExists)
        ));
        assert!(Catalog::Session
            .list(&db)
            .await
            .unwrap()
            .iter()
            .any(|e| e.id == "yoga"));

        Catalog::Session.remove(&db, "yoga").await.unwrap();
        assert!(matches!(
            Catalog::Session.remove(&db, "yoga").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            Catalog::Session.check(&db, "yoga").await,
            Err(Error::InvalidType(_))
        ));
    }
}
