//! Bulk find/replace over the user's cached activities
//!
//! Substitutes text in one registry-named field across every local record
//! owned by the user. Changed rows are marked dirty so the next sync pushes
//! them; the whole pass is one transaction.

use sqlx::SqlitePool;

use ft_core::{EngineError, FtResult};
use ft_models::{ActivityField, FieldValue};

use crate::activities::LocalActivityRow;

/// Find/replace executor over the local cache
pub struct FindReplace {
    pool: SqlitePool,
}

impl FindReplace {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Replace `find` with `replace` in the given text field of every
    /// activity assigned to `username`. Returns the number of rows changed.
    pub async fn run(
        &self,
        username: &str,
        field: ActivityField,
        find: &str,
        replace: &str,
    ) -> FtResult<u64> {
        if !field.is_text() {
            return Err(EngineError::validation(format!(
                "{} is not a text field",
                field.display_name()
            )));
        }
        if find.is_empty() {
            return Err(EngineError::validation("search text must not be empty"));
        }

        let mut tx = self.pool.begin().await?;

        let rows: Vec<LocalActivityRow> = sqlx::query_as(
            "SELECT unique_id, project_id, assigned_to, description, discipline, \
             area, budget_mhs, quantity, uom, earn_qty_entry, percent_entry, earn_mhs_calc, \
             client_equiv_qty, client_equiv_earn_qty, deleted, updated_by, updated_utc_date, \
             sync_version \
             FROM activities WHERE assigned_to = ?",
        )
        .bind(username)
        .fetch_all(&mut *tx)
        .await?;

        let mut changed = 0u64;
        for row in rows {
            let mut activity = ft_models::Activity::from(row);
            let current = match field.get(&activity) {
                FieldValue::Text(s) => s,
                FieldValue::Number(_) => continue,
            };
            if !current.contains(find) {
                continue;
            }

            let updated = current.replace(find, replace);
            field.set(&mut activity, FieldValue::Text(updated));
            activity.touch(username);

            let column = field.name();
            let sql = format!(
                "UPDATE activities SET {column} = ?, updated_by = ?, updated_utc_date = ?, \
                 local_dirty = 1 WHERE unique_id = ?"
            );
            sqlx::query(&sql)
                .bind(field.get(&activity).as_text().unwrap_or_default())
                .bind(&activity.updated_by)
                .bind(activity.updated_utc_date)
                .bind(&activity.unique_id)
                .execute(&mut *tx)
                .await?;

            changed += 1;
        }

        tx.commit().await?;

        tracing::info!(
            username,
            field = field.name(),
            changed,
            "find/replace applied"
        );
        Ok(changed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::LocalStore;
    use ft_models::Activity;

    async fn seed(store: &LocalStore, id: &str, owner: &str, description: &str) {
        let mut a = Activity::new(id, 1);
        a.assigned_to = owner.to_string();
        a.description = description.to_string();
        let mut conn = store.pool().acquire().await.unwrap();
        store.activities().apply_pull(&mut conn, &a).await.unwrap();
    }

    #[tokio::test]
    async fn test_replaces_and_marks_dirty() {
        let store = LocalStore::open_in_memory().await.unwrap();
        seed(&store, "A1", "alice", "Weld pipe spool").await;
        seed(&store, "A2", "alice", "Paint wall").await;
        seed(&store, "B1", "bob", "Weld frame").await;

        let changed = FindReplace::new(store.pool().clone())
            .run("alice", ActivityField::Description, "Weld", "Grind")
            .await
            .unwrap();
        assert_eq!(changed, 1);

        let a1 = store.activities().get("A1").await.unwrap().unwrap();
        assert_eq!(a1.description, "Grind pipe spool");
        assert!(store.dirty().is_dirty("A1").await.unwrap());

        // Untouched rows stay clean, other owners are never modified.
        assert!(!store.dirty().is_dirty("A2").await.unwrap());
        let b1 = store.activities().get("B1").await.unwrap().unwrap();
        assert_eq!(b1.description, "Weld frame");
    }

    #[tokio::test]
    async fn test_rejects_numeric_fields() {
        let store = LocalStore::open_in_memory().await.unwrap();
        let result = FindReplace::new(store.pool().clone())
            .run("alice", ActivityField::Quantity, "1", "2")
            .await;
        assert!(result.is_err());
    }
}
