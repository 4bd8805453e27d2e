use sqlx::Row;

use super::SqliteRepository;
use super::mapping::{conn, ser};
use crate::repository::{AccountKind, CredentialRecord, CredentialRepository, StorageError};

// Table and key column per account kind. Both are fixed strings, never user input.
fn table(kind: AccountKind) -> (&'static str, &'static str) {
    match kind {
        AccountKind::User => ("users", "user_id"),
        AccountKind::Admin => ("admin_users", "username"),
    }
}

#[async_trait::async_trait]
impl CredentialRepository for SqliteRepository {
    async fn get_credential(
        &self,
        kind: AccountKind,
        account: &str,
    ) -> Result<Option<CredentialRecord>, StorageError> {
        let (table, key) = table(kind);
        let sql = format!("SELECT {key} AS account, password, updated_at FROM {table} WHERE {key} = ?1");
        let row = sqlx::query(&sql)
            .bind(account)
            .fetch_optional(&self.pool)
            .await
            .map_err(conn)?;

        row.map(|row| {
            Ok(CredentialRecord {
                account: row.try_get("account").map_err(ser)?,
                password_hash: row.try_get("password").map_err(ser)?,
                updated_at: row.try_get("updated_at").map_err(ser)?,
            })
        })
        .transpose()
    }

    async fn upsert_credential(
        &self,
        kind: AccountKind,
        record: &CredentialRecord,
    ) -> Result<bool, StorageError> {
        let (table, key) = table(kind);
        let mut tx = self.pool.begin().await.map_err(conn)?;

        let exists_sql = format!("SELECT 1 FROM {table} WHERE {key} = ?1");
        let existed = sqlx::query(&exists_sql)
            .bind(&record.account)
            .fetch_optional(&mut *tx)
            .await
            .map_err(conn)?
            .is_some();

        let upsert_sql = format!(
            "INSERT INTO {table} ({key}, password, updated_at) VALUES (?1, ?2, ?3) \
             ON CONFLICT({key}) DO UPDATE SET password = excluded.password, updated_at = excluded.updated_at"
        );
        sqlx::query(&upsert_sql)
            .bind(&record.account)
            .bind(&record.password_hash)
            .bind(record.updated_at)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;

        tx.commit().await.map_err(conn)?;
        Ok(!existed)
    }

    async fn count_credentials(&self, kind: AccountKind) -> Result<u64, StorageError> {
        let (table, _) = table(kind);
        let sql = format!("SELECT COUNT(*) FROM {table}");
        let count: i64 = sqlx::query_scalar(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(conn)?;
        u64::try_from(count).map_err(ser)
    }
}
