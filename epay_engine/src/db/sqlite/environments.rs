use std::collections::HashMap;

use epay_common::Secret;
use log::trace;
use sqlx::{FromRow, SqliteConnection};

use crate::{db::sqlite::SqliteDatabaseError, db_types::Environment};

#[derive(Debug, Clone, FromRow)]
struct EnvironmentRow {
    name: String,
    billing_jwt_key: String,
    billing_key: String,
    billing_url: String,
    epay_secret: String,
    merchant_id: String,
    metadata: String,
}

impl TryFrom<EnvironmentRow> for Environment {
    type Error = SqliteDatabaseError;

    fn try_from(row: EnvironmentRow) -> Result<Self, Self::Error> {
        let metadata = serde_json::from_str::<HashMap<String, String>>(&row.metadata)?;
        Ok(Self {
            name: row.name,
            billing_jwt_key: Secret::new(row.billing_jwt_key),
            billing_key: Secret::new(row.billing_key),
            billing_url: row.billing_url,
            epay_secret: Secret::new(row.epay_secret),
            merchant_id: row.merchant_id,
            metadata,
        })
    }
}

pub async fn upsert(environment: &Environment, conn: &mut SqliteConnection) -> Result<(), SqliteDatabaseError> {
    let metadata = serde_json::to_string(&environment.metadata)?;
    sqlx::query(
        r#"
            INSERT OR REPLACE INTO environments (
                name,
                billing_jwt_key,
                billing_key,
                billing_url,
                epay_secret,
                merchant_id,
                metadata
            ) VALUES ($1, $2, $3, $4, $5, $6, $7);
        "#,
    )
    .bind(&environment.name)
    .bind(environment.billing_jwt_key.reveal())
    .bind(environment.billing_key.reveal())
    .bind(&environment.billing_url)
    .bind(environment.epay_secret.reveal())
    .bind(&environment.merchant_id)
    .bind(metadata)
    .execute(conn)
    .await?;
    trace!("🗃️ Environment '{}' saved", environment.name);
    Ok(())
}

pub async fn fetch_by_name(name: &str, conn: &mut SqliteConnection) -> Result<Option<Environment>, SqliteDatabaseError> {
    let row = sqlx::query_as::<_, EnvironmentRow>(
        r#"
            SELECT name, billing_jwt_key, billing_key, billing_url, epay_secret, merchant_id, metadata
            FROM environments
            WHERE name = $1;
        "#,
    )
    .bind(name)
    .fetch_optional(conn)
    .await?;
    row.map(Environment::try_from).transpose()
}
