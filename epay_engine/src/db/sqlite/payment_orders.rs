use chrono::{DateTime, Utc};
use log::trace;
use sqlx::{FromRow, SqliteConnection};

use crate::{db::sqlite::SqliteDatabaseError, db_types::PaymentOrderRecord};

#[derive(Debug, Clone, FromRow)]
struct PaymentOrderRow {
    transaction_id: String,
    subscriber_id: String,
    customer_name: String,
    client_id: String,
    amount: String,
    created_at: DateTime<Utc>,
    processed_on: Option<DateTime<Utc>>,
    invoice_ids: Option<String>,
}

impl TryFrom<PaymentOrderRow> for PaymentOrderRecord {
    type Error = SqliteDatabaseError;

    fn try_from(row: PaymentOrderRow) -> Result<Self, Self::Error> {
        // Older rows may hold NULL, an empty string or a JSON `null` here. All of them mean "no invoices".
        let invoice_ids = match row.invoice_ids.as_deref().map(str::trim) {
            None | Some("") => Vec::new(),
            Some(json) => serde_json::from_str::<Option<Vec<String>>>(json)?.unwrap_or_default(),
        };
        Ok(Self {
            transaction_id: row.transaction_id,
            subscriber_id: row.subscriber_id,
            customer_name: row.customer_name,
            client_id: row.client_id,
            amount: row.amount,
            created_at: row.created_at,
            processed_on: row.processed_on,
            invoice_ids,
        })
    }
}

/// Inserts the order, or replaces every column of an existing order with the same transaction id.
pub async fn upsert(order: &PaymentOrderRecord, conn: &mut SqliteConnection) -> Result<(), SqliteDatabaseError> {
    let invoice_ids = serde_json::to_string(&order.invoice_ids)?;
    sqlx::query(
        r#"
            INSERT OR REPLACE INTO payment_orders (
                transaction_id,
                subscriber_id,
                customer_name,
                client_id,
                amount,
                created_at,
                processed_on,
                invoice_ids
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8);
        "#,
    )
    .bind(&order.transaction_id)
    .bind(&order.subscriber_id)
    .bind(&order.customer_name)
    .bind(&order.client_id)
    .bind(&order.amount)
    .bind(order.created_at)
    .bind(order.processed_on)
    .bind(invoice_ids)
    .execute(conn)
    .await?;
    trace!("🗃️ Payment order {} saved", order.transaction_id);
    Ok(())
}

/// Fetches the order with the given transaction id, or `None` if there is no such order.
pub async fn fetch_by_transaction_id(
    transaction_id: &str,
    conn: &mut SqliteConnection,
) -> Result<Option<PaymentOrderRecord>, SqliteDatabaseError> {
    let row = sqlx::query_as::<_, PaymentOrderRow>(
        r#"
            SELECT
                transaction_id,
                subscriber_id,
                customer_name,
                client_id,
                amount,
                created_at,
                processed_on,
                invoice_ids
            FROM payment_orders
            WHERE transaction_id = $1;
        "#,
    )
    .bind(transaction_id)
    .fetch_optional(conn)
    .await?;
    row.map(PaymentOrderRecord::try_from).transpose()
}
