use chrono::Utc;
use log::trace;
use sqlx::SqliteConnection;

use crate::{
    db::common::StoreError,
    db_types::{Investment, NewInvestment, DEFAULT_INVESTMENT_SOURCE},
};

use ots_common::PKR_CURRENCY_CODE;

const DEFAULT_FETCH_LIMIT: u32 = 50;
const MAX_FETCH_LIMIT: u32 = 500;

pub(crate) async fn insert_investment(
    investment: NewInvestment,
    conn: &mut SqliteConnection,
) -> Result<Investment, StoreError> {
    let record = sqlx::query_as(
        r#"
            INSERT INTO investments (amount, currency, note, source, date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *;
        "#,
    )
    .bind(investment.amount)
    .bind(investment.currency.unwrap_or_else(|| PKR_CURRENCY_CODE.to_string()))
    .bind(investment.note.unwrap_or_default())
    .bind(investment.source.unwrap_or_else(|| DEFAULT_INVESTMENT_SOURCE.to_string()))
    .bind(investment.date.unwrap_or_else(Utc::now))
    .fetch_one(conn)
    .await?;
    Ok(record)
}

/// Fetches investment records, most recent first. The limit is clamped to 1..=500 and defaults to 50.
pub async fn fetch_investments(
    source: Option<&str>,
    limit: Option<u32>,
    conn: &mut SqliteConnection,
) -> Result<Vec<Investment>, StoreError> {
    let limit = limit.unwrap_or(DEFAULT_FETCH_LIMIT).clamp(1, MAX_FETCH_LIMIT) as i64;
    trace!("💰️ Fetching at most {limit} investments for source {source:?}");
    let records = match source {
        Some(source) => {
            sqlx::query_as(
                "SELECT * FROM investments WHERE source = $1 ORDER BY date DESC, created_at DESC LIMIT $2",
            )
            .bind(source)
            .bind(limit)
            .fetch_all(conn)
            .await?
        },
        None => {
            sqlx::query_as("SELECT * FROM investments ORDER BY date DESC, created_at DESC LIMIT $1")
                .bind(limit)
                .fetch_all(conn)
                .await?
        },
    };
    Ok(records)
}
