use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};

use super::rows::TableRow;
use crate::error::SeedResult;

pub fn insert_prefix<R: TableRow>() -> String {
    format!("INSERT INTO {} ({}) ", R::TABLE, R::COLUMNS.join(", "))
}

/// Inserts `rows` in multi-row batches of `batch_size` and commits once at the end.
///
/// All batches of a table share one transaction, so a failing batch leaves the
/// table as it was before the call. Tables committed earlier are not touched.
pub async fn insert_batched<R: TableRow>(
    conn: &mut PgConnection,
    rows: &[R],
    batch_size: usize,
) -> SeedResult<u64> {
    let mut tx = conn.begin().await?;
    let mut inserted = 0u64;

    for (batch_no, chunk) in rows.chunks(batch_size.max(1)).enumerate() {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(insert_prefix::<R>());
        qb.push_values(chunk, |mut b, row| row.push_binds(&mut b));

        let result = qb.build().execute(&mut *tx).await?;
        inserted += result.rows_affected();
        tracing::debug!(
            "{}: batch {} inserted {} rows",
            R::TABLE,
            batch_no + 1,
            result.rows_affected()
        );
    }

    tx.commit().await?;
    Ok(inserted)
}
