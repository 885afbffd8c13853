//! Business operations
//!
//! Each operation validates its input, runs its reads and writes inside one
//! transaction, and publishes realtime change events only after commit.

pub mod accounts;
pub mod dispatch;
pub mod kitchen;
pub mod ordering;
pub mod pdv;

#[cfg(test)]
pub(crate) mod test_support;

use std::collections::HashMap;

use shared::error::{AppError, ErrorCode};
use shared::models::OrderLineInput;

use crate::db::{self, NewLine};
use crate::error::ServiceResult;

/// Price order lines from the products table; client prices are never trusted.
pub(crate) async fn price_lines(
    conn: impl sqlx::Executor<'_, Database = sqlx::Postgres>,
    store_id: i64,
    lines: &[OrderLineInput],
) -> ServiceResult<Vec<NewLine>> {
    let mut ids: Vec<i64> = lines.iter().map(|l| l.product_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let products: HashMap<i64, _> = db::menu::find_products(conn, store_id, &ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    lines
        .iter()
        .map(|line| -> ServiceResult<NewLine> {
            let product = products.get(&line.product_id).ok_or_else(|| {
                AppError::new(ErrorCode::ProductNotFound).with_detail("product_id", line.product_id)
            })?;
            if !product.is_available {
                return Err(AppError::new(ErrorCode::ProductUnavailable)
                    .with_detail("product_id", product.id)
                    .with_detail("name", product.name.clone())
                    .into());
            }
            Ok(NewLine {
                product_id: product.id,
                product_name: product.name.clone(),
                quantity: line.quantity,
                unit_price: product.price,
                notes: line
                    .notes
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .map(str::to_string),
            })
        })
        .collect()
}
