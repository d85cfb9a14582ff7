//! Postgres-backed order store.
//!
//! An order is written as one `orders` row plus one `order_line_items` row per
//! line, all inside a single transaction.
//!
//! ## Error Mapping
//!
//! | SQLSTATE | Meaning | Maps To |
//! |----------|---------|---------|
//! | 23505 | Unique violation | `Duplicate` |
//! | Other | N/A | `Database` |

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Row};
use tracing::instrument;

use orderflow_core::OrderNumber;
use orderflow_orders::{Order, OrderLineItem};

use super::{OrderStore, OrderStoreError};

const SCHEMA: &str = include_str!("../../migrations/0001_create_orders.sql");

/// Postgres order store.
///
/// Uses the SQLx connection pool, which is safe to share across request tasks.
#[derive(Debug, Clone)]
pub struct PostgresOrderStore {
    pool: PgPool,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, OrderStoreError> {
        let pool = PgPool::connect(database_url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the order tables if they do not exist yet.
    pub async fn migrate(&self) -> Result<(), OrderStoreError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("migrate", e))?;
        Ok(())
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    #[instrument(
        skip(self, order),
        fields(
            order_number = %order.order_number(),
            line_items = order.line_items().len()
        ),
        err
    )]
    async fn save(&self, order: &Order) -> Result<(), OrderStoreError> {
        let order_number = *order.order_number().as_uuid();

        // Dropping `tx` on any early return rolls the whole order back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_sqlx_error("begin_transaction", e))?;

        sqlx::query("INSERT INTO orders (order_number) VALUES ($1)")
            .bind(order_number)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    OrderStoreError::Duplicate(order.order_number())
                } else {
                    map_sqlx_error("insert_order", e)
                }
            })?;

        for (idx, item) in order.line_items().iter().enumerate() {
            let line_no = line_number(idx)?;
            sqlx::query(
                r#"
                INSERT INTO order_line_items (
                    order_number,
                    line_no,
                    sku_code,
                    price,
                    quantity
                )
                VALUES ($1, $2, $3, $4, $5)
                "#,
            )
            .bind(order_number)
            .bind(line_no)
            .bind(&item.sku_code)
            .bind(item.price)
            .bind(item.quantity)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_sqlx_error("insert_line_item", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| map_sqlx_error("commit_transaction", e))?;

        Ok(())
    }

    #[instrument(skip(self), fields(order_number = %order_number), err)]
    async fn find(&self, order_number: OrderNumber) -> Result<Option<Order>, OrderStoreError> {
        let id = *order_number.as_uuid();

        let exists = sqlx::query("SELECT order_number FROM orders WHERE order_number = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("load_order", e))?;
        if exists.is_none() {
            return Ok(None);
        }

        let rows = sqlx::query(
            r#"
            SELECT sku_code, price, quantity
            FROM order_line_items
            WHERE order_number = $1
            ORDER BY line_no ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_sqlx_error("load_line_items", e))?;

        let line_items = rows
            .into_iter()
            .map(|row| {
                match (
                    row.try_get::<String, _>("sku_code"),
                    row.try_get::<Decimal, _>("price"),
                    row.try_get::<i32, _>("quantity"),
                ) {
                    (Ok(sku_code), Ok(price), Ok(quantity)) => Ok(OrderLineItem {
                        sku_code,
                        price,
                        quantity,
                    }),
                    _ => Err(OrderStoreError::Corrupt(format!(
                        "unreadable line item for order {order_number}"
                    ))),
                }
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Order::restore(order_number, line_items)))
    }
}

/// 1-based `line_no` for the line at `idx`.
fn line_number(idx: usize) -> Result<i32, OrderStoreError> {
    idx.checked_add(1)
        .and_then(|n| i32::try_from(n).ok())
        .ok_or_else(|| OrderStoreError::Corrupt(format!("line index {idx} does not fit a line number")))
}

fn map_sqlx_error(operation: &'static str, err: sqlx::Error) -> OrderStoreError {
    OrderStoreError::Database {
        operation,
        message: err.to_string(),
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    if let sqlx::Error::Database(db_err) = err {
        if let Some(code) = db_err.code() {
            return code.as_ref() == "23505";
        }
    }
    false
}
