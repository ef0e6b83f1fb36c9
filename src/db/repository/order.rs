//! Order Repository
//!
//! The multi-record mutations here (stock reservation at creation, stock
//! restoration on cancellation/removal) run inside a single SurrealDB
//! transaction: either every line item's stock change and the order write
//! commit together, or none do. Stock decrements are conditional
//! (`WHERE stock >= quantity`), so two racing purchases of the last unit
//! cannot both pass; the loser's transaction throws and rolls back.

use chrono::Utc;
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use uuid::Uuid;

use super::{BaseRepository, RepoError, RepoResult, parse_record_id};
use crate::db::models::{Order, OrderLine, OrderStatus};

pub const ORDER_TABLE: &str = "order";

/// Marker embedded in THROW messages for a failed conditional stock update
const THROW_INSUFFICIENT: &str = "insufficient_stock";
/// Marker for a compare-and-swap miss on the order status
const THROW_STALE: &str = "stale_status";
/// Marker for a missing order inside a transaction
const THROW_MISSING: &str = "order_missing";

#[derive(Clone)]
pub struct OrderRepository {
    base: BaseRepository,
}

impl OrderRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    pub async fn find_by_id(&self, id: &RecordId) -> RepoResult<Option<Order>> {
        let order: Option<Order> = self.base.db().select(id.clone()).await?;
        Ok(order)
    }

    pub async fn find_by_id_str(&self, id: &str) -> RepoResult<Option<Order>> {
        let record = parse_record_id(ORDER_TABLE, id)?;
        self.find_by_id(&record).await
    }

    /// Orders placed by one buyer, newest first
    pub async fn find_by_buyer(&self, buyer: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM `order` WHERE buyer = $buyer ORDER BY created_at DESC")
            .bind(("buyer", buyer.clone()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Orders containing one seller's products, newest first
    pub async fn find_by_seller(&self, seller: &RecordId) -> RepoResult<Vec<Order>> {
        let orders: Vec<Order> = self
            .base
            .db()
            .query("SELECT * FROM `order` WHERE seller = $seller ORDER BY created_at DESC")
            .bind(("seller", seller.clone()))
            .await?
            .take(0)?;
        Ok(orders)
    }

    /// Create a pending order, reserving stock for every line atomically.
    ///
    /// Preconditions (product existence, single seller, delivery
    /// eligibility, positive quantities) are the caller's job; this method
    /// owns the stock invariant. On a stock shortfall the whole transaction
    /// rolls back and the failing line's product is named in the error.
    pub async fn create_pending(
        &self,
        buyer: RecordId,
        seller: RecordId,
        lines: Vec<OrderLine>,
        comment: String,
    ) -> RepoResult<Order> {
        if lines.is_empty() {
            return Err(RepoError::Validation("order has no line items".into()));
        }

        let total_price: f64 = lines
            .iter()
            .map(|l| l.unit_price * l.quantity as f64)
            .sum();

        let order_id = RecordId::from_table_key(ORDER_TABLE, Uuid::new_v4().simple().to_string());
        let now = Utc::now();
        let order = Order {
            id: None,
            buyer,
            seller,
            lines: lines.clone(),
            total_price,
            comment,
            status: OrderStatus::Pending,
            created_at: Some(now),
            updated_at: Some(now),
        };

        // One statement block per line item: conditional decrement, THROW on
        // shortfall (rolls the whole transaction back)
        let mut statements = vec!["BEGIN TRANSACTION".to_string()];
        for (i, _) in lines.iter().enumerate() {
            statements.push(format!(
                "LET $u{i} = (UPDATE $p{i} SET stock -= $q{i}, updated_at = $now WHERE stock >= $q{i})"
            ));
            statements.push(format!(
                "IF array::len($u{i}) == 0 {{ THROW '{THROW_INSUFFICIENT}:{i}' }}"
            ));
        }
        statements.push("CREATE $order_id CONTENT $order".to_string());
        statements.push("COMMIT TRANSACTION".to_string());
        let query_str = statements.join(";\n");

        let mut query = self
            .base
            .db()
            .query(&query_str)
            .bind(("order_id", order_id.clone()))
            .bind(("order", order))
            .bind(("now", now));
        for (i, line) in lines.iter().enumerate() {
            query = query
                .bind((format!("p{i}"), line.product.clone()))
                .bind((format!("q{i}"), line.quantity));
        }

        let result = query.await.and_then(|r| r.check());
        if let Err(e) = result {
            return Err(map_throw(e, &lines));
        }

        self.find_by_id(&order_id)
            .await?
            .ok_or_else(|| RepoError::Database("Order vanished after creation".to_string()))
    }

    /// Apply an authorized status transition.
    ///
    /// Compare-and-swap on the previous status: if another request already
    /// moved the order, the update matches nothing and the transaction
    /// throws, so the cancellation branch restores stock exactly once no
    /// matter how many cancel requests race.
    pub async fn transition(
        &self,
        order_id: &RecordId,
        from: OrderStatus,
        to: OrderStatus,
        lines: &[OrderLine],
    ) -> RepoResult<Order> {
        let restore_stock = to == OrderStatus::Cancelled && from != OrderStatus::Cancelled;

        let mut statements = vec![
            "BEGIN TRANSACTION".to_string(),
            "LET $o = (UPDATE $order_id SET status = $to, updated_at = $now WHERE status = $from)"
                .to_string(),
            format!("IF array::len($o) == 0 {{ THROW '{THROW_STALE}' }}"),
        ];
        if restore_stock {
            for (i, _) in lines.iter().enumerate() {
                statements.push(format!(
                    "UPDATE $p{i} SET stock += $q{i}, updated_at = $now"
                ));
            }
        }
        statements.push("COMMIT TRANSACTION".to_string());
        let query_str = statements.join(";\n");

        let mut query = self
            .base
            .db()
            .query(&query_str)
            .bind(("order_id", order_id.clone()))
            .bind(("from", from))
            .bind(("to", to))
            .bind(("now", Utc::now()));
        if restore_stock {
            for (i, line) in lines.iter().enumerate() {
                query = query
                    .bind((format!("p{i}"), line.product.clone()))
                    .bind((format!("q{i}"), line.quantity));
            }
        }

        let result = query.await.and_then(|r| r.check());
        if let Err(e) = result {
            return Err(map_throw(e, lines));
        }

        self.find_by_id(order_id)
            .await?
            .ok_or_else(|| RepoError::NotFound(format!("Order {order_id} not found")))
    }

    /// Administrative removal. Restores stock in the same transaction unless
    /// the order was already cancelled (its stock was restored back then).
    /// The status is re-read inside the transaction, so a racing cancel
    /// cannot cause a double restore.
    pub async fn delete(&self, order_id: &RecordId, lines: &[OrderLine]) -> RepoResult<()> {
        let mut restore = String::new();
        for (i, _) in lines.iter().enumerate() {
            restore.push_str(&format!(
                "UPDATE $p{i} SET stock += $q{i}, updated_at = $now;\n"
            ));
        }

        let query_str = format!(
            "BEGIN TRANSACTION;\n\
             LET $o = (SELECT * FROM ONLY $order_id);\n\
             IF $o == NONE {{ THROW '{THROW_MISSING}' }};\n\
             IF $o.status != 'cancelled' {{\n{restore}}};\n\
             DELETE $order_id;\n\
             COMMIT TRANSACTION"
        );

        let mut query = self
            .base
            .db()
            .query(&query_str)
            .bind(("order_id", order_id.clone()))
            .bind(("now", Utc::now()));
        for (i, line) in lines.iter().enumerate() {
            query = query
                .bind((format!("p{i}"), line.product.clone()))
                .bind((format!("q{i}"), line.quantity));
        }

        let result = query.await.and_then(|r| r.check());
        if let Err(e) = result {
            return Err(map_throw(e, lines));
        }
        Ok(())
    }
}

/// Translate transaction THROWs into repository errors
fn map_throw(e: surrealdb::Error, lines: &[OrderLine]) -> RepoError {
    let msg = e.to_string();
    if let Some(pos) = msg.find(THROW_INSUFFICIENT) {
        // "insufficient_stock:<line index>"
        let index = msg[pos + THROW_INSUFFICIENT.len()..]
            .trim_start_matches(':')
            .chars()
            .take_while(|c| c.is_ascii_digit())
            .collect::<String>()
            .parse::<usize>()
            .ok();
        let detail = index
            .and_then(|i| lines.get(i))
            .map(|l| format!("Insufficient stock for product {}", l.product))
            .unwrap_or_else(|| "Insufficient stock".to_string());
        return RepoError::Conflict(detail);
    }
    if msg.contains(THROW_STALE) {
        return RepoError::Conflict("Order status changed concurrently, please retry".to_string());
    }
    if msg.contains(THROW_MISSING) {
        return RepoError::NotFound("Order not found".to_string());
    }
    RepoError::Database(msg)
}
