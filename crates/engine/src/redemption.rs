//! The redemption and refund manager.
//!
//! Order creation debits points, decrements stock, and persists the order in
//! one write transaction; cancellation refunds, restocks, and flips the
//! status in one transaction. The Pending-only cancel check lives inside the
//! same transaction as the refund, so a double refund cannot happen.

use chrono::{DateTime, Utc};
use clearstream_store::WriteTransaction;
use clearstream_types::{
    error::ValidationSnafu, CoreError, ItemId, Order, OrderId, OrderLine, OrderStatus,
    PointSource, Result, UserId,
};

use crate::{ledger, repo};

/// One requested line of a new order.
#[derive(Debug, Clone, Copy)]
pub struct OrderLineRequest {
    /// The item to purchase.
    pub item: ItemId,
    /// Units to purchase. Must be at least 1.
    pub quantity: u32,
}

/// Forward-only rank of fulfilment states; `None` for Cancelled, which is
/// reached only through [`cancel_order`].
fn fulfilment_rank(status: OrderStatus) -> Option<u8> {
    match status {
        OrderStatus::Pending => Some(0),
        OrderStatus::Processing => Some(1),
        OrderStatus::Shipped => Some(2),
        OrderStatus::Delivered => Some(3),
        OrderStatus::Cancelled => None,
    }
}

/// Creates a Pending order: validates every line, debits the total, and
/// decrements stock atomically.
///
/// # Errors
///
/// - `Validation` for an empty line list or a zero quantity.
/// - `ItemNotFound` / `InvalidState` (unavailable item) / `InsufficientStock`
///   per line.
/// - `InsufficientBalance` if the user cannot cover the total.
///
/// Any failure leaves no staged change behind the caller's transaction
/// boundary; the caller drops the transaction on error.
pub fn create_order(
    txn: &mut WriteTransaction<'_>,
    user_id: UserId,
    lines: &[OrderLineRequest],
    now: DateTime<Utc>,
) -> Result<Order> {
    if lines.is_empty() {
        return ValidationSnafu { message: "order must contain at least one line" }.fail();
    }

    let mut order_lines = Vec::with_capacity(lines.len());
    let mut total_points_cost = 0i64;
    for request in lines {
        if request.quantity == 0 {
            return ValidationSnafu {
                message: format!("quantity for item {} must be at least 1", request.item),
            }
            .fail();
        }
        // Staged stock decrements are visible to later duplicate lines.
        let mut item = repo::load_item(txn, request.item)?;
        if !item.is_available {
            return Err(CoreError::InvalidState {
                entity: item.id.to_string(),
                state: "unavailable".to_string(),
                action: "order".to_string(),
            });
        }
        if item.stock_quantity < request.quantity {
            return Err(CoreError::InsufficientStock {
                item_id: item.id,
                requested: request.quantity,
                available: item.stock_quantity,
            });
        }
        item.stock_quantity -= request.quantity;
        order_lines.push(OrderLine {
            item: item.id,
            quantity: request.quantity,
            points_cost: item.points_cost,
            item_name: item.name.clone(),
        });
        total_points_cost += item.points_cost * i64::from(request.quantity);
        repo::store_item(txn, &item)?;
    }

    let order_id = OrderId::new(repo::new_id()?);
    ledger::credit(
        txn,
        user_id,
        -total_points_cost,
        "Redeemed points for store order",
        PointSource::StorePurchase,
        Some(order_id.value()),
        now,
    )?;

    let order = Order {
        id: order_id,
        user: user_id,
        items: order_lines,
        total_points_cost,
        status: OrderStatus::Pending,
        created_at: now,
    };
    repo::store_order(txn, &order)?;
    tracing::info!(order = %order_id, user = %user_id, total_points_cost, "order created");
    Ok(order)
}

/// Cancels a Pending order: refunds the full cost, restores stock per line,
/// and sets Cancelled, all atomically.
///
/// # Errors
///
/// - `OrderNotFound`.
/// - `InvalidState` (as `InvalidOrderState`) if the order is not Pending,
///   which makes a second refund impossible.
pub fn cancel_order(
    txn: &mut WriteTransaction<'_>,
    order_id: OrderId,
    now: DateTime<Utc>,
) -> Result<Order> {
    let mut order = repo::load_order(txn, order_id)?;
    if order.status != OrderStatus::Pending {
        return Err(CoreError::InvalidOrderState {
            order_id,
            status: order.status,
            action: "cancel".to_string(),
        });
    }

    ledger::credit(
        txn,
        order.user,
        order.total_points_cost,
        "Refund for cancelled store order",
        PointSource::StoreRefund,
        Some(order_id.value()),
        now,
    )?;
    for line in &order.items {
        match repo::load_item(txn, line.item) {
            Ok(mut item) => {
                item.stock_quantity += line.quantity;
                repo::store_item(txn, &item)?;
            },
            Err(CoreError::ItemNotFound { item_id }) => {
                // The item was removed after purchase; the refund still stands.
                tracing::warn!(order = %order_id, item = %item_id, "cancelled line has no item to restock");
            },
            Err(e) => return Err(e),
        }
    }
    order.status = OrderStatus::Cancelled;
    repo::store_order(txn, &order)?;
    tracing::info!(order = %order_id, refunded = order.total_points_cost, "order cancelled");
    Ok(order)
}

/// Advances an order's fulfilment state.
///
/// Cancellation is routed through [`cancel_order`] so the refund semantics
/// hold. Other transitions must move forward (Pending -> Processing ->
/// Shipped -> Delivered).
///
/// # Errors
///
/// - `OrderNotFound`.
/// - `InvalidState` for a backwards transition or a terminal order.
pub fn set_order_status(
    txn: &mut WriteTransaction<'_>,
    order_id: OrderId,
    new_status: OrderStatus,
    now: DateTime<Utc>,
) -> Result<Order> {
    if new_status == OrderStatus::Cancelled {
        return cancel_order(txn, order_id, now);
    }

    let mut order = repo::load_order(txn, order_id)?;
    let (Some(current), Some(next)) =
        (fulfilment_rank(order.status), fulfilment_rank(new_status))
    else {
        return Err(CoreError::InvalidOrderState {
            order_id,
            status: order.status,
            action: format!("set status to {new_status}"),
        });
    };
    if next < current {
        return Err(CoreError::InvalidOrderState {
            order_id,
            status: order.status,
            action: format!("set status to {new_status}"),
        });
    }
    order.status = new_status;
    repo::store_order(txn, &order)?;
    tracing::debug!(order = %order_id, status = %new_status, "order status updated");
    Ok(order)
}
