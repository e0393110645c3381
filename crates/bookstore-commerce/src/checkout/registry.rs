//! In-memory order registry.

use crate::checkout::Order;
use crate::error::CommerceError;
use crate::ids::OrderId;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Attempts at drawing an unused order id before giving up.
const MAX_ID_ATTEMPTS: usize = 16;

/// Every committed order, keyed by id.
///
/// The lock is held only for the map operation itself.
#[derive(Debug, Default)]
pub struct OrderRegistry {
    orders: Mutex<HashMap<OrderId, Order>>,
}

impl OrderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw an id that is not yet in the registry.
    ///
    /// The id is not reserved; [`insert`](Self::insert) still checks for
    /// collisions.
    pub fn next_id(&self) -> Result<OrderId, CommerceError> {
        let orders = self.orders.lock();
        for _ in 0..MAX_ID_ATTEMPTS {
            let id = OrderId::generate();
            if !orders.contains_key(&id) {
                return Ok(id);
            }
        }
        Err(CommerceError::Validation(
            "could not allocate a unique order id".to_string(),
        ))
    }

    /// Store a new order. Fails if the id is already taken.
    pub fn insert(&self, order: Order) -> Result<(), CommerceError> {
        let mut orders = self.orders.lock();
        if orders.contains_key(&order.id) {
            return Err(CommerceError::Validation(format!(
                "duplicate order id: {}",
                order.id
            )));
        }
        orders.insert(order.id.clone(), order);
        Ok(())
    }

    /// Look up an order by id.
    pub fn get(&self, id: &OrderId) -> Result<Order, CommerceError> {
        self.orders
            .lock()
            .get(id)
            .cloned()
            .ok_or_else(|| CommerceError::OrderNotFound(id.to_string()))
    }

    /// Number of stored orders.
    pub fn len(&self) -> usize {
        self.orders.lock().len()
    }

    /// Check if no orders are stored.
    pub fn is_empty(&self) -> bool {
        self.orders.lock().is_empty()
    }
}
