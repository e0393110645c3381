//! The storefront facade.

use crate::{StoreConfig, StoreError};
use bookstore_auth::{
    Account, AccountStore, AuthError, Identity, ProfileUpdate, Registration, SessionId,
    SessionStore,
};
use bookstore_commerce::cart::{
    parse_quantity, parse_quantity_update, CartLine, CartPricing, DiscountOutcome, DiscountTable,
};
use bookstore_commerce::catalog::{Book, Catalog};
use bookstore_commerce::checkout::{
    CheckoutReceipt, CheckoutRequest, CheckoutWorkflow, MockPaymentGateway, Order, OrderHistory,
    OrderRegistry, PaymentGateway,
};
use bookstore_commerce::ids::OrderId;
use bookstore_commerce::money::Money;
use bookstore_commerce::notification::{LogNotifier, Notifier};
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Read-only view of a session's cart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartView {
    pub lines: Vec<CartLine>,
    /// Sum of quantities.
    pub item_count: i64,
    pub total: Money,
}

impl CartView {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Price breakdown for a session's cart, without checking out.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub pricing: CartPricing,
    /// The code was entered but matched nothing.
    pub unrecognized_code: Option<String>,
}

/// An online bookstore: one catalog, many sessions.
///
/// Every method takes `&self`; shared state lives behind short-lived locks
/// inside the account, session and order stores.
pub struct Storefront {
    catalog: Catalog,
    discounts: DiscountTable,
    accounts: AccountStore,
    sessions: SessionStore,
    session_idle: Duration,
    orders: OrderRegistry,
    gateway: Arc<dyn PaymentGateway>,
    notifier: Arc<dyn Notifier>,
}

impl std::fmt::Debug for Storefront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storefront")
            .field("books", &self.catalog.len())
            .field("accounts", &self.accounts.len())
            .field("sessions", &self.sessions.len())
            .field("orders", &self.orders.len())
            .finish_non_exhaustive()
    }
}

impl Storefront {
    /// Build a store with the mock gateway and a logging notifier.
    pub fn new(config: &StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        let store = Self {
            catalog: config.catalog()?,
            discounts: config.discount_table()?,
            accounts: AccountStore::new(config.hasher()),
            sessions: SessionStore::new(config.currency),
            session_idle: config.session_idle(),
            orders: OrderRegistry::new(),
            gateway: Arc::new(MockPaymentGateway::new()),
            notifier: Arc::new(LogNotifier),
        };
        if config.seed_demo_account {
            store.accounts.seed_demo_account()?;
        }
        info!(books = store.catalog.len(), currency = %config.currency, "storefront ready");
        Ok(store)
    }

    /// Replace the payment gateway.
    pub fn with_gateway(mut self, gateway: Arc<dyn PaymentGateway>) -> Self {
        self.gateway = gateway;
        self
    }

    /// Replace the confirmation notifier.
    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }

    // Catalog

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn discounts(&self) -> &DiscountTable {
        &self.discounts
    }

    pub fn find_book(&self, title: &str) -> Result<&Book, StoreError> {
        Ok(self.catalog.get(title)?)
    }

    // Sessions and carts

    /// Start a visitor session with an empty cart.
    ///
    /// Sessions idle past the configured limit are dropped first.
    pub fn open_session(&self) -> SessionId {
        self.expire_idle_sessions_at(Utc::now());
        self.sessions.open()
    }

    /// End a session, discarding its cart. Returns whether it existed.
    pub fn close_session(&self, session: &SessionId) -> bool {
        self.sessions.close(session)
    }

    fn expire_idle_sessions_at(&self, now: DateTime<Utc>) -> usize {
        self.sessions.expire_idle(self.session_idle, now)
    }

    /// Add `quantity_input` copies of a book, as typed by the customer.
    pub fn add_to_cart(
        &self,
        session: &SessionId,
        title: &str,
        quantity_input: &str,
    ) -> Result<CartView, StoreError> {
        let quantity = parse_quantity(quantity_input)?;
        let book = self.catalog.get(title)?;
        self.sessions
            .with_session(session, |s| s.cart.add(book, quantity))??;
        self.cart(session)
    }

    /// Remove a line. Returns whether it was present.
    pub fn remove_from_cart(&self, session: &SessionId, title: &str) -> Result<bool, StoreError> {
        Ok(self.sessions.with_session(session, |s| s.cart.remove(title))?)
    }

    /// Set a line's quantity; zero or less removes it.
    ///
    /// Returns whether a line was changed.
    pub fn update_cart(
        &self,
        session: &SessionId,
        title: &str,
        quantity_input: &str,
    ) -> Result<bool, StoreError> {
        let quantity = parse_quantity_update(quantity_input)?;
        Ok(self
            .sessions
            .with_session(session, |s| s.cart.update_quantity(title, quantity))??)
    }

    pub fn clear_cart(&self, session: &SessionId) -> Result<(), StoreError> {
        Ok(self.sessions.with_session(session, |s| s.cart.clear())?)
    }

    pub fn cart(&self, session: &SessionId) -> Result<CartView, StoreError> {
        let cart = self.sessions.get(session)?.cart;
        Ok(CartView {
            item_count: cart.total_item_count(),
            total: cart.total_price()?,
            lines: cart.snapshot(),
        })
    }

    /// Price the cart with an optional discount code.
    pub fn quote(
        &self,
        session: &SessionId,
        discount_code: Option<&str>,
    ) -> Result<Quote, StoreError> {
        let cart = self.sessions.get(session)?.cart;
        let (discount, unrecognized_code) = match self.discounts.resolve(discount_code) {
            DiscountOutcome::NoCode => (None, None),
            DiscountOutcome::Applied(d) => (Some(d), None),
            DiscountOutcome::Unrecognized(code) => (None, Some(code)),
        };
        Ok(Quote {
            pricing: cart.pricing(discount)?,
            unrecognized_code,
        })
    }

    // Checkout

    /// Check out the session's cart.
    ///
    /// Payment runs on a copy of the cart with no lock held. A second
    /// checkout on the same session fails with `CheckoutInProgress` until the
    /// first one ends. On success only the ordered quantities leave the
    /// session cart, so books added meanwhile stay, and `last_order_id` is
    /// recorded; on failure the cart is untouched.
    pub fn checkout(
        &self,
        session: &SessionId,
        request: &CheckoutRequest,
    ) -> Result<CheckoutReceipt, StoreError> {
        let (mut cart, user) = self.sessions.with_session(session, |s| {
            if s.checkout_in_progress {
                return Err(AuthError::CheckoutInProgress(s.id.to_string()));
            }
            s.checkout_in_progress = true;
            Ok((s.cart.clone(), s.user.clone()))
        })??;
        let _in_flight = InFlightCheckout {
            sessions: &self.sessions,
            session,
        };

        let ordered = cart.snapshot();
        let history = user.as_ref().map(|u| self.accounts.history_for(&u.email));
        let workflow = CheckoutWorkflow::new(
            self.gateway.as_ref(),
            self.notifier.as_ref(),
            &self.orders,
            &self.discounts,
        );
        let receipt = workflow.run(
            &mut cart,
            request,
            history.as_ref().map(|h| h as &dyn OrderHistory),
        )?;

        let order_id = receipt.order.id.clone();
        let recorded = self.sessions.with_session(session, |s| {
            s.cart.deduct(&ordered);
            s.last_order_id = Some(order_id);
        });
        if let Err(e) = recorded {
            warn!(order_id = %receipt.order.id, error = %e, "session closed during checkout");
        }
        Ok(receipt)
    }

    pub fn order(&self, id: &OrderId) -> Result<Order, StoreError> {
        Ok(self.orders.get(id)?)
    }

    /// The order most recently placed from this session.
    pub fn last_order(&self, session: &SessionId) -> Result<Option<Order>, StoreError> {
        match self.sessions.get(session)?.last_order_id {
            Some(id) => Ok(Some(self.orders.get(&id)?)),
            None => Ok(None),
        }
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    // Accounts

    /// Create an account and log the session into it.
    pub fn register(
        &self,
        session: &SessionId,
        registration: &Registration,
    ) -> Result<Identity, StoreError> {
        self.sessions.get(session)?;
        let identity = self.accounts.register(registration)?;
        self.sessions.login(session, identity.clone())?;
        Ok(identity)
    }

    pub fn login(
        &self,
        session: &SessionId,
        email: &str,
        password: &str,
    ) -> Result<Identity, StoreError> {
        self.sessions.get(session)?;
        let identity = self.accounts.login(email, password)?;
        self.sessions.login(session, identity.clone())?;
        Ok(identity)
    }

    /// Log out. The cart stays with the session.
    pub fn logout(&self, session: &SessionId) -> Result<(), StoreError> {
        Ok(self.sessions.logout(session)?)
    }

    pub fn current_user(&self, session: &SessionId) -> Result<Option<Identity>, StoreError> {
        Ok(self.sessions.get(session)?.user)
    }

    fn require_user(&self, session: &SessionId) -> Result<Identity, StoreError> {
        Ok(self.sessions.get(session)?.require_user()?.clone())
    }

    /// The logged-in account.
    pub fn account(&self, session: &SessionId) -> Result<Account, StoreError> {
        let user = self.require_user(session)?;
        Ok(self.accounts.account(&user.email)?)
    }

    /// Orders placed while logged in, oldest first.
    pub fn order_history(&self, session: &SessionId) -> Result<Vec<Order>, StoreError> {
        let user = self.require_user(session)?;
        Ok(self.accounts.order_history(&user.email)?)
    }

    pub fn update_profile(
        &self,
        session: &SessionId,
        update: &ProfileUpdate,
    ) -> Result<Identity, StoreError> {
        let user = self.require_user(session)?;
        let identity = self.accounts.update_profile(&user.email, update)?;
        self.sessions.login(session, identity.clone())?;
        Ok(identity)
    }
}

/// Clears a session's checkout marker when the checkout ends, however it ends.
struct InFlightCheckout<'a> {
    sessions: &'a SessionStore,
    session: &'a SessionId,
}

impl Drop for InFlightCheckout<'_> {
    fn drop(&mut self) {
        let cleared = self
            .sessions
            .with_session(self.session, |s| s.checkout_in_progress = false);
        if cleared.is_err() {
            debug!(session = %self.session, "session gone before checkout marker cleared");
        }
    }
}
