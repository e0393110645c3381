//! In-memory account store.

use crate::account::{normalize_email, Account, Identity, ProfileUpdate, Registration};
use crate::{AuthError, PasswordHasher};
use bookstore_commerce::checkout::{Order, OrderHistory};
use bookstore_commerce::CommerceError;
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Email of the account created by [`AccountStore::seed_demo_account`].
pub const DEMO_EMAIL: &str = "demo@bookstore.com";
/// Password of the demo account.
pub const DEMO_PASSWORD: &str = "demo123";
/// Name of the demo account.
pub const DEMO_NAME: &str = "Demo User";
/// Default address of the demo account.
pub const DEMO_ADDRESS: &str = "123 Demo Street, Demo City, DC 12345";

/// Accounts keyed by normalized email.
///
/// Hashing and verification run outside the lock; the lock covers only map
/// reads and writes.
#[derive(Debug, Default)]
pub struct AccountStore {
    accounts: Mutex<HashMap<String, Account>>,
    hasher: PasswordHasher,
}

impl AccountStore {
    pub fn new(hasher: PasswordHasher) -> Self {
        Self {
            accounts: Mutex::new(HashMap::new()),
            hasher,
        }
    }

    /// Create an account.
    pub fn register(&self, registration: &Registration) -> Result<Identity, AuthError> {
        registration.validate()?;
        let key = normalize_email(&registration.email);
        if self.accounts.lock().contains_key(&key) {
            return Err(AuthError::DuplicateAccount(key));
        }

        let hash = self.hasher.hash(&registration.password)?;
        let account = Account::new(
            key.clone(),
            registration.name.trim(),
            registration.address.trim(),
            hash,
        );
        let identity = account.identity();

        match self.accounts.lock().entry(key) {
            Entry::Occupied(entry) => Err(AuthError::DuplicateAccount(entry.key().clone())),
            Entry::Vacant(entry) => {
                entry.insert(account);
                info!(email = %identity.email, "account registered");
                Ok(identity)
            }
        }
    }

    /// Check credentials. Unknown email and wrong password are indistinguishable.
    pub fn login(&self, email: &str, password: &str) -> Result<Identity, AuthError> {
        let key = normalize_email(email);
        let found = self
            .accounts
            .lock()
            .get(&key)
            .map(|a| (a.password_hash().to_string(), a.identity()));

        let Some((hash, identity)) = found else {
            debug!(email = %key, "login for unknown account");
            return Err(AuthError::InvalidCredentials);
        };
        if self.hasher.verify(password, &hash)? {
            info!(email = %identity.email, "login succeeded");
            Ok(identity)
        } else {
            warn!(email = %key, "login with wrong password");
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Apply profile changes. A non-blank new password is re-hashed.
    pub fn update_profile(
        &self,
        email: &str,
        update: &ProfileUpdate,
    ) -> Result<Identity, AuthError> {
        let key = normalize_email(email);
        let new_hash = update
            .new_password()
            .map(|p| self.hasher.hash(p))
            .transpose()?;

        let mut accounts = self.accounts.lock();
        let account = accounts
            .get_mut(&key)
            .ok_or_else(|| AuthError::AccountNotFound(key.clone()))?;
        if let Some(name) = &update.name {
            account.name = name.trim().to_string();
        }
        if let Some(address) = &update.address {
            account.address = address.trim().to_string();
        }
        if let Some(hash) = new_hash {
            account.set_password_hash(hash);
            info!(email = %key, "password changed");
        }
        Ok(account.identity())
    }

    /// Snapshot of an account.
    pub fn account(&self, email: &str) -> Result<Account, AuthError> {
        let key = normalize_email(email);
        self.accounts
            .lock()
            .get(&key)
            .cloned()
            .ok_or(AuthError::AccountNotFound(key))
    }

    /// Orders placed while logged in, oldest first.
    pub fn order_history(&self, email: &str) -> Result<Vec<Order>, AuthError> {
        self.account(email).map(|a| a.order_history().to_vec())
    }

    /// Append a committed order to an account's history.
    pub fn record_order(&self, email: &str, order: &Order) -> Result<(), AuthError> {
        let key = normalize_email(email);
        let mut accounts = self.accounts.lock();
        let account = accounts
            .get_mut(&key)
            .ok_or_else(|| AuthError::AccountNotFound(key.clone()))?;
        account.record_order(order.clone());
        Ok(())
    }

    /// Handle that records checkouts into `email`'s history.
    pub fn history_for(&self, email: &str) -> AccountHistory<'_> {
        AccountHistory {
            store: self,
            email: normalize_email(email),
        }
    }

    /// Register the demo account unless it already exists.
    pub fn seed_demo_account(&self) -> Result<Identity, AuthError> {
        match self.register(
            &Registration::new(DEMO_EMAIL, DEMO_PASSWORD, DEMO_NAME).with_address(DEMO_ADDRESS),
        ) {
            Err(AuthError::DuplicateAccount(_)) => self.account(DEMO_EMAIL).map(|a| a.identity()),
            other => other,
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.lock().is_empty()
    }
}

/// An account's order history as seen by the checkout workflow.
#[derive(Debug)]
pub struct AccountHistory<'a> {
    store: &'a AccountStore,
    email: String,
}

impl OrderHistory for AccountHistory<'_> {
    fn record_order(&self, order: &Order) -> Result<(), CommerceError> {
        self.store
            .record_order(&self.email, order)
            .map_err(|e| CommerceError::OrderHistory(e.to_string()))
    }
}
