//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::config::StorefrontConfig;
use crate::db::{
    CartStore, MemoryStore, PgCartStore, PgTransactionStore, PgUserStore, TransactionStore,
    UserStore,
};
use crate::services::auth::AuthService;
use crate::services::cart::CartService;
use crate::services::checkout::CheckoutService;
use crate::services::email::Mailer;
use crate::services::ledger::TransactionLedger;
use crate::services::receipt::{ReceiptRenderer, TextReceiptRenderer};

/// The three stores the services run on.
#[derive(Clone)]
pub struct Stores {
    pub carts: Arc<dyn CartStore>,
    pub transactions: Arc<dyn TransactionStore>,
    pub users: Arc<dyn UserStore>,
}

impl Stores {
    /// `PostgreSQL`-backed stores sharing one pool.
    #[must_use]
    pub fn postgres(pool: &PgPool) -> Self {
        Self {
            carts: Arc::new(PgCartStore::new(pool.clone())),
            transactions: Arc::new(PgTransactionStore::new(pool.clone())),
            users: Arc::new(PgUserStore::new(pool.clone())),
        }
    }

    /// Process-local stores; contents are lost on restart.
    #[must_use]
    pub fn memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            carts: store.clone(),
            transactions: store.clone(),
            users: store,
        }
    }
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// the services and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: Option<PgPool>,
    carts: CartService,
    ledger: TransactionLedger,
    checkout: CheckoutService,
    auth: AuthService,
}

impl AppState {
    /// Wire the services over `stores`, mailing through `mailer`.
    ///
    /// # Arguments
    ///
    /// * `config` - Storefront configuration
    /// * `stores` - Cart, transaction and user stores
    /// * `mailer` - Outgoing mail transport
    /// * `pool` - The pool behind `stores`, if any (used by readiness checks)
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        stores: Stores,
        mailer: Arc<dyn Mailer>,
        pool: Option<PgPool>,
    ) -> Self {
        let receipts: Arc<dyn ReceiptRenderer> =
            Arc::new(TextReceiptRenderer::new(config.receipt.clone()));
        Self::with_receipts(config, stores, mailer, receipts, pool)
    }

    /// Like [`AppState::new`] with a custom receipt renderer.
    #[must_use]
    pub fn with_receipts(
        config: StorefrontConfig,
        stores: Stores,
        mailer: Arc<dyn Mailer>,
        receipts: Arc<dyn ReceiptRenderer>,
        pool: Option<PgPool>,
    ) -> Self {
        let carts = CartService::new(stores.carts);
        let ledger = TransactionLedger::new(stores.transactions);
        let checkout = CheckoutService::new(
            carts.clone(),
            ledger.clone(),
            receipts,
            mailer.clone(),
            config.checkout,
            config.receipt.shop_name.clone(),
        );
        let auth = AuthService::new(stores.users, mailer, &config.auth);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                carts,
                ledger,
                checkout,
                auth,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get the database pool, if the stores are backed by `PostgreSQL`.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }

    #[must_use]
    pub fn carts(&self) -> &CartService {
        &self.inner.carts
    }

    #[must_use]
    pub fn ledger(&self) -> &TransactionLedger {
        &self.inner.ledger
    }

    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }
}
