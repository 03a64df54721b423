//! Application state shared across the presentation layer.
//!
//! This is the composition root: it picks adapters for the configured
//! backend and wires the repositories and services on top of them.

use std::sync::Arc;

use crate::config::{Backend, StorefrontConfig};
use crate::db::{
    DocumentStore, MemoryDocumentStore, ProductRepository, ProfileRepository, RealtimeDatabase,
};
use crate::error::AppError;
use crate::services::auth::{
    AuthProvider, AuthService, IdentityToolkit, MemoryAuthProvider, SessionState,
};
use crate::services::cart::CartState;
use crate::services::checkout::{CheckoutService, PaymentGateway, SimulatedPayment};
use crate::storage::{FileKeyValueStore, KeyValueStore, MemoryKeyValueStore};

/// Adapters the services are built on.
pub struct Components {
    pub documents: Arc<dyn DocumentStore>,
    pub auth_provider: Arc<dyn AuthProvider>,
    pub storage: Arc<dyn KeyValueStore>,
    pub payment: Arc<dyn PaymentGateway>,
}

impl Components {
    /// Fully in-process components; nothing outlives the process.
    #[must_use]
    pub fn in_memory(payment: Arc<dyn PaymentGateway>) -> Self {
        Self {
            documents: Arc::new(MemoryDocumentStore::new()),
            auth_provider: Arc::new(MemoryAuthProvider::new()),
            storage: Arc::new(MemoryKeyValueStore::new()),
            payment,
        }
    }
}

/// Application state shared across all commands.
///
/// This struct is cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    products: ProductRepository,
    auth: AuthService,
    cart: CartState,
    checkout: CheckoutService,
}

impl AppState {
    /// Create the application state for `config`.
    ///
    /// # Errors
    ///
    /// Returns `AppError` if an offline snapshot cannot be read or a remote
    /// endpoint URL is invalid.
    pub fn new(config: StorefrontConfig) -> Result<Self, AppError> {
        let payment: Arc<dyn PaymentGateway> =
            Arc::new(SimulatedPayment::new(config.payment_delay));

        let components = match &config.backend {
            Backend::Memory => Components::in_memory(payment),
            Backend::Local => {
                let storage: Arc<dyn KeyValueStore> =
                    Arc::new(FileKeyValueStore::new(&config.data_dir));
                Components {
                    documents: Arc::new(MemoryDocumentStore::persisted(Arc::clone(&storage))?),
                    auth_provider: Arc::new(MemoryAuthProvider::persisted(Arc::clone(&storage))?),
                    storage,
                    payment,
                }
            }
            Backend::Remote(remote) => Components {
                documents: Arc::new(RealtimeDatabase::new(&remote.database_url)?),
                auth_provider: Arc::new(IdentityToolkit::new(
                    &remote.auth_url,
                    remote.api_key.clone(),
                )?),
                storage: Arc::new(FileKeyValueStore::new(&config.data_dir)),
                payment,
            },
        };

        tracing::debug!(
            backend = ?config.backend,
            data_dir = %config.data_dir.display(),
            "state configured"
        );
        Ok(Self::with_components(config, components))
    }

    /// Wire the services over explicit adapters.
    ///
    /// The session is resolved from storage before this returns.
    #[must_use]
    pub fn with_components(config: StorefrontConfig, components: Components) -> Self {
        let Components {
            documents,
            auth_provider,
            storage,
            payment,
        } = components;

        let session = SessionState::persisted(Arc::clone(&storage));
        session.resolve();

        let products = ProductRepository::new(Arc::clone(&documents), config.search_limit);
        let auth = AuthService::new(auth_provider, ProfileRepository::new(documents), session);
        let cart = CartState::load(storage);
        let checkout = CheckoutService::new(cart.clone(), auth.clone(), payment);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                products,
                auth,
                cart,
                checkout,
            }),
        }
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// Get a reference to the product repository.
    #[must_use]
    pub fn products(&self) -> &ProductRepository {
        &self.inner.products
    }

    /// Get a reference to the authentication service.
    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    /// Get a reference to the cart.
    #[must_use]
    pub fn cart(&self) -> &CartState {
        &self.inner.cart
    }

    /// Get a reference to the checkout service.
    #[must_use]
    pub fn checkout(&self) -> &CheckoutService {
        &self.inner.checkout
    }

    /// Get a reference to the session holder.
    #[must_use]
    pub fn session(&self) -> &SessionState {
        self.inner.auth.session()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::path::PathBuf;
    use std::time::Duration;

    use rust_decimal::Decimal;
    use shopnow_core::Category;

    use super::*;
    use crate::models::ProductData;
    use crate::services::auth::AuthState;

    fn config(backend: Backend, data_dir: PathBuf) -> StorefrontConfig {
        StorefrontConfig {
            backend,
            data_dir,
            payment_delay: Duration::ZERO,
            search_limit: None,
        }
    }

    #[test]
    fn test_session_is_resolved_on_startup() {
        let state = AppState::with_components(
            config(Backend::Memory, PathBuf::from("unused")),
            Components::in_memory(Arc::new(SimulatedPayment::new(Duration::ZERO))),
        );
        assert_eq!(state.session().current(), AuthState::SignedOut);
    }

    #[tokio::test]
    async fn test_local_backend_survives_restart() {
        let dir = tempfile::tempdir().unwrap();

        let first = AppState::new(config(Backend::Local, dir.path().to_path_buf())).unwrap();
        let product = first
            .products()
            .create(ProductData {
                name: "Camisa".to_string(),
                category: Category::Camisas,
                price: Decimal::new(50, 0),
                quantity: Some(3),
                image: None,
                description: None,
            })
            .await
            .unwrap();
        first.cart().add(&product);
        first
            .auth()
            .sign_up("ana@example.com", "segredo1", crate::models::ProfileDetails::default())
            .await
            .unwrap();

        let second = AppState::new(config(Backend::Local, dir.path().to_path_buf())).unwrap();
        assert_eq!(second.products().get(&product.id).await.unwrap(), product);
        assert_eq!(second.cart().item_count(), 1);
        assert!(second.auth().current_identity().is_some());
    }
}
