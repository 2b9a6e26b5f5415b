use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    models::cart::{Cart, CartError, CartItem, CartLine},
    services::notifier::{Notification, Notifier},
    storage::repositories::{CartRepository, CartRepositoryError},
};

#[derive(Error, Debug)]
pub enum CartServiceError {
    #[error("Cart error: {0}")]
    CartError(#[from] CartError),

    #[error("Repository error: {0}")]
    RepositoryError(#[from] CartRepositoryError),
}

/// The session's cart store.
///
/// Mutations go through the pure [`Cart`] methods, then the result is
/// mirrored to the repository. Saving is best-effort: a failed write is
/// logged and the in-memory cart stays authoritative.
pub struct CartService {
    cart: Mutex<Cart>,
    cart_repository: Arc<dyn CartRepository>,
    notifier: Arc<dyn Notifier>,
}

impl CartService {
    pub fn new(cart_repository: Arc<dyn CartRepository>, notifier: Arc<dyn Notifier>) -> Self {
        Self::with_cart(Cart::new(), cart_repository, notifier)
    }

    pub fn with_cart(
        cart: Cart,
        cart_repository: Arc<dyn CartRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            cart: Mutex::new(cart),
            cart_repository,
            notifier,
        }
    }

    /// Rehydrate from storage. Anything unreadable falls back to an empty cart.
    pub async fn load(
        cart_repository: Arc<dyn CartRepository>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let cart = match cart_repository.load().await {
            Ok(Some(cart)) => {
                info!(
                    "Restored cart with {} lines ({} items)",
                    cart.lines().len(),
                    cart.line_count()
                );
                cart
            }
            Ok(None) => {
                debug!("No saved cart found, starting empty");
                Cart::new()
            }
            Err(e) => {
                warn!("Discarding unreadable saved cart: {}", e);
                Cart::new()
            }
        };

        Self::with_cart(cart, cart_repository, notifier)
    }

    pub async fn add_item(&self, item: CartItem, quantity: u32) -> Result<Cart, CartServiceError> {
        let mut cart = self.cart.lock().await;
        let name = item.name.clone();
        cart.add_item(item, quantity)?;
        info!("Added {} x {} to cart", quantity, name);

        self.persist(&cart).await;
        self.notifier
            .notify(Notification::success(format!("{} added to cart", name)));
        Ok(cart.clone())
    }

    /// Unknown ids are a no-op: nothing is written and nobody is notified.
    pub async fn remove_item(&self, id: &str) -> Cart {
        let mut cart = self.cart.lock().await;
        let Some(name) = cart.line(id).map(|line| line.name.clone()) else {
            debug!("Remove ignored, no line with id {}", id);
            return cart.clone();
        };
        cart.remove_item(id);
        info!("Removed {} from cart", id);

        self.persist(&cart).await;
        self.notifier
            .notify(Notification::info(format!("{} removed from cart", name)));
        cart.clone()
    }

    /// Set the quantity of a line. Zero behaves like [`CartService::remove_item`].
    pub async fn update_quantity(&self, id: &str, quantity: u32) -> Result<Cart, CartServiceError> {
        if quantity == 0 {
            return Ok(self.remove_item(id).await);
        }

        let mut cart = self.cart.lock().await;
        if cart.update_quantity(id, quantity)? {
            info!("Set quantity of {} to {}", id, quantity);
            self.persist(&cart).await;
        } else {
            debug!("Update ignored, no line with id {}", id);
        }

        Ok(cart.clone())
    }

    /// Drop the lines of a placed order, keeping whatever was added after its snapshot.
    pub async fn remove_ordered(&self, ordered: &[CartLine]) -> Cart {
        let mut cart = self.cart.lock().await;
        cart.remove_ordered(ordered);
        if cart.is_empty() {
            info!("Ordered items removed, cart is now empty");
        } else {
            info!(
                "Ordered items removed, {} item(s) added during checkout remain",
                cart.line_count()
            );
        }

        self.persist(&cart).await;
        cart.clone()
    }

    pub async fn clear(&self) -> Cart {
        let mut cart = self.cart.lock().await;
        cart.clear();
        info!("Cart cleared");

        self.persist(&cart).await;
        self.notifier.notify(Notification::info("Cart cleared"));
        cart.clone()
    }

    pub async fn snapshot(&self) -> Cart {
        self.cart.lock().await.clone()
    }

    pub async fn total(&self) -> f64 {
        self.cart.lock().await.total()
    }

    pub async fn item_count(&self) -> u32 {
        self.cart.lock().await.line_count()
    }

    /// Write the current cart to the repository, surfacing any failure.
    pub async fn save(&self) -> Result<(), CartServiceError> {
        let cart = self.cart.lock().await;
        self.cart_repository.save(&cart).await?;
        Ok(())
    }

    async fn persist(&self, cart: &Cart) {
        if let Err(e) = self.cart_repository.save(cart).await {
            warn!("Failed to persist cart: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::repositories::InMemoryCartRepository;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct RecordingNotifier {
        notifications: std::sync::Mutex<Vec<Notification>>,
    }

    impl RecordingNotifier {
        fn messages(&self) -> Vec<String> {
            self.notifications
                .lock()
                .unwrap()
                .iter()
                .map(|n| n.message.clone())
                .collect()
        }
    }

    impl Notifier for RecordingNotifier {
        fn notify(&self, notification: Notification) {
            self.notifications.lock().unwrap().push(notification);
        }
    }

    // Repository whose writes always fail
    #[derive(Default)]
    struct BrokenRepository {
        save_attempts: AtomicUsize,
    }

    #[async_trait]
    impl CartRepository for BrokenRepository {
        async fn load(&self) -> Result<Option<Cart>, CartRepositoryError> {
            Err(CartRepositoryError::Unavailable("disk on fire".to_string()))
        }

        async fn save(&self, _cart: &Cart) -> Result<(), CartRepositoryError> {
            self.save_attempts.fetch_add(1, Ordering::SeqCst);
            Err(CartRepositoryError::Unavailable("disk on fire".to_string()))
        }

        async fn remove(&self) -> Result<(), CartRepositoryError> {
            Ok(())
        }
    }

    fn naan() -> CartItem {
        CartItem {
            id: "butter-naan".to_string(),
            name: "Butter Naan".to_string(),
            unit_price: 60.0,
            image: String::new(),
        }
    }

    fn lassi() -> CartItem {
        CartItem {
            id: "mango-lassi".to_string(),
            name: "Mango Lassi".to_string(),
            unit_price: 110.0,
            image: String::new(),
        }
    }

    #[tokio::test]
    async fn test_every_mutation_is_persisted() {
        let repo = Arc::new(InMemoryCartRepository::new());
        let service = CartService::new(repo.clone(), Arc::new(RecordingNotifier::default()));

        service.add_item(naan(), 2).await.unwrap();
        let saved = repo.load().await.unwrap().unwrap();
        assert_eq!(saved.line_count(), 2);

        service.update_quantity("butter-naan", 5).await.unwrap();
        assert_eq!(repo.load().await.unwrap().unwrap().line_count(), 5);

        service.add_item(lassi(), 1).await.unwrap();
        service.remove_item("butter-naan").await;
        let saved = repo.load().await.unwrap().unwrap();
        assert_eq!(saved.lines().len(), 1);
        assert_eq!(saved.total(), 110.0);

        service.clear().await;
        assert!(repo.load().await.unwrap().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_notifications_follow_mutations() {
        let notifier = Arc::new(RecordingNotifier::default());
        let service = CartService::new(Arc::new(InMemoryCartRepository::new()), notifier.clone());

        service.add_item(naan(), 1).await.unwrap();
        service.update_quantity("butter-naan", 3).await.unwrap();
        service.remove_item("missing").await;
        service.update_quantity("missing", 0).await.unwrap();
        service.remove_item("butter-naan").await;
        service.clear().await;

        assert_eq!(
            notifier.messages(),
            vec![
                "Butter Naan added to cart".to_string(),
                "Butter Naan removed from cart".to_string(),
                "Cart cleared".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_invalid_add_does_not_persist_or_notify() {
        let repo = Arc::new(InMemoryCartRepository::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let service = CartService::new(repo.clone(), notifier.clone());

        let result = service.add_item(naan(), 0).await;
        assert!(matches!(
            result,
            Err(CartServiceError::CartError(CartError::InvalidQuantity { .. }))
        ));
        assert!(repo.payload().is_none());
        assert!(notifier.messages().is_empty());
    }

    #[tokio::test]
    async fn test_update_to_zero_removes_line() {
        let service = CartService::new(
            Arc::new(InMemoryCartRepository::new()),
            Arc::new(RecordingNotifier::default()),
        );
        service.add_item(naan(), 2).await.unwrap();
        service.add_item(lassi(), 1).await.unwrap();

        let cart = service.update_quantity("butter-naan", 0).await.unwrap();
        assert!(cart.line("butter-naan").is_none());
        assert_eq!(service.item_count().await, 1);
        assert_eq!(service.total().await, 110.0);
    }

    #[tokio::test]
    async fn test_missing_id_leaves_storage_untouched() {
        let repo = Arc::new(InMemoryCartRepository::new());
        let service = CartService::new(repo.clone(), Arc::new(RecordingNotifier::default()));

        service.remove_item("missing").await;
        service.update_quantity("missing", 4).await.unwrap();
        assert!(repo.payload().is_none());

        service.add_item(naan(), 1).await.unwrap();
        let saved = repo.payload();
        service.remove_item("missing").await;
        assert_eq!(repo.payload(), saved);
    }

    #[tokio::test]
    async fn test_update_overflow_is_reported() {
        let service = CartService::new(
            Arc::new(InMemoryCartRepository::new()),
            Arc::new(RecordingNotifier::default()),
        );
        service.add_item(naan(), u32::MAX - 1).await.unwrap();
        service.add_item(lassi(), 1).await.unwrap();

        let result = service.update_quantity("mango-lassi", 2).await;
        assert!(matches!(
            result,
            Err(CartServiceError::CartError(CartError::QuantityOverflow { .. }))
        ));
        assert_eq!(service.item_count().await, u32::MAX);
    }

    #[tokio::test]
    async fn test_remove_ordered_persists_remaining_lines() {
        let repo = Arc::new(InMemoryCartRepository::new());
        let service = CartService::new(repo.clone(), Arc::new(RecordingNotifier::default()));
        service.add_item(naan(), 2).await.unwrap();
        let ordered = service.snapshot().await.lines().to_vec();
        service.add_item(lassi(), 1).await.unwrap();

        let cart = service.remove_ordered(&ordered).await;
        assert!(cart.line("butter-naan").is_none());
        assert_eq!(cart.line_count(), 1);
        assert_eq!(repo.load().await.unwrap().unwrap(), cart);
    }

    #[tokio::test]
    async fn test_save_failure_is_best_effort() {
        let repo = Arc::new(BrokenRepository::default());
        let service = CartService::new(repo.clone(), Arc::new(RecordingNotifier::default()));

        let cart = service.add_item(naan(), 1).await.unwrap();
        assert_eq!(cart.line_count(), 1);
        assert_eq!(repo.save_attempts.load(Ordering::SeqCst), 1);

        assert!(matches!(
            service.save().await,
            Err(CartServiceError::RepositoryError(_))
        ));
    }

    #[tokio::test]
    async fn test_load_falls_back_to_empty() {
        let broken = CartService::load(
            Arc::new(BrokenRepository::default()),
            Arc::new(RecordingNotifier::default()),
        )
        .await;
        assert!(broken.snapshot().await.is_empty());

        let corrupt = CartService::load(
            Arc::new(InMemoryCartRepository::with_payload(r#"{"lines": 7}"#)),
            Arc::new(RecordingNotifier::default()),
        )
        .await;
        assert!(corrupt.snapshot().await.is_empty());
    }

    #[tokio::test]
    async fn test_reload_restores_same_cart() {
        let repo = Arc::new(InMemoryCartRepository::new());
        let service = CartService::new(repo.clone(), Arc::new(RecordingNotifier::default()));
        service.add_item(naan(), 3).await.unwrap();
        service.add_item(lassi(), 2).await.unwrap();

        let reloaded = CartService::load(repo, Arc::new(RecordingNotifier::default())).await;
        assert_eq!(reloaded.snapshot().await, service.snapshot().await);
    }
}
