//! Cart commands.
//!
//! # Environment Variables
//!
//! - `CART_API_URL` - Stock and product service (required)
//! - `CART_STORAGE_DIR` - Directory holding the persisted cart

use rocket_cart::{
    ApiClient, Cart, CartConfig, CartOutcome, CartStore, FileStore, Notice, Notifier, ProductId,
};

use super::CommandError;

/// Prints notices to stderr, like a toast in the terminal.
#[derive(Debug, Clone, Copy)]
struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    #[allow(clippy::print_stderr)]
    fn notify(&self, notice: Notice) {
        eprintln!("error: {notice}");
    }
}

/// Open the persisted cart described by `config`.
///
/// # Errors
///
/// Returns an error if the API client cannot be built or the persisted cart
/// cannot be read.
pub fn open(config: &CartConfig) -> Result<CartStore<ApiClient>, CommandError> {
    let api = ApiClient::new(&config.api)?;
    let storage = FileStore::new(&config.storage.dir);

    tracing::debug!(
        dir = %storage.base_path().display(),
        key = %config.storage.key,
        "Opening cart"
    );

    Ok(CartStore::load(
        api,
        storage,
        ConsoleNotifier,
        config.storage.key.clone(),
    )?)
}

/// Print the current cart.
pub async fn show(store: &CartStore<ApiClient>) {
    render(&store.cart().await);
}

/// Add one unit of a product.
///
/// # Errors
///
/// Returns [`CommandError::Rejected`] if the product could not be added.
pub async fn add(store: &CartStore<ApiClient>, id: ProductId) -> Result<(), CommandError> {
    finish(store, store.add_product(id).await).await
}

/// Remove a product.
///
/// # Errors
///
/// Returns [`CommandError::Rejected`] if the product is not in the cart.
pub async fn remove(store: &CartStore<ApiClient>, id: ProductId) -> Result<(), CommandError> {
    finish(store, store.remove_product(id).await).await
}

/// Set a product's quantity.
///
/// # Errors
///
/// Returns [`CommandError::Rejected`] if the quantity could not be set.
pub async fn update(
    store: &CartStore<ApiClient>,
    id: ProductId,
    amount: i64,
) -> Result<(), CommandError> {
    finish(store, store.update_product_amount(id, amount).await).await
}

async fn finish(store: &CartStore<ApiClient>, outcome: CartOutcome) -> Result<(), CommandError> {
    match outcome {
        CartOutcome::Applied(cart) => {
            render(&cart);
            Ok(())
        }
        CartOutcome::Ignored => {
            tracing::info!("Quantity must be at least 1; cart left unchanged");
            render(&store.cart().await);
            Ok(())
        }
        CartOutcome::Rejected(err) => Err(err.into()),
    }
}

#[allow(clippy::print_stdout)]
fn render(cart: &Cart) {
    if cart.is_empty() {
        println!("Cart is empty");
        return;
    }

    for item in cart {
        println!(
            "{:>6}  {:<40} {:>4} x {:>10}  {:>10}",
            format!("#{}", item.product_id()),
            item.product.title,
            item.quantity(),
            item.product.price.display(),
            item.subtotal().display(),
        );
    }

    println!(
        "Subtotal: {} ({} items)",
        cart.subtotal().display(),
        cart.total_quantity()
    );
}
