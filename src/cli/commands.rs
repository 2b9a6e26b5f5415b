use std::sync::Arc;

use anyhow::{Context, Result};
use console::{style, Emoji};
use dialoguer::{theme::ColorfulTheme, Confirm, Input};
use tracing::{error, info, warn};

use crate::{
    cli::args::*,
    models::{
        cart::{Cart, CartItem},
        menu::{Menu, MenuItem},
        order::CheckoutRequest,
    },
    services::{
        CartService, CartServiceError, CheckoutError, CheckoutService, Notification,
        NotificationLevel, Notifier, SimulatedPaymentGateway,
    },
    storage::{repositories::LocalStorageCartRepository, LocalStorage},
    utils::{
        formatting::{format_cart_table, format_currency, format_menu_table, format_order_summary, render_receipt},
        Config,
    },
};

static CHECKMARK: Emoji<'_, '_> = Emoji("✅ ", "");
static CROSS: Emoji<'_, '_> = Emoji("❌ ", "");
static INFO: Emoji<'_, '_> = Emoji("ℹ️ ", "");
static CART: Emoji<'_, '_> = Emoji("🛒 ", "");

/// Prints notifications to the terminal.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, notification: Notification) {
        match notification.level {
            NotificationLevel::Success => {
                println!("{} {}", CHECKMARK, style(&notification.message).green())
            }
            NotificationLevel::Info => println!("{} {}", INFO, notification.message),
            NotificationLevel::Error => {
                println!("{} {}", CROSS, style(&notification.message).red())
            }
        }
    }
}

pub struct CliApp {
    menu: Menu,
    cart_service: Arc<CartService>,
    checkout_service: Arc<CheckoutService>,
}

impl CliApp {
    pub async fn new(config: &Config) -> Result<Self> {
        let storage = LocalStorage::open(&config.storage_dir)
            .await
            .context("Failed to initialize cart storage")?;
        let cart_repo = Arc::new(LocalStorageCartRepository::new(
            storage,
            config.storage_key.clone(),
        ));
        let notifier = Arc::new(ConsoleNotifier);

        let cart_service = Arc::new(CartService::load(cart_repo, notifier.clone()).await);
        let gateway = Arc::new(SimulatedPaymentGateway::new(config.payment_delay));
        let checkout_service = Arc::new(CheckoutService::new(
            cart_service.clone(),
            gateway,
            notifier,
            config.checkout_settings(),
        ));

        Ok(Self {
            menu: Menu::default_catalog(),
            cart_service,
            checkout_service,
        })
    }

    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Menu { category } => self.handle_menu(category),
            Commands::Add { id, quantity } => self.handle_add(id, quantity).await,
            Commands::Remove { id } => self.handle_remove(id).await,
            Commands::Update { id, quantity } => self.handle_update(id, quantity).await,
            Commands::Clear { force } => self.handle_clear(force).await,
            Commands::Show => self.handle_show().await,
            Commands::Checkout(args) => self.handle_checkout(args).await,
        }
    }

    fn handle_menu(&self, category: Option<MenuCategory>) -> Result<()> {
        let items: Vec<&MenuItem> = match category {
            Some(category) => self.menu.by_category(category.into()),
            None => self.menu.items().iter().collect(),
        };

        if items.is_empty() {
            println!("{} No dishes in this category", INFO);
        } else {
            println!("{}", format_menu_table(&items));
        }
        Ok(())
    }

    async fn handle_add(&self, id: String, quantity: u32) -> Result<()> {
        let Some(menu_item) = self.menu.find(&id) else {
            println!("{} No dish with id '{}' on the menu", CROSS, style(&id).red());
            println!("Use {} to see what's available", style("restaurant-cart menu").cyan());
            return Ok(());
        };

        match self
            .cart_service
            .add_item(CartItem::from(menu_item), quantity)
            .await
        {
            Ok(cart) => print_cart_footer(&cart),
            Err(CartServiceError::CartError(e)) => {
                println!("{} Could not add item: {}", CROSS, style(&e).red());
                warn!("Rejected add of {}: {}", id, e);
            }
            Err(e) => {
                println!("{} Could not add item: {}", CROSS, style(&e).red());
                error!("Failed to add {}: {}", id, e);
            }
        }

        Ok(())
    }

    async fn handle_remove(&self, id: String) -> Result<()> {
        if self.cart_service.snapshot().await.line(&id).is_none() {
            println!("{} '{}' is not in your cart", INFO, id);
            return Ok(());
        }

        let cart = self.cart_service.remove_item(&id).await;
        print_cart_footer(&cart);
        Ok(())
    }

    async fn handle_update(&self, id: String, quantity: u32) -> Result<()> {
        match self.cart_service.update_quantity(&id, quantity).await {
            Ok(cart) => {
                if quantity > 0 && cart.line(&id).is_none() {
                    println!("{} '{}' is not in your cart", INFO, id);
                }
                print_cart_footer(&cart);
            }
            Err(e) => {
                println!("{} Could not update quantity: {}", CROSS, style(&e).red());
                warn!("Rejected update of {}: {}", id, e);
            }
        }
        Ok(())
    }

    async fn handle_clear(&self, force: bool) -> Result<()> {
        if !force {
            let confirmed = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt("Remove everything from the cart?")
                .default(false)
                .interact()?;
            if !confirmed {
                println!("{} Cart left as is", INFO);
                return Ok(());
            }
        }

        self.cart_service.clear().await;
        Ok(())
    }

    async fn handle_show(&self) -> Result<()> {
        let cart = self.cart_service.snapshot().await;
        if cart.is_empty() {
            println!("{} Your cart is empty", CART);
        } else {
            println!("{} {}", CART, style("Your cart").bold().cyan());
            println!("{}", format_cart_table(&cart));
        }
        Ok(())
    }

    async fn handle_checkout(&self, args: CheckoutArgs) -> Result<()> {
        let cart = self.cart_service.snapshot().await;
        if cart.is_empty() {
            println!("{} Your cart is empty, add something first", CART);
            return Ok(());
        }
        println!("{}", format_cart_table(&cart));

        let theme = ColorfulTheme::default();
        let customer_name = match args.name {
            Some(name) => name,
            None => Input::<String>::with_theme(&theme)
                .with_prompt("Name")
                .interact_text()?,
        };
        let phone = match args.phone {
            Some(phone) => phone,
            None => Input::<String>::with_theme(&theme)
                .with_prompt("Phone")
                .interact_text()?,
        };

        let request = CheckoutRequest {
            customer_name,
            phone,
            email: args.email,
            order_type: args.order_type.into(),
            table_number: args.table,
            payment_method: args.payment.into(),
            discount: args.discount,
            special_instructions: args.notes,
        };

        println!("{} Processing {} payment...", INFO, args.payment);
        match self.checkout_service.checkout(request).await {
            Ok(receipt) => {
                if args.json {
                    println!("{}", serde_json::to_string_pretty(&receipt)?);
                } else {
                    println!("{}", format_order_summary(&receipt.order));
                    println!("{}", render_receipt(&receipt.bill));
                }
                info!("Checkout completed for order {}", receipt.order.id);
            }
            // Already surfaced through the notifier
            Err(CheckoutError::ValidationError { .. }) | Err(CheckoutError::EmptyCart) => {}
            Err(e @ CheckoutError::PaymentError(_)) => {
                error!("Checkout failed: {}", e);
            }
            Err(e) => {
                println!("{} Checkout failed: {}", CROSS, style(&e).red());
                error!("Checkout failed: {}", e);
            }
        }

        Ok(())
    }
}

fn print_cart_footer(cart: &Cart) {
    println!(
        "{} {} item(s), total {}",
        CART,
        cart.line_count(),
        style(format_currency(cart.total())).green()
    );
}
