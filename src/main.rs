//! Morsel CLI
//!
//! A thin command-line consumer of the library, standing in for the
//! mobile UI: it drives the same session, cart and checkout operations
//! against a live API and keeps its state in a JSON file.

use std::{path::PathBuf, process::ExitCode, sync::Arc};

use clap::{Args, Parser, Subcommand, ValueEnum};
use morsel_core::{
    auth::SessionManager,
    cart::{Cart, CartEngine, CartLineItem},
    checkout::{
        ApiOrdersGateway, ApiPaymentsGateway, CheckoutOrchestrator, CheckoutOutcome,
        CheckoutRequest, DeliveryAddress, PaymentMethod,
    },
    config::ClientConfig,
    http::{ApiClient, HttpTransport, ReqwestTransport},
    storage::{JsonFileStore, KeyValueStore},
};
use rust_decimal::Decimal;

#[derive(Debug, Parser)]
#[command(name = "morsel", about = "Morsel food ordering CLI", long_about = None)]
struct Cli {
    /// API base URL
    #[arg(long, env = "MORSEL_API_URL", default_value = "http://localhost:3000/api")]
    api_url: String,

    /// JSON state file standing in for device storage
    #[arg(long, env = "MORSEL_STATE_FILE", default_value = ".morsel.json")]
    state_file: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Sign in and persist the session
    Login(LoginArgs),

    /// Sign out and clear the session
    Logout,

    /// Show the authenticated user's profile
    Profile,

    /// Inspect or mutate the cart
    Cart(CartCommand),

    /// Place an order from the current cart
    Order(OrderArgs),
}

#[derive(Debug, Args)]
struct LoginArgs {
    /// Account email
    #[arg(long)]
    email: String,

    /// Account password
    #[arg(long)]
    password: String,
}

#[derive(Debug, Args)]
struct CartCommand {
    #[command(subcommand)]
    command: CartSubcommand,
}

#[derive(Debug, Subcommand)]
enum CartSubcommand {
    /// Show the cart
    Show,

    /// Add an item
    Add(AddArgs),

    /// Remove the line at the given index
    Remove {
        /// Zero-based line index
        index: usize,
    },

    /// Change the quantity of the line at the given index
    Quantity {
        /// Zero-based line index
        index: usize,

        /// New quantity; zero removes the line
        quantity: u32,
    },

    /// Clear the cart
    Clear,
}

#[derive(Debug, Args)]
struct AddArgs {
    /// Restaurant the item belongs to
    #[arg(long)]
    restaurant_id: String,

    /// Restaurant display name
    #[arg(long)]
    restaurant_name: String,

    /// Menu item to add
    #[arg(long)]
    menu_item_id: String,

    /// Item display name
    #[arg(long)]
    name: String,

    /// Units to add
    #[arg(long, default_value_t = 1)]
    quantity: u32,

    /// Per-unit price including options
    #[arg(long)]
    unit_price: Decimal,

    /// Discard a cart bound to another restaurant
    #[arg(long)]
    replace: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PaymentArg {
    /// Cash on delivery
    Cod,

    /// Online payment via the gateway redirect
    Online,
}

impl From<PaymentArg> for PaymentMethod {
    fn from(arg: PaymentArg) -> Self {
        match arg {
            PaymentArg::Cod => Self::CashOnDelivery,
            PaymentArg::Online => Self::OnlineGateway,
        }
    }
}

#[derive(Debug, Args)]
struct OrderArgs {
    /// Delivery address line
    #[arg(long)]
    address: String,

    /// Delivery latitude
    #[arg(long)]
    lat: f64,

    /// Delivery longitude
    #[arg(long)]
    lng: f64,

    /// Payment method
    #[arg(long, value_enum, default_value = "cod")]
    payment: PaymentArg,

    /// Notes to the restaurant or courier
    #[arg(long)]
    notes: Option<String>,

    /// Requested delivery time for a scheduled order, RFC 3339
    #[arg(long)]
    scheduled_for: Option<jiff::Timestamp>,
}

#[tokio::main]
async fn main() -> ExitCode {
    let _env = dotenvy::dotenv();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            eprintln!("{error}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::new(cli.api_url);

    let transport: Arc<dyn HttpTransport> = Arc::new(ReqwestTransport::new(&config)?);
    let store: Arc<dyn KeyValueStore> = Arc::new(JsonFileStore::open(cli.state_file).await?);

    let session = Arc::new(SessionManager::new(Arc::clone(&transport), Arc::clone(&store)));
    let cart = Arc::new(CartEngine::new(store));
    cart.load().await;

    match cli.command {
        Commands::Login(args) => {
            let user = session.login(&args.email, &args.password).await?;

            println!("signed in as {} <{}>", user.name, user.email);
        }
        Commands::Logout => {
            session.bootstrap().await?;
            session.logout().await;

            println!("signed out");
        }
        Commands::Profile => {
            session.bootstrap().await?;

            match session.current_user().await {
                Some(user) => {
                    println!("{} <{}>", user.name, user.email);

                    for address in &user.addresses {
                        println!("  {}", address.address);
                    }
                }
                None => println!("not signed in"),
            }
        }
        Commands::Cart(CartCommand { command }) => run_cart(&cart, command).await?,
        Commands::Order(args) => {
            if !session.bootstrap().await? {
                return Err("sign in before placing an order".into());
            }

            let client = Arc::new(ApiClient::new(transport, session));
            let orchestrator = CheckoutOrchestrator::new(
                cart,
                Arc::new(ApiOrdersGateway::new(Arc::clone(&client))),
                Arc::new(ApiPaymentsGateway::new(client)),
            );

            let request = CheckoutRequest {
                address: Some(DeliveryAddress {
                    address: args.address,
                    lat: args.lat,
                    lng: args.lng,
                }),
                payment_method: args.payment.into(),
                notes: args.notes,
                scheduled_for: args.scheduled_for,
            };

            match orchestrator.place_order(request).await? {
                CheckoutOutcome::CashOnDelivery { order_id, total } => {
                    println!("order {order_id} placed, {total} due on delivery");
                }
                CheckoutOutcome::OnlinePayment {
                    order_id,
                    redirect_url,
                } => {
                    println!("order {order_id} placed, pay at {redirect_url}");
                }
            }
        }
    }

    Ok(())
}

async fn run_cart(
    cart: &CartEngine,
    command: CartSubcommand,
) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        CartSubcommand::Show => print_cart(&cart.snapshot().await),
        CartSubcommand::Add(args) => {
            if cart.would_replace_restaurant(&args.restaurant_id).await {
                if args.replace {
                    cart.clear().await;
                } else {
                    return Err(
                        "cart is bound to another restaurant; pass --replace to discard it".into(),
                    );
                }
            }

            let total_price = args.unit_price * Decimal::from(args.quantity);
            let item = CartLineItem::new(
                args.menu_item_id,
                args.name,
                Vec::new(),
                args.quantity,
                total_price,
            );

            let updated = cart
                .add_item(&args.restaurant_id, &args.restaurant_name, item)
                .await?;

            print_cart(&updated);
        }
        CartSubcommand::Remove { index } => print_cart(&cart.remove_item(index).await?),
        CartSubcommand::Quantity { index, quantity } => {
            print_cart(&cart.update_quantity(index, quantity).await?);
        }
        CartSubcommand::Clear => {
            cart.clear().await;

            println!("cart cleared");
        }
    }

    Ok(())
}

fn print_cart(cart: &Cart) {
    if cart.is_empty() {
        println!("cart is empty");
        return;
    }

    println!(
        "{} ({})",
        cart.restaurant_name,
        cart.restaurant_id.as_deref().unwrap_or("-")
    );

    for (index, line) in cart.items.iter().enumerate() {
        println!(
            "  [{index}] {} x{} = {}",
            line.name, line.quantity, line.total_price
        );
    }

    println!(
        "  subtotal {}  delivery {}  service {}  discount {}",
        cart.subtotal, cart.delivery_fee, cart.service_charge, cart.discount
    );
    println!("  total {}", cart.total);
}
