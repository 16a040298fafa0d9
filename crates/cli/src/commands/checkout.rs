//! Checkout command.
//!
//! Builds a cart from repeated `--item ID:QTY` flags, submits it, and
//! prints the confirmation or the backend's error message verbatim.

use clap::Args;
use sandbar_client::{ApiClient, CheckoutFlow, CheckoutOutcome};
use sandbar_core::cart::CartStore;
use sandbar_core::types::{Email, ProductId};
use sandbar_core::wire::CheckoutContact;

/// Arguments for the `checkout` subcommand.
#[derive(Args)]
pub struct CheckoutArgs {
    /// Customer email address
    #[arg(short, long)]
    pub email: String,

    /// Cart line as PRODUCT_ID:QTY (repeatable)
    #[arg(short = 'i', long = "item", value_name = "ID:QTY", required = true)]
    pub items: Vec<String>,

    /// Promo code
    #[arg(long)]
    pub coupon: Option<String>,

    /// Shipping address
    #[arg(long)]
    pub address: Option<String>,

    /// Opaque payment token
    #[arg(long)]
    pub payment_token: Option<String>,
}

/// Build a cart from the arguments and run a single checkout attempt.
pub async fn run(client: &ApiClient, args: CheckoutArgs) -> Result<(), Box<dyn std::error::Error>> {
    let mut cart = CartStore::new();
    for raw in &args.items {
        let (product_id, quantity) = parse_item(raw)?;
        cart.add(product_id, quantity)?;
    }

    let contact = CheckoutContact {
        email: Email::parse(&args.email)?,
        coupon_code: args.coupon,
        address: args.address,
        payment_token: args.payment_token,
    };

    let mut flow = CheckoutFlow::new();
    let outcome = flow.submit(client, &cart, &contact).await;

    let result = match &outcome {
        CheckoutOutcome::Succeeded(confirmation) => {
            println!(
                "Order #{} ({}) - total {}",
                confirmation.order_id,
                confirmation.status,
                super::format_cents(confirmation.total_cents)
            );
            outcome.settle(&mut cart);
            Ok(())
        }
        CheckoutOutcome::Failed(error) => Err(error.user_message().into()),
    };

    super::print_trace_ids(client);
    result
}

/// Parse a `PRODUCT_ID:QTY` cart line.
fn parse_item(raw: &str) -> Result<(ProductId, i32), String> {
    let (id, quantity) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected ID:QTY, got '{raw}'"))?;
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| format!("invalid product id in '{raw}'"))?;
    let quantity: i32 = quantity
        .trim()
        .parse()
        .map_err(|_| format!("invalid quantity in '{raw}'"))?;
    Ok((ProductId::new(id), quantity))
}
