//! Scripted purchase: register, fill a cart, check out, read the history.

use anyhow::{bail, Result};
use bookstore_auth::Registration;
use bookstore_commerce::checkout::{CheckoutRequest, PaymentDetails, ShippingInfo};

use super::{user_error, DemoArgs};
use crate::context::Context;
use crate::output::status_badge;

const READER_EMAIL: &str = "reader@example.com";
const READER_PASSWORD: &str = "reader123";
const READER_NAME: &str = "Demo Reader";
const READER_ADDRESS: &str = "42 Library Lane";

const STEPS: usize = 5;

/// Run the demo command.
pub fn run(args: DemoArgs, ctx: &Context) -> Result<()> {
    let (store, outbox) = ctx.open_store()?;
    let session = store.open_session();

    ctx.output.header("Bookstore demo");

    ctx.output
        .step(1, STEPS, &format!("Registering {}", READER_EMAIL));
    let identity = store
        .register(
            &session,
            &Registration::new(READER_EMAIL, READER_PASSWORD, READER_NAME)
                .with_address(READER_ADDRESS),
        )
        .map_err(user_error)?;
    ctx.output.success(&format!("Welcome, {}!", identity.name));

    ctx.output.step(2, STEPS, "Filling the cart");
    let picks: Vec<(String, i64)> = store
        .catalog()
        .books()
        .iter()
        .take(2)
        .zip([2, 1])
        .map(|(book, quantity)| (book.title.clone(), quantity))
        .collect();
    if picks.is_empty() {
        bail!("The catalog is empty");
    }
    for (title, quantity) in &picks {
        store
            .add_to_cart(&session, title, &quantity.to_string())
            .map_err(user_error)?;
        ctx.output.list_item(&format!("{} x{}", title, quantity));
    }
    let cart = store.cart(&session).map_err(user_error)?;
    ctx.output.kv("Cart total", &cart.total.display());

    ctx.output.step(3, STEPS, "Checking out");
    let shipping = ShippingInfo::new(
        &identity.name,
        &identity.email,
        READER_ADDRESS,
        "Demo City",
        "12345",
    );
    let payment = if args.paypal {
        PaymentDetails::paypal()
    } else {
        PaymentDetails::credit_card(args.card, "12/30", "123")
    };
    let mut request = CheckoutRequest::new(shipping, payment);
    if let Some(code) = args.discount {
        request = request.with_discount(code);
    }
    let receipt = store.checkout(&session, &request).map_err(user_error)?;
    ctx.output.success(&receipt.payment_message);
    if let Some(message) = &receipt.discount_message {
        ctx.output.success(message);
    }
    for warning in &receipt.warnings {
        ctx.output.warn(warning);
    }
    ctx.output.kv("Order", receipt.order_id().as_str());
    ctx.output.kv("Total", &receipt.order.total.display());

    ctx.output.step(4, STEPS, "Confirmation email");
    let confirmation = outbox.last();
    match &confirmation {
        Some(mail) => {
            ctx.output.kv("To", &mail.to);
            ctx.output.kv("Subject", &mail.subject);
            if !ctx.output.is_json() {
                for line in mail.body.lines() {
                    println!("    {}", line);
                }
            }
        }
        None => ctx.output.warn("No confirmation was sent"),
    }

    ctx.output.step(5, STEPS, "Order history");
    let history = store.order_history(&session).map_err(user_error)?;
    for order in &history {
        ctx.output.list_item(&format!(
            "#{}  {}  {} item(s)  {}  {}",
            order.id,
            order.placed_at.format("%Y-%m-%d %H:%M"),
            order.item_count(),
            order.total.display(),
            status_badge(order.status.display_name())
        ));
    }

    if ctx.output.is_json() {
        let summaries: Vec<_> = history.iter().map(|o| o.summary()).collect();
        ctx.output.json(&serde_json::json!({
            "receipt": receipt,
            "confirmation": confirmation,
            "history": summaries,
        }));
    }

    store.close_session(&session);
    Ok(())
}
