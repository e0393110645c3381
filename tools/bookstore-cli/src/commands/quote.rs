//! Price a cart without checking out.

use anyhow::Result;
use bookstore_storefront::Quote;

use super::{parse_item, user_error, QuoteArgs};
use crate::context::Context;

/// Run the quote command.
pub fn run(args: QuoteArgs, ctx: &Context) -> Result<()> {
    let (store, _) = ctx.open_store()?;
    let session = store.open_session();

    for item in &args.items {
        let (title, quantity) = parse_item(item)?;
        store
            .add_to_cart(&session, &title, &quantity)
            .map_err(user_error)?;
        ctx.output.debug(&format!("Added {} x {}", quantity, title));
    }

    let cart = store.cart(&session).map_err(user_error)?;
    let quote = store
        .quote(&session, args.discount.as_deref())
        .map_err(user_error)?;
    store.close_session(&session);

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "cart": cart,
            "quote": quote,
        }));
        return Ok(());
    }

    ctx.output.header("Cart");
    for line in &cart.lines {
        let line_total = line.total_price().map_err(|e| user_error(e.into()))?;
        ctx.output.list_item(&format!(
            "{} x{} @ {} = {}",
            line.book.title,
            line.quantity,
            line.book.price.display(),
            line_total.display()
        ));
    }
    print_quote(ctx, &quote);

    Ok(())
}

fn print_quote(ctx: &Context, quote: &Quote) {
    ctx.output.info("");
    ctx.output.kv("Subtotal", &quote.pricing.subtotal.display());
    if let Some(discount) = &quote.pricing.discount {
        ctx.output.kv(
            &format!("Discount ({})", discount.code),
            &format!("-{}", discount.amount.display()),
        );
    }
    ctx.output.kv("Total", &quote.pricing.grand_total.display());

    if let Some(code) = &quote.unrecognized_code {
        ctx.output.warn(&format!("Invalid discount code: {}", code));
    }
}
