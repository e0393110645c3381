//! Interactive shopping session.

use anyhow::Result;
use bookstore_auth::{ProfileUpdate, Registration, SessionId, DEMO_EMAIL, DEMO_PASSWORD};
use bookstore_commerce::checkout::{CheckoutRequest, PaymentDetails, ShippingInfo};
use bookstore_storefront::{StoreError, Storefront};
use dialoguer::{Confirm, Input, Password, Select};

use super::ShopArgs;
use crate::context::Context;
use crate::output::status_badge;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Browse,
    Add,
    Update,
    Remove,
    Empty,
    ViewCart,
    Checkout,
    Login,
    Register,
    Profile,
    History,
    Logout,
    Quit,
}

impl Action {
    fn label(&self) -> &'static str {
        match self {
            Action::Browse => "Browse books",
            Action::Add => "Add a book to the cart",
            Action::Update => "Change a quantity",
            Action::Remove => "Remove a book",
            Action::Empty => "Empty the cart",
            Action::ViewCart => "View cart",
            Action::Checkout => "Check out",
            Action::Login => "Log in",
            Action::Register => "Register",
            Action::Profile => "Edit profile",
            Action::History => "Order history",
            Action::Logout => "Log out",
            Action::Quit => "Quit",
        }
    }

    /// Menu entries for the current login state.
    fn menu(logged_in: bool) -> Vec<Action> {
        let mut actions = vec![
            Action::Browse,
            Action::Add,
            Action::Update,
            Action::Remove,
            Action::Empty,
            Action::ViewCart,
            Action::Checkout,
        ];
        if logged_in {
            actions.extend([Action::Profile, Action::History, Action::Logout]);
        } else {
            actions.extend([Action::Login, Action::Register]);
        }
        actions.push(Action::Quit);
        actions
    }
}

/// Run the shop command.
pub fn run(args: ShopArgs, ctx: &Context) -> Result<()> {
    let (store, _) = ctx.open_store()?;
    let session = store.open_session();

    ctx.output.header("Welcome to the bookstore");
    if args.demo_login {
        report(ctx, store.login(&session, DEMO_EMAIL, DEMO_PASSWORD).map(|identity| {
            ctx.output.success(&format!("Welcome back, {}!", identity.name));
        }));
    }

    loop {
        let logged_in = store.current_user(&session).ok().flatten();
        let actions = Action::menu(logged_in.is_some());
        let labels: Vec<&str> = actions.iter().map(|a| a.label()).collect();
        let prompt = match &logged_in {
            Some(user) => format!("[{}] What next?", user.email),
            None => "What next?".to_string(),
        };

        let selection = Select::new()
            .with_prompt(prompt)
            .items(&labels)
            .default(0)
            .interact()?;

        let outcome = match actions[selection] {
            Action::Browse => {
                browse(ctx, &store);
                Ok(())
            }
            Action::Add => add(ctx, &store, &session)?,
            Action::Update => update(ctx, &store, &session)?,
            Action::Remove => remove(ctx, &store, &session)?,
            Action::Empty => empty(ctx, &store, &session)?,
            Action::ViewCart => show_cart(ctx, &store, &session),
            Action::Checkout => checkout(ctx, &store, &session)?,
            Action::Login => login(ctx, &store, &session)?,
            Action::Register => register(ctx, &store, &session)?,
            Action::Profile => profile(ctx, &store, &session)?,
            Action::History => history(ctx, &store, &session),
            Action::Logout => store.logout(&session).map(|()| {
                ctx.output.success("You have been logged out.");
            }),
            Action::Quit => break,
        };
        report(ctx, outcome);
    }

    store.close_session(&session);
    Ok(())
}

fn report(ctx: &Context, outcome: Result<(), StoreError>) {
    if let Err(e) = outcome {
        tracing::debug!(kind = e.kind(), error = %e, "shop action failed");
        ctx.output.error(&e.user_message());
    }
}

fn browse(ctx: &Context, store: &Storefront) {
    ctx.output.header("Books");
    for book in store.catalog().books() {
        ctx.output.list_item(&format!(
            "{} ({}) {}",
            book.title,
            book.category,
            book.price.display()
        ));
    }
}

fn pick_book(store: &Storefront, prompt: &str) -> Result<String> {
    let titles: Vec<&str> = store
        .catalog()
        .books()
        .iter()
        .map(|b| b.title.as_str())
        .collect();
    let index = Select::new()
        .with_prompt(prompt)
        .items(&titles)
        .default(0)
        .interact()?;
    Ok(titles[index].to_string())
}

fn pick_cart_line(
    ctx: &Context,
    store: &Storefront,
    session: &SessionId,
    prompt: &str,
) -> Result<Option<String>> {
    let cart = match store.cart(session) {
        Ok(cart) => cart,
        Err(e) => {
            report(ctx, Err(e));
            return Ok(None);
        }
    };
    if cart.is_empty() {
        ctx.output.warn("Your cart is empty!");
        return Ok(None);
    }
    let titles: Vec<&str> = cart.lines.iter().map(|l| l.book.title.as_str()).collect();
    let index = Select::new()
        .with_prompt(prompt)
        .items(&titles)
        .default(0)
        .interact()?;
    Ok(Some(titles[index].to_string()))
}

fn add(
    ctx: &Context,
    store: &Storefront,
    session: &SessionId,
) -> Result<Result<(), StoreError>> {
    let title = pick_book(store, "Which book?")?;
    let quantity: String = Input::new()
        .with_prompt("Quantity")
        .default("1".to_string())
        .interact_text()?;

    Ok(store.add_to_cart(session, &title, &quantity).map(|cart| {
        ctx.output.success(&format!("Added {} to cart!", title));
        ctx.output.kv("Items in cart", &cart.item_count.to_string());
    }))
}

fn update(
    ctx: &Context,
    store: &Storefront,
    session: &SessionId,
) -> Result<Result<(), StoreError>> {
    let Some(title) = pick_cart_line(ctx, store, session, "Which book?")? else {
        return Ok(Ok(()));
    };
    let quantity: String = Input::new()
        .with_prompt("New quantity (0 removes)")
        .interact_text()?;

    Ok(store
        .update_cart(session, &title, &quantity)
        .map(|_| ctx.output.success("Cart updated!")))
}

fn remove(
    ctx: &Context,
    store: &Storefront,
    session: &SessionId,
) -> Result<Result<(), StoreError>> {
    let Some(title) = pick_cart_line(ctx, store, session, "Remove which book?")? else {
        return Ok(Ok(()));
    };
    Ok(store.remove_from_cart(session, &title).map(|removed| {
        if removed {
            ctx.output.success("Item removed from cart!");
        }
    }))
}

fn empty(
    ctx: &Context,
    store: &Storefront,
    session: &SessionId,
) -> Result<Result<(), StoreError>> {
    if !Confirm::new()
        .with_prompt("Remove every book from the cart?")
        .default(false)
        .interact()?
    {
        return Ok(Ok(()));
    }
    Ok(store
        .clear_cart(session)
        .map(|()| ctx.output.success("Cart emptied.")))
}

fn show_cart(ctx: &Context, store: &Storefront, session: &SessionId) -> Result<(), StoreError> {
    let cart = store.cart(session)?;
    if cart.is_empty() {
        ctx.output.info("Your cart is empty.");
        return Ok(());
    }
    ctx.output.header("Your cart");
    for line in &cart.lines {
        ctx.output.list_item(&format!(
            "{} x{} @ {} = {}",
            line.book.title,
            line.quantity,
            line.book.price.display(),
            line.total_price()?.display()
        ));
    }
    ctx.output.kv("Items", &cart.item_count.to_string());
    ctx.output.kv("Total", &cart.total.display());
    Ok(())
}

fn checkout(
    ctx: &Context,
    store: &Storefront,
    session: &SessionId,
) -> Result<Result<(), StoreError>> {
    if let Err(e) = show_cart(ctx, store, session) {
        return Ok(Err(e));
    }

    let (default_name, default_email, default_address) = match store.account(session) {
        Ok(account) => (account.name.clone(), account.email.clone(), account.address.clone()),
        Err(_) => Default::default(),
    };

    ctx.output.header("Shipping");
    let shipping = ShippingInfo::new(
        prompt_text("Name", &default_name)?,
        prompt_text("Email", &default_email)?,
        prompt_text("Address", &default_address)?,
        prompt_text("City", "")?,
        prompt_text("ZIP code", "")?,
    );

    let discount = prompt_text("Discount code (optional)", "")?;
    match store.quote(session, Some(&discount)) {
        Ok(quote) => ctx.output.kv("Total to pay", &quote.pricing.grand_total.display()),
        Err(e) => return Ok(Err(e)),
    }

    let methods = ["Credit card", "PayPal"];
    let method = Select::new()
        .with_prompt("Payment method")
        .items(&methods)
        .default(0)
        .interact()?;
    let payment = if method == 0 {
        PaymentDetails::credit_card(
            prompt_text("Card number", "")?,
            prompt_text("Expiry (MM/YY)", "")?,
            Password::new().with_prompt("CVV").interact()?,
        )
    } else {
        PaymentDetails::paypal()
    };

    if !Confirm::new()
        .with_prompt("Place order?")
        .default(true)
        .interact()?
    {
        ctx.output.warn("Checkout cancelled");
        return Ok(Ok(()));
    }

    let mut request = CheckoutRequest::new(shipping, payment);
    if !discount.trim().is_empty() {
        request = request.with_discount(discount);
    }

    Ok(store.checkout(session, &request).map(|receipt| {
        ctx.output.success(&receipt.payment_message);
        if let Some(message) = &receipt.discount_message {
            ctx.output.success(message);
        }
        for warning in &receipt.warnings {
            ctx.output.warn(warning);
        }
        ctx.output.kv("Order", receipt.order_id().as_str());
        ctx.output.kv("Total", &receipt.order.total.display());
    }))
}

fn login(
    ctx: &Context,
    store: &Storefront,
    session: &SessionId,
) -> Result<Result<(), StoreError>> {
    let email = prompt_text("Email", "")?;
    let password = Password::new().with_prompt("Password").interact()?;
    Ok(store.login(session, &email, &password).map(|identity| {
        ctx.output.success(&format!("Welcome back, {}!", identity.name));
    }))
}

fn register(
    ctx: &Context,
    store: &Storefront,
    session: &SessionId,
) -> Result<Result<(), StoreError>> {
    let email = prompt_text("Email", "")?;
    let name = prompt_text("Name", "")?;
    let address = prompt_text("Address (optional)", "")?;
    let password = Password::new()
        .with_prompt("Password")
        .with_confirmation("Repeat password", "Passwords do not match")
        .interact()?;

    let registration = Registration::new(email, password, name).with_address(address);
    Ok(store.register(session, &registration).map(|identity| {
        ctx.output.success(&format!("Welcome, {}!", identity.name));
    }))
}

fn profile(
    ctx: &Context,
    store: &Storefront,
    session: &SessionId,
) -> Result<Result<(), StoreError>> {
    let account = match store.account(session) {
        Ok(account) => account,
        Err(e) => return Ok(Err(e)),
    };

    let update = ProfileUpdate {
        name: Some(prompt_text("Name", &account.name)?),
        address: Some(prompt_text("Address", &account.address)?),
        new_password: Some(
            Password::new()
                .with_prompt("New password (blank keeps the current one)")
                .allow_empty_password(true)
                .interact()?,
        ),
    };
    Ok(store
        .update_profile(session, &update)
        .map(|_| ctx.output.success("Profile updated successfully!")))
}

fn history(ctx: &Context, store: &Storefront, session: &SessionId) -> Result<(), StoreError> {
    let orders = store.order_history(session)?;
    if orders.is_empty() {
        ctx.output.info("No orders yet.");
        return Ok(());
    }
    ctx.output.header("Your orders");
    for order in orders.iter().rev() {
        ctx.output.list_item(&format!(
            "#{}  {}  {}  {}",
            order.id,
            order.placed_at.format("%Y-%m-%d %H:%M"),
            order.total.display(),
            status_badge(order.status.display_name())
        ));
        for line in &order.lines {
            ctx.output
                .kv(&format!("  {}", line.title), &format!("x{}", line.quantity));
        }
    }
    Ok(())
}

fn prompt_text(prompt: &str, default: &str) -> Result<String> {
    let mut input = Input::<String>::new()
        .with_prompt(prompt)
        .allow_empty(true);
    if !default.is_empty() {
        input = input.default(default.to_string());
    }
    Ok(input.interact_text()?)
}
