//! List the books on sale.

use anyhow::Result;
use serde::Serialize;

use super::{user_error, CatalogArgs};
use crate::context::Context;
use crate::output::column_width;

#[derive(Serialize)]
struct BookRow<'a> {
    title: &'a str,
    category: &'a str,
    price: String,
}

/// Run the catalog command.
pub fn run(args: CatalogArgs, ctx: &Context) -> Result<()> {
    let catalog = ctx.config.catalog().map_err(user_error)?;

    let books: Vec<_> = match &args.category {
        Some(category) => catalog.in_category(category).collect(),
        None => catalog.books().iter().collect(),
    };

    if ctx.output.is_json() {
        let rows: Vec<BookRow<'_>> = books
            .iter()
            .map(|b| BookRow {
                title: &b.title,
                category: &b.category,
                price: b.price.display(),
            })
            .collect();
        ctx.output.json(&rows);
        return Ok(());
    }

    if books.is_empty() {
        match &args.category {
            Some(category) => ctx.output.warn(&format!("No books in category '{}'", category)),
            None => ctx.output.warn("The catalog is empty"),
        }
        return Ok(());
    }

    ctx.output.header("Books");
    let title_width = column_width(books.iter().map(|b| b.title.as_str()), 5);
    let category_width = column_width(books.iter().map(|b| b.category.as_str()), 8);
    let widths = [title_width, category_width, 10];
    ctx.output.table_row(&["TITLE", "CATEGORY", "PRICE"], &widths);
    for book in &books {
        let price = book.price.display();
        ctx.output
            .table_row(&[&book.title, &book.category, &price], &widths);
    }

    ctx.output.info("");
    ctx.output.info(&format!(
        "{} book(s). Categories: {}",
        books.len(),
        catalog.categories().join(", ")
    ));

    Ok(())
}
