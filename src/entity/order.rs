//! Order synthesis.
//!
//! Orders reference entities already live in the virtual tables: one random
//! existing customer and one or more random existing books. When looping is
//! enabled the book count is Pareto-sized so most orders are small with a
//! long tail. Draw order per order: customer key, pareto, book keys,
//! quantity.

use crate::random::RandomContext;
use crate::store::{Record, VirtualTable};
use serde_json::{json, Value};

/// Generate an order against existing customers and books. Returns `None`
/// if either table is empty; callers gate on emptiness before asking.
pub fn synthesize(
    ctx: &mut RandomContext,
    customers: &VirtualTable,
    books: &VirtualTable,
    looping: bool,
) -> Option<Record> {
    let customer_id = customers.random_key(ctx)?;

    let pareto = ctx.pareto();
    let book_count = if looping {
        (pareto * 5.0) as u64 + 1
    } else {
        1
    };
    let mut book_ids = Vec::with_capacity(book_count as usize);
    for _ in 0..book_count {
        book_ids.push(Value::String(books.random_key(ctx)?));
    }

    let quantity = ctx.uniform_int(2) + 1;

    let mut order = Record::new();
    order.insert("customer_id".into(), Value::String(customer_id));
    order.insert("book_ids".into(), Value::Array(book_ids));
    order.insert("quantity".into(), json!(quantity));
    order.insert("status".into(), Value::String("placed".into()));
    Some(order)
}
