//! Fault markers: the data-level conventions the target API recognizes.
//!
//! Certain substrings and values in otherwise plausible fields signal
//! non-obvious states to the API ("this ISBN already exists", "this book
//! is out of stock"). This module owns both directions of that convention:
//! the clean pass that scrubs markers a synthesizer produced by accident,
//! and the inject pass that deliberately plants exactly one marker for a
//! sampled fault. Every record is cleaned before injection so at most one
//! fault signal is ever present and natural data collisions cannot cause
//! false positives.
//!
//! Marker table:
//!
//! | Field condition                    | Meaning to the API        |
//! |------------------------------------|---------------------------|
//! | ISBN contains "92"                 | entity already exists     |
//! | ISBN contains "303"                | resource unavailable      |
//! | Author starts with "Rob"           | unknown author            |
//! | Author starts with "James"         | conflicting author change |
//! | Username starts with "rob"         | username already taken    |
//! | Username starts with "james"       | conflicting username change |
//! | Quantity is a nonzero multiple of 5| book out of stock         |
//!
//! Identity-targeting faults (not-found ids, malformed ids, credential
//! roles) are orthogonal to these body markers and live in the engine.

use crate::random::RandomContext;
use crate::store::{str_field, Record};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Books
// ---------------------------------------------------------------------------

/// Scrub accidental book markers: "92" and "303" in the ISBN, authors
/// called "Rob" or "James".
pub fn clean_book(book: &mut Record) {
    let isbn = str_field(book, "isbn").replace("92", "93").replace("303", "304");
    book.insert("isbn".into(), Value::String(isbn));

    let author = str_field(book, "author");
    if author.starts_with("Rob") {
        let author = replace_first_name(author, "Janet");
        book.insert("author".into(), Value::String(author));
    }
    let author = str_field(book, "author");
    if author.starts_with("James") {
        let author = replace_first_name(author, "Suzanne");
        book.insert("author".into(), Value::String(author));
    }
}

/// Plant the marker for a sampled book-creation fault. Unknown labels and
/// "none" leave the record valid.
pub fn inject_book_create_fault(book: &mut Record, fault: &str) {
    match fault {
        "invalid_input" => {
            book.remove("author");
        }
        "exists" => {
            let isbn = set_isbn_tail(str_field(book, "isbn"), "92");
            book.insert("isbn".into(), Value::String(isbn));
        }
        "unavailable" => {
            let isbn = set_isbn_tail(str_field(book, "isbn"), "303");
            book.insert("isbn".into(), Value::String(isbn));
        }
        "unknown" => {
            book.insert("author".into(), json!("Robert Unknown"));
        }
        _ => {}
    }
}

/// Plant the marker for a sampled book-update fault.
pub fn inject_book_update_fault(book: &mut Record, fault: &str) {
    if fault == "invalid_update" {
        book.insert("author".into(), json!("James Conflict"));
    }
}

/// Keep the surname, replace the first name.
fn replace_first_name(author: &str, new_first: &str) -> String {
    let rest = match author.find(' ') {
        Some(idx) => &author[idx + 1..],
        None => author,
    };
    format!("{new_first} {rest}")
}

/// Overwrite the tail of the ISBN with a marker substring.
fn set_isbn_tail(isbn: &str, tail: &str) -> String {
    let keep = isbn.len().saturating_sub(tail.len());
    format!("{}{}", &isbn[..keep], tail)
}

// ---------------------------------------------------------------------------
// Customers
// ---------------------------------------------------------------------------

/// Scrub accidental customer markers: usernames starting "rob" or "james"
/// get an escape prefix.
pub fn clean_customer(customer: &mut Record) {
    let username = str_field(customer, "username");
    if username.starts_with("rob") || username.starts_with("james") {
        let escaped = format!("x{username}");
        customer.insert("username".into(), Value::String(escaped));
    }
}

pub fn inject_customer_create_fault(customer: &mut Record, fault: &str) {
    match fault {
        "invalid_input" => {
            let email = str_field(customer, "email").replace('@', ".");
            customer.insert("email".into(), Value::String(email));
        }
        "exists" => {
            let username = set_username_prefix(str_field(customer, "username"), "rob");
            customer.insert("username".into(), Value::String(username));
        }
        _ => {}
    }
}

pub fn inject_customer_update_fault(customer: &mut Record, fault: &str) {
    if fault == "invalid_update" {
        let username = set_username_prefix(str_field(customer, "username"), "james");
        customer.insert("username".into(), Value::String(username));
    }
}

/// Replace the first character of the username with a marker prefix.
fn set_username_prefix(username: &str, prefix: &str) -> String {
    let rest = username.get(1..).unwrap_or("");
    format!("{prefix}{rest}")
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Scrub the accidental out-of-stock marker: a nonzero quantity divisible
/// by 5 is decremented.
pub fn clean_order(order: &mut Record) {
    if let Some(quantity) = order.get("quantity").and_then(Value::as_i64) {
        if quantity != 0 && quantity % 5 == 0 {
            order.insert("quantity".into(), json!(quantity - 1));
        }
    }
}

pub fn inject_order_create_fault(ctx: &mut RandomContext, order: &mut Record, fault: &str) {
    match fault {
        "book_not_found" => set_book_not_found(ctx, order),
        "invalid_input" => {
            order.remove("quantity");
        }
        _ => {}
    }
}

pub fn inject_order_update_fault(ctx: &mut RandomContext, order: &mut Record, fault: &str) {
    match fault {
        "book_not_found" => set_book_not_found(ctx, order),
        "invalid_input" => {
            order.remove("quantity");
        }
        "out_of_stock" => {
            order.insert("quantity".into(), json!(5));
        }
        _ => {}
    }
}

/// Swap one referenced book id for an identifier the API has never seen.
fn set_book_not_found(ctx: &mut RandomContext, order: &mut Record) {
    let unseen = ctx.uuid().to_string();
    if let Some(ids) = order.get_mut("book_ids").and_then(Value::as_array_mut) {
        if ids.is_empty() {
            return;
        }
        let idx = ctx.uniform_int(ids.len() as u64) as usize;
        ids[idx] = Value::String(unseen);
    }
}
