//! Book synthesis from raw corpus records.
//!
//! A raw record keeps its `publisher` and `date` fields; `title` and
//! `author` are normalized in place and `isbn`, `format`, and `language`
//! are added. Field draw order per book: isbn (publisher, publication,
//! checksum), then format, then language.

use crate::random::RandomContext;
use crate::store::{str_field, Record};
use serde_json::Value;

/// Turn a raw corpus record into a plausible book payload.
pub fn synthesize(ctx: &mut RandomContext, mut book: Record) -> Record {
    let title = make_title(str_field(&book, "title"));
    let author = make_author(str_field(&book, "author"));
    let isbn = make_isbn(ctx, str_field(&book, "date"));
    let format = make_format(ctx);
    let language = make_language(ctx);

    book.insert("title".into(), Value::String(title));
    book.insert("author".into(), Value::String(author));
    book.insert("isbn".into(), Value::String(isbn));
    book.insert("format".into(), Value::String(format.into()));
    book.insert("language".into(), Value::String(language.into()));
    book
}

/// First line of the raw title, trimmed. Empty titles become "Unknown".
fn make_title(raw: &str) -> String {
    let first_line = raw.trim().lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        "Unknown".to_string()
    } else {
        first_line.to_string()
    }
}

/// First listed author only, with "Lastname, First" reordered to
/// "First Lastname". Empty authors become "Anonymous".
fn make_author(raw: &str) -> String {
    let first = raw
        .trim()
        .split(|c| c == ';' || c == '\n')
        .next()
        .unwrap_or("");
    let author = match first.split_once(',') {
        Some((last, first_name)) => {
            format!("{} {}", first_name.trim_start_matches(' '), last)
        }
        None => first.to_string(),
    };
    if author.is_empty() {
        "Anonymous".to_string()
    } else {
        author
    }
}

/// Deterministically structured ISBN: a zero-prefixed publisher /
/// publication / checksum triple, with the "978" prefix only for books
/// published after 2007.
fn make_isbn(ctx: &mut RandomContext, date: &str) -> String {
    let publisher = ctx.uniform_int(1000);
    let publication = ctx.uniform_int(100_000);
    let checksum = ctx.uniform_int(10);
    let isbn = format!("0{publisher:03}{publication:05}{checksum}");
    if date > "2007" {
        format!("978{isbn}")
    } else {
        isbn
    }
}

fn make_format(ctx: &mut RandomContext) -> &'static str {
    match ctx.uniform_int(10) {
        0..=2 => "hardback",
        3..=6 => "paperback",
        _ => "digital",
    }
}

fn make_language(ctx: &mut RandomContext) -> &'static str {
    if ctx.uniform_int(100) < 15 {
        "fr"
    } else {
        "en"
    }
}
