//! Customer synthesis.
//!
//! Customers are generated from embedded name pools sampled through the
//! shared random context (an external name library would draw from its own
//! RNG and break seed replay). Field draw order per customer: first name,
//! last name, password (length then characters), phone.

use crate::random::RandomContext;
use crate::store::Record;
use serde_json::Value;

const FIRST_NAMES: &[&str] = &[
    "Alice", "Amelia", "Arthur", "Beatrice", "Benjamin", "Carlos", "Charlotte", "Daniel",
    "Dorothy", "Edward", "Eleanor", "Emma", "Fiona", "Frank", "George", "Grace", "Harriet",
    "Henry", "Isabella", "Jack", "James", "Janet", "Joan", "Kevin", "Laura", "Leonard", "Lucy",
    "Margaret", "Martin", "Mary", "Nancy", "Nathan", "Olivia", "Oscar", "Patricia", "Paul",
    "Rachel", "Raymond", "Robert", "Rosa", "Samuel", "Sarah", "Stephen", "Susan", "Thomas",
    "Victor", "Wendy", "William",
];

const LAST_NAMES: &[&str] = &[
    "Adams", "Baker", "Bennett", "Brown", "Campbell", "Carter", "Clark", "Collins", "Cooper",
    "Davies", "Edwards", "Evans", "Fisher", "Foster", "Garcia", "Gray", "Green", "Hall",
    "Harris", "Hughes", "Jackson", "Johnson", "Jones", "King", "Lewis", "Martin", "Miller",
    "Mitchell", "Morgan", "Morris", "Murphy", "O'Brien", "O'Connor", "Parker", "Phillips",
    "Price", "Roberts", "Robinson", "Smith", "Taylor", "Thompson", "Turner", "Walker", "Ward",
    "Watson", "White", "Wilson", "Wright",
];

/// Generate a plausible customer payload.
pub fn synthesize(ctx: &mut RandomContext) -> Record {
    let first_name = FIRST_NAMES[ctx.uniform_int(FIRST_NAMES.len() as u64) as usize];
    let last_name = LAST_NAMES[ctx.uniform_int(LAST_NAMES.len() as u64) as usize];

    let username_first = clean_name_part(first_name);
    let username_last = clean_name_part(last_name);
    let username = format!("{}{}", &username_first[..1], username_last);
    let email = format!("{username_first}.{username_last}@freemail.com");
    let password = make_password(ctx);
    let phone = make_phone_number(ctx);

    let mut customer = Record::new();
    customer.insert("username".into(), Value::String(username));
    customer.insert("first_name".into(), Value::String(first_name.into()));
    customer.insert("last_name".into(), Value::String(last_name.into()));
    customer.insert("email".into(), Value::String(email));
    customer.insert("password".into(), Value::String(password));
    customer.insert("phone".into(), Value::String(phone));
    customer
}

/// Strip non-letters and lowercase; a part that cleans to nothing becomes
/// "x" so usernames and emails stay non-empty.
fn clean_name_part(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_lowercase();
    if cleaned.is_empty() {
        "x".to_string()
    } else {
        cleaned
    }
}

/// 7 to 11 random ASCII letters followed by one digit.
fn make_password(ctx: &mut RandomContext) -> String {
    let length = 7 + ctx.uniform_int(5);
    let mut password: String = (0..length).map(|_| ctx.letter()).collect();
    password.push(ctx.digit());
    password
}

/// Local phone number: a 4-digit area code and a 6-digit number.
fn make_phone_number(ctx: &mut RandomContext) -> String {
    let code: String = (0..4).map(|_| ctx.digit()).collect();
    let number: String = (0..6).map(|_| ctx.digit()).collect();
    format!("0{code} {number}")
}
