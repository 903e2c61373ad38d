//! Request descriptors and the credential roles attached to them.
//!
//! A [`RequestDescriptor`] is the engine's entire output for one tick:
//! method, absolute URL, headers, optional query parameters, and optional
//! JSON body. It is immutable once constructed and consumed exactly once
//! by the transport collaborator.

use crate::random::RandomContext;
use crate::store::Record;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// HTTP methods the Bookshop API accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "get" => Ok(Method::Get),
            "post" => Ok(Method::Post),
            "put" => Ok(Method::Put),
            "delete" => Ok(Method::Delete),
            other => Err(format!("unknown method '{other}'")),
        }
    }
}

/// The three Bookshop resources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Books,
    Customers,
    Orders,
}

impl Resource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Resource::Books => "books",
            Resource::Customers => "customers",
            Resource::Orders => "orders",
        }
    }

    /// Name of the server-assigned id field in a created record.
    pub fn id_field(&self) -> &'static str {
        match self {
            Resource::Books => "book_id",
            Resource::Customers => "customer_id",
            Resource::Orders => "order_id",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Resource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "books" => Ok(Resource::Books),
            "customers" => Ok(Resource::Customers),
            "orders" => Ok(Resource::Orders),
            other => Err(format!("unknown resource '{other}'")),
        }
    }
}

/// Credential role attached to a request, when one is attached at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthRole {
    /// The admin credential, for create/update/delete operations.
    Privileged,
    /// The plain user credential.
    Unprivileged,
}

/// Pick the credential role for an operation given the sampled fault.
///
/// `not_authenticated` sends no credential at all; `not_authorized`
/// downgrades a privileged operation to the plain user. Reads never use
/// the privileged credential.
pub fn auth_role(privileged: bool, fault: &str) -> Option<AuthRole> {
    if fault == "not_authenticated" {
        None
    } else if privileged && fault != "not_authorized" {
        Some(AuthRole::Privileged)
    } else {
        Some(AuthRole::Unprivileged)
    }
}

/// The two fixed role credentials for a run, minted once at startup.
#[derive(Debug, Clone)]
pub struct Credentials {
    admin: String,
    user: String,
}

impl Credentials {
    /// Mint basic-auth values for both roles from the run's random context.
    pub fn mint(ctx: &mut RandomContext) -> Self {
        Self {
            admin: STANDARD.encode(format!("admin:{}", ctx.uuid())),
            user: STANDARD.encode(format!("alex:{}", ctx.uuid())),
        }
    }

    fn header_value(&self, role: AuthRole) -> &str {
        match role {
            AuthRole::Privileged => &self.admin,
            AuthRole::Unprivileged => &self.user,
        }
    }
}

/// One fully-described HTTP request, ready for the transport collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    pub method: Method,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub params: Vec<(String, String)>,
    pub body: Option<Record>,
    pub role: Option<AuthRole>,
}

impl RequestDescriptor {
    pub fn new(
        method: Method,
        url: String,
        role: Option<AuthRole>,
        credentials: &Credentials,
    ) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Accept".to_string(), "application/json".to_string());
        if let Some(role) = role {
            headers.insert(
                "Authorization".to_string(),
                credentials.header_value(role).to_string(),
            );
        }
        Self {
            method,
            url,
            headers,
            params: Vec::new(),
            body: None,
            role,
        }
    }

    pub fn with_body(mut self, body: Record) -> Self {
        self.body = Some(body);
        self
    }
}
