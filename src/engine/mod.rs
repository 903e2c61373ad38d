//! Request orchestration.
//!
//! The [`Engine`] owns the run's random context, the three virtual tables,
//! and the corpus reader. Each call to [`Engine::next_request`] is one
//! tick: sample a resource, dispatch to that resource's decision procedure
//! (`engine::books`, `engine::customers`, `engine::orders`), and emit a
//! [`RequestDescriptor`]. Order generation can signal "skip" when its
//! dependency tables are empty, in which case the tick redirects to
//! creating whichever dependency is missing.
//!
//! The tables are only written from two places: DELETE generation removes
//! the targeted row, and [`Engine::register_created`] records entities the
//! transport collaborator saw created. The first request for a resource is
//! therefore always a create, since its table cannot have been populated
//! yet.
//!
//! Manufactured API-facing faults are never errors here: they are encoded
//! into the descriptor for the target API to react to. [`GenError`] only
//! covers genuine internal-invariant violations.

mod books;
mod customers;
mod orders;

use crate::config::{Config, ConfigError, Distributions};
use crate::corpus::{BookCorpus, CorpusError};
use crate::random::RandomContext;
use crate::request::{Credentials, Method, RequestDescriptor, Resource};
use crate::store::{str_field, Record, VirtualTable};

/// Error type for generation. Every variant is an internal defect, not a
/// runtime condition to swallow.
#[derive(Debug, thiserror::Error)]
pub enum GenError {
    /// A table was sampled while empty. The emptiness checks in the
    /// per-resource procedures are supposed to make this impossible.
    #[error("Sampled the {0} table while it was empty")]
    EmptyTable(Resource),

    /// Order generation ran with an empty customers or books table.
    #[error("Order generation requires non-empty customers and books tables")]
    MissingOrderDependency,

    /// A created record fed back from the transport lacked its id field.
    #[error("Created {0} record is missing its '{1}' field")]
    MissingIdField(Resource, &'static str),

    /// The corpus failed mid-run.
    #[error(transparent)]
    Corpus(#[from] CorpusError),
}

/// One tick's output: the resource that was ultimately generated for and
/// the request itself.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratedRequest {
    pub resource: Resource,
    pub request: RequestDescriptor,
}

/// The request generation engine.
pub struct Engine {
    books_url: String,
    customers_url: String,
    looping: bool,
    distributions: Distributions,
    ctx: RandomContext,
    credentials: Credentials,
    corpus: BookCorpus,
    books: VirtualTable,
    customers: VirtualTable,
    orders: VirtualTable,
}

impl Engine {
    /// Build an engine for the run. Opens the corpus, seeds the random
    /// context, and mints the run's role credentials.
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        let mut ctx = RandomContext::new(config.seed);
        let credentials = Credentials::mint(&mut ctx);
        let corpus = BookCorpus::open(&config.books_file)?;
        Ok(Self {
            books_url: config.books_url.clone(),
            customers_url: config.customers_url.clone(),
            looping: config.looping,
            distributions: config.distributions.clone(),
            ctx,
            credentials,
            corpus,
            books: VirtualTable::new(),
            customers: VirtualTable::new(),
            orders: VirtualTable::new(),
        })
    }

    /// The seed this engine's random context was created from.
    pub fn seed(&self) -> u64 {
        self.ctx.seed()
    }

    /// Generate the next request. Exactly one descriptor is produced per
    /// tick; when orders are blocked on an empty dependency table the tick
    /// redirects to creating that dependency instead.
    pub fn next_request(&mut self) -> Result<GeneratedRequest, GenError> {
        let resource = *self.distributions.resource().select(&mut self.ctx);
        tracing::debug!(%resource, "sampled resource");

        let (resource, request) = match resource {
            Resource::Books => (resource, self.books_request()?),
            Resource::Customers => (resource, self.customers_request()?),
            Resource::Orders => match self.orders_request()? {
                Some(request) => (resource, request),
                None if self.customers.is_empty() => {
                    tracing::debug!("orders blocked; creating a customer instead");
                    (Resource::Customers, self.customers_request()?)
                }
                None => {
                    tracing::debug!("orders blocked; creating a book instead");
                    (Resource::Books, self.books_request()?)
                }
            },
        };
        Ok(GeneratedRequest { resource, request })
    }

    /// Record an entity the target API reported as created (HTTP 201 on a
    /// POST). This is the only external write path into a table.
    pub fn register_created(&mut self, resource: Resource, record: Record) -> Result<(), GenError> {
        let field = resource.id_field();
        let id = str_field(&record, field);
        if id.is_empty() {
            return Err(GenError::MissingIdField(resource, field));
        }
        let id = id.to_string();
        match resource {
            Resource::Books => self.books.put(id, record),
            Resource::Customers => self.customers.put(id, record),
            Resource::Orders => self.orders.put(id, record),
        }
        Ok(())
    }

    /// Read access to a resource's virtual table.
    pub fn table(&self, resource: Resource) -> &VirtualTable {
        match resource {
            Resource::Books => &self.books,
            Resource::Customers => &self.customers,
            Resource::Orders => &self.orders,
        }
    }

    fn sample_method(&mut self, resource: Resource) -> Method {
        let method = *self.distributions.method(resource).select(&mut self.ctx);
        tracing::debug!(%resource, %method, "sampled method");
        method
    }

    fn sample_fault(&mut self, resource: Resource, method: Method) -> String {
        let fault = self
            .distributions
            .fault(resource, method)
            .select(&mut self.ctx)
            .clone();
        tracing::debug!(%resource, %method, %fault, "sampled fault");
        fault
    }

}

/// Resolve the id a books or customers request targets: a random live key
/// for the normal path, a never-stored uuid for `not_found`, or a
/// syntactically broken uuid for `invalid_input`. Order URLs resolve their
/// two id segments through their own helpers since the fault labels differ.
fn identity_target(
    ctx: &mut RandomContext,
    table: &VirtualTable,
    resource: Resource,
    fault: &str,
) -> Result<String, GenError> {
    let id = ctx.uuid().to_string();
    match fault {
        "invalid_input" => Ok(id.replace('-', ".")),
        "not_found" => Ok(id),
        _ => table.random_key(ctx).ok_or(GenError::EmptyTable(resource)),
    }
}

/// Corrupt a pinned id for `invalid_url`; all other faults target it as-is.
fn pinned_target(id: &str, fault: &str) -> String {
    if fault == "invalid_url" {
        id.replace('-', ".")
    } else {
        id.to_string()
    }
}
