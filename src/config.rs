//! Run configuration: endpoint URLs, corpus location, seed, and the YAML
//! weight tables driving every sampling decision.
//!
//! The weight file has three levels, all order-preserving:
//!
//! ```yaml
//! resources:
//!   books: 40
//!   customers: 35
//!   orders: 25
//! methods:
//!   books:
//!     get: 40
//!     post: 30
//! errors:
//!   books:
//!     post:
//!       none: 70
//!       exists: 10
//! ```
//!
//! A missing per-resource method table defaults to uniform weights over all
//! four methods, and a missing fault table defaults to always-valid
//! (`none: 1`), so partial weight files stay usable. Zero weights, unknown
//! resource or method labels, and malformed YAML are fatal at startup.

use crate::corpus::CorpusError;
use crate::random::{Distribution, DistributionError};
use crate::request::{Method, Resource};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Default service root when no URL is configured.
pub const DEFAULT_SERVICE_URL: &str = "https://localhost:5000/v1";

/// Weight tables shipped with the binary, used when no weight file is given.
pub const DEFAULT_WEIGHTS: &str = include_str!("../config.yaml");

/// Error type for configuration loading. All variants are fatal at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Error reading a configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed YAML.
    #[error("Failed to parse weight file: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A weight table could not be turned into a distribution.
    #[error("Invalid weight table for '{context}': {source}")]
    Distribution {
        context: String,
        #[source]
        source: DistributionError,
    },

    /// A weight label was not a string or a weight was not a positive integer.
    #[error("Invalid weight entry in table '{0}': labels must be strings and weights positive integers")]
    InvalidWeightEntry(String),

    /// An unknown resource or method label appeared in the weight file.
    #[error("Unknown label in weight file: {0}")]
    UnknownLabel(String),

    /// The books corpus could not be opened.
    #[error(transparent)]
    Corpus(#[from] CorpusError),
}

/// Raw shape of the weight file.
#[derive(Debug, Deserialize)]
struct WeightsFile {
    resources: serde_yaml::Mapping,
    #[serde(default)]
    methods: HashMap<String, serde_yaml::Mapping>,
    #[serde(default)]
    errors: HashMap<String, HashMap<String, serde_yaml::Mapping>>,
}

/// Method and fault distributions for one resource.
#[derive(Debug, Clone)]
struct ResourceTables {
    methods: Distribution<Method>,
    get: Distribution<String>,
    post: Distribution<String>,
    put: Distribution<String>,
    delete: Distribution<String>,
}

/// All sampling tables for a run, validated at construction.
#[derive(Debug, Clone)]
pub struct Distributions {
    resources: Distribution<Resource>,
    books: ResourceTables,
    customers: ResourceTables,
    orders: ResourceTables,
}

impl Distributions {
    /// Build every table from a YAML weight file.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let file: WeightsFile = serde_yaml::from_str(yaml)?;

        // Reject tables for resources or methods that do not exist.
        for name in file.methods.keys() {
            name.parse::<Resource>().map_err(ConfigError::UnknownLabel)?;
        }
        for (name, tables) in &file.errors {
            name.parse::<Resource>().map_err(ConfigError::UnknownLabel)?;
            for method in tables.keys() {
                method.parse::<Method>().map_err(ConfigError::UnknownLabel)?;
            }
        }

        let resource_weights = weight_entries(&file.resources, "resources")?
            .into_iter()
            .map(|(label, weight)| {
                label
                    .parse::<Resource>()
                    .map(|resource| (resource, weight))
                    .map_err(ConfigError::UnknownLabel)
            })
            .collect::<Result<Vec<_>, _>>()?;
        let resources = distribution(resource_weights, "resources")?;

        Ok(Self {
            resources,
            books: resource_tables(&file, Resource::Books)?,
            customers: resource_tables(&file, Resource::Customers)?,
            orders: resource_tables(&file, Resource::Orders)?,
        })
    }

    /// Load the weight file at `path`.
    pub fn from_path(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&yaml)
    }

    pub fn resource(&self) -> &Distribution<Resource> {
        &self.resources
    }

    pub fn method(&self, resource: Resource) -> &Distribution<Method> {
        &self.tables(resource).methods
    }

    pub fn fault(&self, resource: Resource, method: Method) -> &Distribution<String> {
        let tables = self.tables(resource);
        match method {
            Method::Get => &tables.get,
            Method::Post => &tables.post,
            Method::Put => &tables.put,
            Method::Delete => &tables.delete,
        }
    }

    fn tables(&self, resource: Resource) -> &ResourceTables {
        match resource {
            Resource::Books => &self.books,
            Resource::Customers => &self.customers,
            Resource::Orders => &self.orders,
        }
    }
}

fn resource_tables(file: &WeightsFile, resource: Resource) -> Result<ResourceTables, ConfigError> {
    let methods = match file.methods.get(resource.as_str()) {
        Some(mapping) => {
            let context = format!("methods.{resource}");
            let entries = weight_entries(mapping, &context)?
                .into_iter()
                .map(|(label, weight)| {
                    label
                        .parse::<Method>()
                        .map(|method| (method, weight))
                        .map_err(ConfigError::UnknownLabel)
                })
                .collect::<Result<Vec<_>, _>>()?;
            distribution(entries, &context)?
        }
        None => uniform_methods(),
    };

    Ok(ResourceTables {
        methods,
        get: fault_table(file, resource, Method::Get)?,
        post: fault_table(file, resource, Method::Post)?,
        put: fault_table(file, resource, Method::Put)?,
        delete: fault_table(file, resource, Method::Delete)?,
    })
}

fn fault_table(
    file: &WeightsFile,
    resource: Resource,
    method: Method,
) -> Result<Distribution<String>, ConfigError> {
    let mapping = file
        .errors
        .get(resource.as_str())
        .and_then(|tables| tables.get(&method.as_str().to_lowercase()));
    match mapping {
        Some(mapping) => {
            let context = format!("errors.{resource}.{method}");
            distribution(weight_entries(mapping, &context)?, &context)
        }
        None => distribution(vec![("none".to_string(), 1)], "default fault table"),
    }
}

/// Uniform fallback over all four methods, in the API's canonical order.
fn uniform_methods() -> Distribution<Method> {
    Distribution::new([
        (Method::Get, 1),
        (Method::Post, 1),
        (Method::Put, 1),
        (Method::Delete, 1),
    ])
    .expect("invalid built-in method table")
}

fn distribution<T: std::fmt::Display>(
    entries: Vec<(T, u64)>,
    context: &str,
) -> Result<Distribution<T>, ConfigError> {
    Distribution::new(entries).map_err(|source| ConfigError::Distribution {
        context: context.to_string(),
        source,
    })
}

/// Extract `(label, weight)` pairs from a YAML mapping in document order.
fn weight_entries(
    mapping: &serde_yaml::Mapping,
    context: &str,
) -> Result<Vec<(String, u64)>, ConfigError> {
    mapping
        .iter()
        .map(|(key, value)| {
            let label = key
                .as_str()
                .ok_or_else(|| ConfigError::InvalidWeightEntry(context.to_string()))?;
            let weight = value
                .as_u64()
                .ok_or_else(|| ConfigError::InvalidWeightEntry(context.to_string()))?;
            Ok((label.to_string(), weight))
        })
        .collect()
}

/// Everything a run needs, assembled by the CLI layer.
#[derive(Debug, Clone)]
pub struct Config {
    /// Books collection endpoint.
    pub books_url: String,
    /// Customers collection endpoint; order URLs nest under it.
    pub customers_url: String,
    /// Path to the newline-delimited JSON books corpus.
    pub books_file: PathBuf,
    /// Number of requests to generate; 0 means unlimited.
    pub request_count: u64,
    /// Whether orders may reference multiple books.
    pub looping: bool,
    /// Resolved nonzero seed for the run.
    pub seed: u64,
    /// All sampling tables.
    pub distributions: Distributions,
    /// Verify TLS certificates on outbound requests.
    pub verify_tls: bool,
    /// Ask the API for asynchronous behaviour via the X-Bookshop-Async header.
    pub async_api: bool,
    /// Optional X-IBM-Client-Id header value.
    pub client_id: Option<String>,
}

impl Config {
    /// Derive the per-resource endpoints from a common service URL.
    pub fn endpoints(service_url: &str) -> (String, String) {
        (
            format!("{service_url}/books"),
            format!("{service_url}/customers"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::RandomContext;

    const FULL: &str = r#"
resources:
  books: 50
  customers: 30
  orders: 20
methods:
  books:
    get: 40
    post: 30
    put: 20
    delete: 10
errors:
  books:
    post:
      none: 80
      exists: 10
      unavailable: 10
"#;

    #[test]
    fn test_full_weight_file_parses() {
        let distributions = Distributions::from_yaml(FULL).unwrap();
        let mut ctx = RandomContext::new(1);
        // Every accessor must be usable without panicking.
        distributions.resource().select(&mut ctx);
        for resource in [Resource::Books, Resource::Customers, Resource::Orders] {
            distributions.method(resource).select(&mut ctx);
            for method in [Method::Get, Method::Post, Method::Put, Method::Delete] {
                distributions.fault(resource, method).select(&mut ctx);
            }
        }
    }

    #[test]
    fn test_missing_tables_fall_back_to_defaults() {
        let distributions = Distributions::from_yaml("resources:\n  books: 100\n").unwrap();
        let mut ctx = RandomContext::new(2);

        assert_eq!(distributions.resource().select(&mut ctx), &Resource::Books);
        // No fault table configured: every draw is the valid path.
        for _ in 0..20 {
            assert_eq!(
                distributions.fault(Resource::Books, Method::Post).select(&mut ctx),
                "none"
            );
        }
    }

    #[test]
    fn test_zero_weight_is_fatal() {
        let yaml = "resources:\n  books: 0\n";
        assert!(matches!(
            Distributions::from_yaml(yaml),
            Err(ConfigError::Distribution { .. })
        ));
    }

    #[test]
    fn test_unknown_resource_label_is_fatal() {
        let yaml = "resources:\n  magazines: 10\n";
        assert!(matches!(
            Distributions::from_yaml(yaml),
            Err(ConfigError::UnknownLabel(_))
        ));
    }

    #[test]
    fn test_unknown_method_label_is_fatal() {
        let yaml = "resources:\n  books: 10\nmethods:\n  books:\n    patch: 5\n";
        assert!(matches!(
            Distributions::from_yaml(yaml),
            Err(ConfigError::UnknownLabel(_))
        ));
    }

    #[test]
    fn test_non_integer_weight_is_fatal() {
        let yaml = "resources:\n  books: lots\n";
        assert!(matches!(
            Distributions::from_yaml(yaml),
            Err(ConfigError::InvalidWeightEntry(_))
        ));
    }

    #[test]
    fn test_default_weight_file_is_valid() {
        Distributions::from_yaml(DEFAULT_WEIGHTS).unwrap();
    }

    #[test]
    fn test_endpoints_derive_from_service_url() {
        let (books, customers) = Config::endpoints("https://localhost:5000/v1");
        assert_eq!(books, "https://localhost:5000/v1/books");
        assert_eq!(customers, "https://localhost:5000/v1/customers");
    }
}
