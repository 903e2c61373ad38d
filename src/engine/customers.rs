//! Decision procedure for requests on the customers resource.

use super::{identity_target, Engine, GenError};
use crate::entity;
use crate::marker;
use crate::request::{auth_role, Method, RequestDescriptor, Resource};
use serde_json::Value;

impl Engine {
    /// One customers request; an empty table forces a create.
    pub(crate) fn customers_request(&mut self) -> Result<RequestDescriptor, GenError> {
        if self.customers.is_empty() {
            return self.customers_post();
        }
        match self.sample_method(Resource::Customers) {
            Method::Get => self.customers_get(),
            Method::Post => self.customers_post(),
            Method::Put => self.customers_put(),
            Method::Delete => self.customers_delete(),
        }
    }

    fn customers_post(&mut self) -> Result<RequestDescriptor, GenError> {
        let fault = self.sample_fault(Resource::Customers, Method::Post);
        let role = auth_role(true, &fault);

        let mut customer = entity::customer::synthesize(&mut self.ctx);
        marker::clean_customer(&mut customer);
        marker::inject_customer_create_fault(&mut customer, &fault);

        Ok(RequestDescriptor::new(
            Method::Post,
            self.customers_url.clone(),
            role,
            &self.credentials,
        )
        .with_body(customer))
    }

    fn customers_get(&mut self) -> Result<RequestDescriptor, GenError> {
        let fault = self.sample_fault(Resource::Customers, Method::Get);
        let customer_id =
            identity_target(&mut self.ctx, &self.customers, Resource::Customers, &fault)?;
        let url = format!("{}/{}", self.customers_url, customer_id);
        let role = auth_role(false, &fault);

        Ok(RequestDescriptor::new(Method::Get, url, role, &self.credentials))
    }

    fn customers_put(&mut self) -> Result<RequestDescriptor, GenError> {
        let fault = self.sample_fault(Resource::Customers, Method::Put);
        let customer_id =
            identity_target(&mut self.ctx, &self.customers, Resource::Customers, &fault)?;
        let url = format!("{}/{}", self.customers_url, customer_id);
        let role = auth_role(true, &fault);

        // Always work on a fresh copy off the table and re-clean it; update
        // conventions differ slightly from create, and the stored row must
        // never be mutated in place.
        let (_, mut customer) = self
            .customers
            .random_row(&mut self.ctx)
            .ok_or(GenError::EmptyTable(Resource::Customers))?;
        customer.insert("customer_id".into(), Value::String(customer_id));
        marker::clean_customer(&mut customer);
        marker::inject_customer_update_fault(&mut customer, &fault);

        Ok(RequestDescriptor::new(Method::Put, url, role, &self.credentials).with_body(customer))
    }

    fn customers_delete(&mut self) -> Result<RequestDescriptor, GenError> {
        let fault = self.sample_fault(Resource::Customers, Method::Delete);
        let customer_id =
            identity_target(&mut self.ctx, &self.customers, Resource::Customers, &fault)?;
        let url = format!("{}/{}", self.customers_url, customer_id);
        let role = auth_role(true, &fault);

        self.customers.remove(&customer_id);

        Ok(RequestDescriptor::new(Method::Delete, url, role, &self.credentials))
    }
}
