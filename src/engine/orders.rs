//! Decision procedure for requests on the orders resource.
//!
//! Orders are gated on both dependency tables: with no known customers or
//! books there is nothing valid to reference, so the tick signals "skip"
//! (`Ok(None)`) and the caller redirects to creating a dependency instead.

use super::{pinned_target, Engine, GenError};
use crate::entity;
use crate::marker;
use crate::request::{auth_role, Method, RequestDescriptor, Resource};
use crate::store::str_field;
use serde_json::{json, Value};

impl Engine {
    /// One orders request, or `None` when a dependency table is empty.
    pub(crate) fn orders_request(&mut self) -> Result<Option<RequestDescriptor>, GenError> {
        if self.customers.is_empty() || self.books.is_empty() {
            return Ok(None);
        }
        if self.orders.is_empty() {
            return self.orders_post().map(Some);
        }
        let request = match self.sample_method(Resource::Orders) {
            Method::Get => self.orders_get()?,
            Method::Post => self.orders_post()?,
            Method::Put => self.orders_put()?,
            Method::Delete => self.orders_delete()?,
        };
        Ok(Some(request))
    }

    fn orders_post(&mut self) -> Result<RequestDescriptor, GenError> {
        let fault = self.sample_fault(Resource::Orders, Method::Post);

        let mut order = entity::order::synthesize(
            &mut self.ctx,
            &self.customers,
            &self.books,
            self.looping,
        )
        .ok_or(GenError::MissingOrderDependency)?;

        // The URL identity and the body's customer_id must match, even when
        // the URL is being deliberately corrupted.
        let customer_id = pinned_target(str_field(&order, "customer_id"), &fault);
        let url = format!("{}/{}/orders", self.customers_url, customer_id);
        let role = auth_role(true, &fault);

        marker::clean_order(&mut order);
        order.insert("customer_id".into(), Value::String(customer_id));
        marker::inject_order_create_fault(&mut self.ctx, &mut order, &fault);

        Ok(RequestDescriptor::new(Method::Post, url, role, &self.credentials).with_body(order))
    }

    fn orders_get(&mut self) -> Result<RequestDescriptor, GenError> {
        let fault = self.sample_fault(Resource::Orders, Method::Get);
        let customer_id = self.order_customer_target(&fault)?;
        let order_id = self.order_target(&fault)?;
        let url = format!("{}/{}/orders/{}", self.customers_url, customer_id, order_id);
        let role = auth_role(false, &fault);

        Ok(RequestDescriptor::new(Method::Get, url, role, &self.credentials))
    }

    fn orders_put(&mut self) -> Result<RequestDescriptor, GenError> {
        let fault = self.sample_fault(Resource::Orders, Method::Put);

        let (order_key, mut order) = self
            .orders
            .random_row(&mut self.ctx)
            .ok_or(GenError::EmptyTable(Resource::Orders))?;
        let customer_id = pinned_target(str_field(&order, "customer_id"), &fault);
        let order_id = pinned_target(&order_key, &fault);
        let url = format!("{}/{}/orders/{}", self.customers_url, customer_id, order_id);
        let role = auth_role(true, &fault);

        marker::clean_order(&mut order);
        let status = if self.ctx.uniform_int(2) == 0 {
            "approved"
        } else {
            "delivered"
        };
        order.insert("status".into(), json!(status));
        if status == "delivered" {
            order.insert("ship_date".into(), json!("2020-11-02"));
        }
        marker::inject_order_update_fault(&mut self.ctx, &mut order, &fault);

        Ok(RequestDescriptor::new(Method::Put, url, role, &self.credentials).with_body(order))
    }

    fn orders_delete(&mut self) -> Result<RequestDescriptor, GenError> {
        let fault = self.sample_fault(Resource::Orders, Method::Delete);
        let customer_id = self.order_customer_target(&fault)?;
        let order_id = self.order_target(&fault)?;
        let url = format!("{}/{}/orders/{}", self.customers_url, customer_id, order_id);
        let role = auth_role(true, &fault);

        self.orders.remove(&order_id);

        Ok(RequestDescriptor::new(Method::Delete, url, role, &self.credentials))
    }

    /// Customer identity for an order URL when no order pins one.
    fn order_customer_target(&mut self, fault: &str) -> Result<String, GenError> {
        let id = self.ctx.uuid().to_string();
        match fault {
            "invalid_url" => Ok(id.replace('-', ".")),
            "customer_not_found" => Ok(id),
            _ => self
                .customers
                .random_key(&mut self.ctx)
                .ok_or(GenError::EmptyTable(Resource::Customers)),
        }
    }

    /// Order identity for an order URL when no stored row pins one.
    fn order_target(&mut self, fault: &str) -> Result<String, GenError> {
        let id = self.ctx.uuid().to_string();
        match fault {
            "invalid_url" => Ok(id.replace('-', ".")),
            "order_not_found" => Ok(id),
            _ => self
                .orders
                .random_key(&mut self.ctx)
                .ok_or(GenError::EmptyTable(Resource::Orders)),
        }
    }
}
