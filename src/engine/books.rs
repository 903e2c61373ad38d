//! Decision procedure for requests on the books resource.

use super::{identity_target, Engine, GenError};
use crate::entity;
use crate::marker;
use crate::request::{auth_role, Method, RequestDescriptor, Resource};
use serde_json::{json, Value};

impl Engine {
    /// One books request. An empty table forces a create so later ticks
    /// always have something to target.
    pub(crate) fn books_request(&mut self) -> Result<RequestDescriptor, GenError> {
        if self.books.is_empty() {
            return self.books_post();
        }
        match self.sample_method(Resource::Books) {
            Method::Get => self.books_get(),
            Method::Post => self.books_post(),
            Method::Put => self.books_put(),
            Method::Delete => self.books_delete(),
        }
    }

    fn books_post(&mut self) -> Result<RequestDescriptor, GenError> {
        let fault = self.sample_fault(Resource::Books, Method::Post);
        let role = auth_role(true, &fault);

        let raw = self.corpus.next_record()?;
        let mut book = entity::book::synthesize(&mut self.ctx, raw);
        marker::clean_book(&mut book);
        marker::inject_book_create_fault(&mut book, &fault);

        Ok(
            RequestDescriptor::new(Method::Post, self.books_url.clone(), role, &self.credentials)
                .with_body(book),
        )
    }

    fn books_get(&mut self) -> Result<RequestDescriptor, GenError> {
        let fault = self.sample_fault(Resource::Books, Method::Get);
        let book_id = identity_target(&mut self.ctx, &self.books, Resource::Books, &fault)?;
        let url = format!("{}/{}", self.books_url, book_id);
        let role = auth_role(false, &fault);

        Ok(RequestDescriptor::new(Method::Get, url, role, &self.credentials))
    }

    fn books_put(&mut self) -> Result<RequestDescriptor, GenError> {
        let fault = self.sample_fault(Resource::Books, Method::Put);
        let book_id = identity_target(&mut self.ctx, &self.books, Resource::Books, &fault)?;
        let url = format!("{}/{}", self.books_url, book_id);
        let role = auth_role(true, &fault);

        // Fetch the stored record for the target, or synthesize one when
        // the target is deliberately unknown.
        let mut book = match self.books.get(&book_id) {
            Some(record) => record.clone(),
            None => {
                let raw = self.corpus.next_record()?;
                entity::book::synthesize(&mut self.ctx, raw)
            }
        };
        if !book.contains_key("book_id") {
            book.insert("book_id".into(), Value::String(book_id));
        }
        if !book.contains_key("author_id") {
            book.insert("author_id".into(), Value::String(self.ctx.uuid().to_string()));
        }
        if !book.contains_key("category") {
            book.insert("category".into(), json!("computing"));
        }
        marker::inject_book_update_fault(&mut book, &fault);

        Ok(RequestDescriptor::new(Method::Put, url, role, &self.credentials).with_body(book))
    }

    fn books_delete(&mut self) -> Result<RequestDescriptor, GenError> {
        let fault = self.sample_fault(Resource::Books, Method::Delete);
        let book_id = identity_target(&mut self.ctx, &self.books, Resource::Books, &fault)?;
        let url = format!("{}/{}", self.books_url, book_id);
        let role = auth_role(true, &fault);

        // The entity is gone from our view whether or not the API accepts
        // the delete; a stale miss later just manufactures a not-found.
        self.books.remove(&book_id);

        Ok(RequestDescriptor::new(Method::Delete, url, role, &self.credentials))
    }
}
