//! Todos service.

use serde::Serialize;
use serde_json::Value;
use std::fmt::Display;

use crate::client::ApiClient;
use crate::core::HttpTransport;
use crate::error::ApiResult;

/// `/todos` endpoints.
pub struct TodosService<'a, T: HttpTransport> {
    client: &'a ApiClient<T>,
}

impl<'a, T: HttpTransport> TodosService<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    /// All todos of the signed-in user.
    pub async fn list(&self) -> ApiResult<Value> {
        self.client.get("/todos").await
    }

    /// One todo by id.
    pub async fn get(&self, id: impl Display) -> ApiResult<Value> {
        self.client.get(&format!("/todos/{}", id)).await
    }

    /// Create a todo from `payload`.
    pub async fn create<P: Serialize + ?Sized>(&self, payload: &P) -> ApiResult<Value> {
        self.client.post("/todos", payload).await
    }

    /// Partial update.
    pub async fn update<P: Serialize + ?Sized>(
        &self,
        id: impl Display,
        payload: &P,
    ) -> ApiResult<Value> {
        self.client.patch(&format!("/todos/{}", id), payload).await
    }

    /// Delete a todo by id.
    pub async fn delete(&self, id: impl Display) -> ApiResult<Value> {
        self.client.delete(&format!("/todos/{}", id)).await
    }
}
