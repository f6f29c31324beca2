//! Users service.

use serde_json::Value;

use crate::client::ApiClient;
use crate::core::HttpTransport;
use crate::error::ApiResult;

/// `/users` endpoints.
pub struct UsersService<'a, T: HttpTransport> {
    client: &'a ApiClient<T>,
}

impl<'a, T: HttpTransport> UsersService<'a, T> {
    pub(crate) fn new(client: &'a ApiClient<T>) -> Self {
        Self { client }
    }

    /// Profile of the signed-in user.
    pub async fn me(&self) -> ApiResult<Value> {
        self.client.get("/users/me").await
    }
}
