//! API Services
//!
//! Thin endpoint wrappers over [`ApiClient`](crate::ApiClient). Every call
//! goes through the intercepted pipeline and returns the decoded JSON body.

pub mod auth;
pub mod todos;
pub mod users;

pub use auth::AuthService;
pub use todos::TodosService;
pub use users::UsersService;
