//! Business layer of the project hub.
//! - `auth`: tenant registration, login and JWT claims.
//! - `services`: tenant-scoped resource services behind the `CrudService` contract.
//! - `pagination`, `context`, `errors`: shared request plumbing.

pub mod auth;
pub mod context;
pub mod crud;
pub mod errors;
pub mod pagination;
pub mod services;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use context::RequestContext;
pub use crud::{ChildListing, CrudService};
pub use errors::ServiceError;
pub use pagination::{Page, Pagination, SortSpec};
pub use services::Services;
