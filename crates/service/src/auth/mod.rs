//! Auth module: three-layer architecture (domain, repository, service).
//!
//! Tenant signup, member registration, login and token verification live
//! here. `token` owns the JWT claim set shared with the HTTP layer.

pub mod domain;
pub mod errors;
pub mod repository;
pub mod service;
pub mod token;
pub mod repo;

pub use service::AuthService;
