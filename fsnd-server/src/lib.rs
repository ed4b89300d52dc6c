//! fsnd-server: the fyyur listings site, the trivia API and the coffee
//! shop API behind one axum router
//!
//! Handlers validate input against declarative field rules, talk to a
//! store trait (PostgreSQL or in-memory), and answer with a uniform JSON
//! envelope. Drink management is guarded by Auth0 bearer tokens checked
//! against the tenant's published key set.

pub mod auth;
pub mod config;
pub mod db;
pub mod http;
pub mod models;

pub use auth::{AuthError, Authorizer};
pub use config::AuthConfig;
pub use db::{MemoryStore, PgStore, StoreError};
pub use http::{build_router, run_server, ApiError, AppState, ServerConfig};
