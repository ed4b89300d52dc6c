//! Persistence layer
//!
//! Route handlers talk to the store traits; `PgStore` and `MemoryStore`
//! implement all three.

pub mod memory;
pub mod migrations;
pub mod pool;
pub mod postgres;
mod store;

pub use memory::MemoryStore;
pub use pool::{connect, create_pool, PoolConfig};
pub use postgres::PgStore;
pub use store::{CoffeeStore, FyyurStore, StoreError, StoreResult, TriviaStore};
