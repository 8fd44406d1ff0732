pub mod in_memory_auth_store;
pub mod postgres_auth_store;

pub use in_memory_auth_store::InMemoryAuthStore;
pub use postgres_auth_store::PostgresAuthStore;
