pub mod entity_store;
pub mod memory_store;
pub mod query;
pub mod redis_store;
