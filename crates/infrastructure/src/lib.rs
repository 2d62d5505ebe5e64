//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_counter_repository;
mod postgres_counter_repository;
mod redis_counter_repository;

pub use in_memory_counter_repository::InMemoryCounterRepository;
pub use postgres_counter_repository::PostgresCounterRepository;
pub use redis_counter_repository::RedisCounterRepository;
