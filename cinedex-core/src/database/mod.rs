pub mod memory;
pub mod ports;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PostgresDatabase;
