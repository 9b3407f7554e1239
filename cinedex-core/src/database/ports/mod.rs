//! Repository ports (interfaces) implemented by the in-memory and
//! PostgreSQL stores.

pub mod collection;
pub mod movies;
pub mod users;

pub use collection::Collection;
pub use movies::MoviesRepository;
pub use users::UsersRepository;
