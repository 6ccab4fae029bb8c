pub mod backend;
pub mod connection;

pub use backend::PgBackend;
