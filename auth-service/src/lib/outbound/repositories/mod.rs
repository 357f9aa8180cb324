mod credentials;
pub mod sqlite;
mod tokens;

pub use sqlite::SqliteAuthRepository;
