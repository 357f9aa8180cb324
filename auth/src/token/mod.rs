pub mod bearer;
pub mod errors;

pub use bearer::Token;
pub use errors::TokenError;
