pub mod client;
pub mod errors;
pub mod types;

pub use client::{HttpQueryApi, QueryApi};
pub use errors::ApiError;
pub use types::{AuthSession, QueryOutcome, Record};
