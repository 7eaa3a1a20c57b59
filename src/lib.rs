pub mod assume_role;
pub mod context;
pub mod error;
pub mod external;
pub mod handler;
pub mod mfa;
pub mod profile;
pub mod role;
pub mod run;
pub mod session;

#[cfg(test)]
pub(crate) mod testing;

pub use error::{Error, ExternalError, Result};
