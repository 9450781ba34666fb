pub mod authority;
pub mod dns_providers;
pub mod error;
pub mod flow;
pub mod records;
pub mod session;
pub mod waiter;
pub mod zone;

pub use error::{IssuanceError, ProviderError};
pub use flow::{IssuanceFlow, WaitPolicy};
