// Application layer - orchestration on top of the storage primitives.
// `transactions` holds the bodies of the units of work, `service` runs them,
// `preflight` holds the checks callers make before invoking the service.

pub mod error;
pub mod preflight;
pub mod service;
pub mod transactions;

pub use error::*;
pub use preflight::*;
pub use service::*;
pub use transactions::*;
