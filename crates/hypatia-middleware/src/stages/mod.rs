//! Built-in middleware stages.

pub mod request_id;
pub mod request_log;

pub use request_id::RequestIdMiddleware;
pub use request_log::RequestLogMiddleware;
