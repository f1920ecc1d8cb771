//! # Hypatia Test
//!
//! In-memory testing for Hypatia applications. Requests go through the
//! full dispatcher (context building, middleware, routing, error capture)
//! without binding a port.
//!
//! ```ignore
//! let client = TestClient::from_app(app);
//! let response = client
//!     .post("/documents/7/transitions")
//!     .json(&json!({ "event": "Submit" }))
//!     .send()
//!     .await;
//! response.assert_status(StatusCode::OK);
//! ```

#![doc(html_root_url = "https://docs.rs/hypatia-test/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod client;
mod error;
mod response;

pub use client::{TestClient, TestRequest};
pub use error::TestError;
pub use response::TestResponse;
