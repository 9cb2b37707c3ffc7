//! Owner-scoped task lists over HTTP.
//!
//! The crate follows a hexagonal layout: [`domain`] holds the task entity,
//! validator, service and ports; [`inbound`] adapts HTTP onto the driving
//! ports; [`outbound`] implements storage and token verification.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod settings;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
