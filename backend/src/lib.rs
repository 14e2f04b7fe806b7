//! Forum backend library: domain model, HTTP adapter, and infrastructure
//! adapters for a small question-and-answer forum.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;
pub mod server;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
/// Request-scoped trace identifier.
pub use domain::TraceId;
/// Trace middleware attached to every route.
pub use middleware::Trace;
