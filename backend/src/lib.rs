//! MindTrack backend: a session-authenticated mood journal whose user-owned
//! rows are isolated per tenant.
//!
//! Layout follows ports and adapters: [`domain`] holds entities, services and
//! ports; [`inbound`] adapts HTTP onto the services; [`outbound`] implements
//! the ports over PostgreSQL or process memory.

pub mod doc;
pub mod domain;
pub mod inbound;
pub mod middleware;
pub mod outbound;

/// Public OpenAPI surface used by Swagger UI and tooling.
pub use doc::ApiDoc;
pub use middleware::Trace;
