//! ResourceService: stateless operations over a `ResourceStore`; RequestValidator: inbound payload rules.

mod resource;
mod validation;
pub use resource::ResourceService;
pub use validation::{ListQuery, RequestValidator};
