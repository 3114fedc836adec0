// Form input: the hiring metadata model, submit-time validation, and the
// persisted draft that survives reloads.

pub mod handlers;
pub mod models;
pub mod store;
pub mod validation;

pub use models::FormInput;
