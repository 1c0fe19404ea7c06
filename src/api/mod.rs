// REST collaborator: client, wire types, and per-kind mutation adapters

pub mod adapters;
pub mod client;
pub mod errors;
pub mod retry;
pub mod types;

pub use adapters::{mutation_style, resource, MutationStyle, RestGateway};
pub use client::ApiClient;
pub use errors::ApiError;
pub use retry::RetryPolicy;
pub use types::{ApiEnvelope, EntityBody, ListBody, ListQueryState, Page, PageMeta};
