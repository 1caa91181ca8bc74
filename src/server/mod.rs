mod agents;
pub mod dto;
mod packages;
mod pending;
mod policies;
pub mod response;
mod router;
mod tenants;
mod tokens;

pub use router::{AppState, create_router};
