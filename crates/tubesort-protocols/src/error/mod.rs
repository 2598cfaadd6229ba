//! Error types for the collaborator layer.

mod page;
mod remote;

pub use page::*;
pub use remote::*;
