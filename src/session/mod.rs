//! Session state.
//!
//! A session is the logical scope (one user or one request stream) that
//! exclusively owns one [`AssignmentMemory`]. The memory is passed explicitly
//! into every pipeline call; there is no global variable store.

pub mod memory;
pub mod store;

pub use memory::{AssignmentMemory, VariableBinding};
pub use store::{SessionStore, SharedMemory};
