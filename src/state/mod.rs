//! State management module.
//!
//! Contains the Hub (shared engine state) and the entities it indexes.

mod hub;
mod registry;
mod rooms;
pub(crate) mod session;

pub use hub::Hub;
pub use registry::Registry;
pub use rooms::RoomDirectory;
pub use session::{Outbound, Session, SessionId, SessionIdGenerator};
