//! Chat frame handling.
//!
//! `frame` holds the wire grammar, `protocol` the per-connection state
//! machine, and `broadcast` the room fan-out both of them feed.

mod broadcast;
mod frame;
mod protocol;

pub use broadcast::{Fanout, broadcast};
pub use frame::{LOGIN_PROMPT, LoginRequest, parse_login};
pub use protocol::{Protocol, SessionState};
