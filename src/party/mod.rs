//! Watch parties: live connections grouped by party and the per-member
//! session loop that feeds them.

pub mod connection;
pub mod registry;
pub mod session;

pub use connection::{ChannelConnection, ConnectionId, PartyConnection};
pub use registry::PartyRegistry;
pub use session::run_session;
