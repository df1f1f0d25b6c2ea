//! Remote-call channel to the editor: JSON-lines frames over TCP.

mod frame;
mod tcp;

pub use frame::Frame;
pub use tcp::{LineConnection, TcpTransport};
