//! Session domain module.
//!
//! # Module Structure
//!
//! - `model`: the live client↔server session (`Session`)
//! - `transport`: channel traits and errors (`Transport`, `Connection`, `TransportError`)

mod model;
mod transport;

pub use model::Session;
pub use transport::{
    Connection, InboundReceiver, InboundRequest, InboundSender, Transport, TransportError,
    inbound_channel,
};
