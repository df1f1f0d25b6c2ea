//! Remote Call Gateway.
//!
//! # Module Structure
//!
//! - `outbound`: client-to-server calls (`RemoteGateway`)
//! - `inbound`: decoding of server-to-client calls (`InboundCall`)
//! - `scheduler`: marshalling of inbound work onto the main loop (`MainThreadQueue`)
//! - `remote_editor`: the editor surface of a live session (`RemoteEditor`)

mod inbound;
mod outbound;
mod remote_editor;
mod scheduler;

pub use inbound::{InboundCall, client_methods};
pub use outbound::{RemoteGateway, encode_args, server_methods};
pub use remote_editor::RemoteEditor;
pub use scheduler::{Job, MainThreadQueue};
