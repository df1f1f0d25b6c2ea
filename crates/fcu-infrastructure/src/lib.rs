pub mod config_service;
pub mod fs_editor;
pub mod ftrack_rest;
pub mod launch;
pub mod logging;
pub mod menu_script;
pub mod paths;
pub mod storage;
pub mod transport;

pub use crate::config_service::ConfigService;
pub use crate::fs_editor::FsEngineEditor;
pub use crate::ftrack_rest::FtrackRestClient;
pub use crate::paths::FcuPaths;
pub use crate::transport::TcpTransport;
