use fcu_core::asset::INTEGRATION_VERSION;
use std::path::Path;

pub fn show(config_path: &Path) {
    println!("fcu {}", env!("CARGO_PKG_VERSION"));
    println!("Integration version: {}", INTEGRATION_VERSION);
    println!("Configuration: {}", config_path.display());
}
