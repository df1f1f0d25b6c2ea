use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

use crate::error::{FcuError, Result};

/// The tracking-service dialogs the editor can ask the client to show.
///
/// The string forms are the names used on the wire and in the editor menu.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
pub enum DialogKind {
    #[strum(serialize = "Info")]
    Info,
    #[strum(serialize = "Import asset")]
    ImportAsset,
    #[strum(serialize = "Publish")]
    Publish,
    #[strum(serialize = "Asset manager")]
    AssetManager,
}

impl DialogKind {
    /// Parses a wire name such as `"Import asset"`.
    ///
    /// # Errors
    ///
    /// Returns `FcuError::UnknownDialogKind` for any other name.
    pub fn from_name(name: &str) -> Result<Self> {
        DialogKind::from_str(name).map_err(|_| FcuError::UnknownDialogKind(name.to_string()))
    }

    /// Window title used by the dialog implementations.
    pub fn window_title(&self) -> &'static str {
        match self {
            DialogKind::Info => "Info",
            DialogKind::ImportAsset => "ImportAsset",
            DialogKind::Publish => "Publish",
            DialogKind::AssetManager => "AssetManager",
        }
    }
}

/// Identifies one opened dialog instance inside the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DialogHandle(pub u64);
