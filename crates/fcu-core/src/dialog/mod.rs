//! Dialog domain module: dialog kinds, handles and UI seams.

mod model;
mod view;

pub use model::{DialogHandle, DialogKind};
pub use view::{DialogFactory, DialogWindow, PublishView};
