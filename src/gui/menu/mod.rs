pub mod model;
pub mod view;

pub use model::{MenuButton, Session, Tick};
pub use view::draw;

/// Icons are rendered this much smaller than the button circle.
pub const ICON_PADDING: f64 = 10.0;
