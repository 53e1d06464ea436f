pub mod compress;
pub mod health;
pub mod ui;

pub use compress::*;
pub use health::*;
pub use ui::*;
