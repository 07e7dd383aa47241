pub mod uint;
pub use uint::*;

pub mod time;
pub use time::*;
