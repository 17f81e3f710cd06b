pub mod frame;
pub mod scroll;
pub mod tween;

pub use frame::*;
pub use scroll::*;
pub use tween::*;
