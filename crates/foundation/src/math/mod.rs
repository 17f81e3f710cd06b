pub mod interp;
pub mod mat;
pub mod vec;

pub use interp::*;
pub use mat::*;
pub use vec::*;
