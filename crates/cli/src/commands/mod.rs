pub mod info;
pub mod maintenance;
pub mod training;
pub mod util;

pub use info::*;
pub use maintenance::*;
pub use training::*;
pub use util::*;
