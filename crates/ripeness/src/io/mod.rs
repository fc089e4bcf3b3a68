pub mod loader;
pub mod labels;

pub use loader::*;
pub use labels::*;
