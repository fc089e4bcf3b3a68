pub mod color;
pub mod preprocessing;
pub mod morphology;
pub mod segmentation;
pub mod extraction;
pub mod classification;

pub use preprocessing::*;
pub use segmentation::*;
pub use extraction::*;
pub use classification::*;
