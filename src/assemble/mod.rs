//! Document assembly: block builders and the directionality pass.

mod builder;
mod direction;

pub use builder::DocumentBuilder;
pub use direction::{majority, DirectionalityFixer};
