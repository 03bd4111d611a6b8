pub mod compose;
pub mod format;
pub mod rank;

pub use compose::{Digest, compose};
