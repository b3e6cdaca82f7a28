pub mod error;
pub mod sync;
