pub mod completion;
pub mod plan;
pub mod sync;
