pub mod consolidate;
pub mod prompt;
pub mod validate;
pub mod writer;
