//! CLI command implementations

pub mod add;
pub mod inspect;
pub mod stream;

mod payload;
