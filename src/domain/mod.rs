pub mod consolidate;
pub mod entities;
pub mod errors;
