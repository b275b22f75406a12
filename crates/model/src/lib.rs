pub mod core;
pub mod field;
pub mod filter;
pub mod records;
