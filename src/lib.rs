pub mod allowed;
pub mod clock;
pub mod config;
pub mod errors;
pub mod field;
pub mod range;
pub mod reconcile;
pub mod serde;
pub mod timestring;
