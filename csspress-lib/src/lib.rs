pub mod error;
pub mod parser;
pub mod press;
pub mod style;
pub mod tree;
pub mod usage;

pub use error::Error;
