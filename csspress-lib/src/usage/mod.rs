pub mod cleaner;
pub mod files;
pub mod report;
pub mod tokens;
