pub mod color;
pub mod optimizer;
pub mod prefix_table;
pub mod prefixer;
