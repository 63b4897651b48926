//! External file formats: the line-oriented uncertain transaction format
//! read by the CLI, and the CSV results format it writes.

pub mod input;
pub mod output;
