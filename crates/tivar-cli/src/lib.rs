//! Library half of the `tivar` command-line tool.

pub mod logging;
pub mod report;
