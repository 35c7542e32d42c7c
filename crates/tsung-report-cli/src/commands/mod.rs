pub mod catalog;
pub mod completion;
pub mod names;
pub mod report;
