pub mod backup;
pub mod core;
pub mod form;
pub mod grading;
pub mod students;
