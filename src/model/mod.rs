pub mod election;
pub mod student;

pub use election::{Election, ElectionDate};
pub use student::Student;
