// src/scrape/mod.rs
mod assignments;
mod course;
mod documents;
mod student;

pub use assignments::{Assignment, Assignments};
pub use course::Course;
pub use documents::{DocEntry, Document, DocumentFolder};
pub use student::{CourseRef, Student};
