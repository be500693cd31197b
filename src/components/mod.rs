pub mod teachers;
pub mod ui;
