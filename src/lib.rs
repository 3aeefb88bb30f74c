//! Tools for a paper metadata CSV: a validator for the research papers
//! index and a markdown status reporter for the reading list.

pub mod cli;
pub mod data;
pub mod error;
pub mod logging;
pub mod report;
