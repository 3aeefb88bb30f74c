pub mod table;
pub mod validate;

pub use table::{load_table, CsvTable, HeaderMode, PaperRow};
