pub mod datetime;
pub mod spreadsheet;
pub mod validation;
