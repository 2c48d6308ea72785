pub mod export_xlsx;

pub use export_xlsx::{export_field_data_xlsx, field_data_workbook};
