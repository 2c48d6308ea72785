pub mod field_data;
pub mod input;

pub use field_data::{Category, FieldDataRecord, RecordId};
pub use input::{FieldDataInput, NewFieldData, ValidationError};
