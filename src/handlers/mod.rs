pub mod field_data;
pub mod health;
