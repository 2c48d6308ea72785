use crate::domain::FieldDataRecord;
use crate::errors::{ResultResp, ServerError};
use crate::responses::xlsx_response;
use rust_xlsxwriter::{Workbook, XlsxError};

const HEADERS: [&str; 10] = [
    "Created At",
    "Title",
    "Category",
    "Location",
    "Latitude",
    "Longitude",
    "Description",
    "User",
    "Time Taken",
    "ID",
];

fn xlsx_fault(what: &str) -> impl FnOnce(XlsxError) -> ServerError + '_ {
    move |e| ServerError::InternalFault(format!("Failed to write {what}: {e}"))
}

/// Build the workbook bytes: one header row, then one row per record in the given order.
/// Missing optional values are left as empty cells.
pub fn field_data_workbook(records: &[FieldDataRecord]) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    worksheet
        .set_name("Field Data")
        .map_err(xlsx_fault("sheet name"))?;

    for (col, header) in HEADERS.iter().enumerate() {
        worksheet
            .write_string(0, col as u16, *header)
            .map_err(xlsx_fault(header))?;
    }

    for (i, record) in records.iter().enumerate() {
        let r = (i + 1) as u32;

        let created = record.created_at.format("%Y-%m-%d %H:%M UTC").to_string();
        worksheet
            .write_string(r, 0, &created)
            .map_err(xlsx_fault("created at"))?;
        worksheet
            .write_string(r, 1, &record.title)
            .map_err(xlsx_fault("title"))?;
        worksheet
            .write_string(r, 2, record.category.label())
            .map_err(xlsx_fault("category"))?;
        worksheet
            .write_string(r, 3, &record.location)
            .map_err(xlsx_fault("location"))?;

        if let Some(lat) = record.latitude {
            worksheet
                .write_number(r, 4, lat)
                .map_err(xlsx_fault("latitude"))?;
        }
        if let Some(lng) = record.longitude {
            worksheet
                .write_number(r, 5, lng)
                .map_err(xlsx_fault("longitude"))?;
        }

        worksheet
            .write_string(r, 6, &record.description)
            .map_err(xlsx_fault("description"))?;

        if let Some(user) = record.user_id.as_deref() {
            worksheet
                .write_string(r, 7, user)
                .map_err(xlsx_fault("user"))?;
        }
        if let Some(t) = record.time_taken {
            worksheet
                .write_number(r, 8, t)
                .map_err(xlsx_fault("time taken"))?;
        }

        worksheet
            .write_string(r, 9, record.id.as_str())
            .map_err(xlsx_fault("id"))?;
    }

    workbook
        .save_to_buffer()
        .map_err(xlsx_fault("workbook"))
}

pub fn export_field_data_xlsx(records: &[FieldDataRecord], suffix: &str) -> ResultResp {
    let buffer = field_data_workbook(records)?;
    xlsx_response(buffer, &format!("field_data_{suffix}.xlsx"))
}
