use super::RenderError;
use crate::table::{IndexTable, DEFAULT_CATEGORY_COLUMN, DEFAULT_REGION_COLUMN};
use rust_xlsxwriter::Workbook;

pub const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
pub const EXPORT_SHEET: &str = "데이터";

/// Wide workbook export on a single `데이터` sheet: region, category, then
/// one numeric column per period. Missing cells are left blank.
pub fn index_table_xlsx(table: &IndexTable) -> Result<Vec<u8>, RenderError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(EXPORT_SHEET)?;

    let headers = [DEFAULT_REGION_COLUMN.to_string(), DEFAULT_CATEGORY_COLUMN.to_string()]
        .into_iter()
        .chain(table.periods().iter().map(ToString::to_string));
    for (col, header) in headers.enumerate() {
        sheet.write_string(0, column(col)?, header)?;
    }

    for (idx, row) in table.rows().iter().enumerate() {
        let line = u32::try_from(idx + 1).map_err(|_| RenderError::TooLarge)?;
        sheet.write_string(line, 0, row.region.as_str())?;
        sheet.write_string(line, 1, row.category.as_str())?;
        for (offset, value) in row.values.iter().enumerate() {
            if let Some(value) = value {
                sheet.write_number(line, column(offset + 2)?, *value)?;
            }
        }
    }

    Ok(workbook.save_to_buffer()?)
}

fn column(idx: usize) -> Result<u16, RenderError> {
    u16::try_from(idx).map_err(|_| RenderError::TooLarge)
}
