//! Spreadsheet report of expenses.
//!
//! A report is laid out in two steps. [`ExpenseReport::build`] groups the
//! expenses by calendar date and decides what every row shows;
//! [`ExpenseReport::to_xlsx`] turns that layout into a styled workbook.
//!
//! Only the first row of a date group carries the date; a blank row and a
//! grand-total row close the sheet.

use std::collections::BTreeMap;

use rust_xlsxwriter::{
    ColNum, Color, Format, FormatAlign, FormatBorder, FormatPattern, RowNum, Workbook, Worksheet,
    XlsxError,
};

use crate::Expense;

pub const REPORT_HEADERS: [&str; 7] = [
    "Date",
    "From",
    "To",
    "Client",
    "Kilometers",
    "Rate",
    "Total",
];

const SHEET_NAME: &str = "Expenses";
const TOTAL_LABEL: &str = "Total";
const COLUMN_WIDTHS: [f64; 7] = [14.0, 22.0, 22.0, 24.0, 10.0, 10.0, 12.0];
const GRID_COLOR: u32 = 0xE2E8F0;
const NUMBER_FORMAT: &str = "#,##0.00";

#[derive(Clone, Debug, PartialEq)]
pub struct ReportRow {
    /// `YYYY-MM-DD` on the first row of a date group, `None` on the others.
    pub date_label: Option<String>,
    pub from_location: String,
    pub to_location: String,
    pub client_name: String,
    pub kilometers: f64,
    pub rate_per_km: f64,
    pub total: f64,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ExpenseReport {
    pub rows: Vec<ReportRow>,
    /// Sum of `total` over every expense in the report.
    pub grand_total: f64,
}

impl ExpenseReport {
    /// Lays out `expenses` (expected oldest first) grouped by date.
    ///
    /// Groups are emitted in ascending date order; inside a group the input
    /// order is kept.
    pub fn build(expenses: &[Expense]) -> Self {
        let mut groups: BTreeMap<String, Vec<&Expense>> = BTreeMap::new();
        for expense in expenses {
            groups
                .entry(expense.date.format("%Y-%m-%d").to_string())
                .or_default()
                .push(expense);
        }

        let rows = groups
            .into_iter()
            .flat_map(|(date_key, items)| {
                items.into_iter().enumerate().map(move |(idx, expense)| ReportRow {
                    date_label: (idx == 0).then(|| date_key.clone()),
                    from_location: expense.from_location.clone(),
                    to_location: expense.to_location.clone(),
                    client_name: expense.client_name.clone(),
                    kilometers: expense.kilometers,
                    rate_per_km: expense.rate_per_km,
                    total: expense.total,
                })
            })
            .collect();

        Self {
            rows,
            grand_total: expenses.iter().map(|expense| expense.total).sum(),
        }
    }

    /// Whether the sheet ends with the blank separator and the total row.
    pub fn has_total_row(&self) -> bool {
        !self.rows.is_empty()
    }

    /// Writes the report as a single-sheet xlsx workbook.
    ///
    /// `currency_symbol` prefixes every value of the Total column.
    pub fn to_xlsx(&self, currency_symbol: &str) -> Result<Vec<u8>, XlsxError> {
        let mut workbook = Workbook::new();
        let sheet = workbook.add_worksheet();
        self.write_sheet(sheet, currency_symbol)?;
        workbook.save_to_buffer()
    }

    fn write_sheet(&self, sheet: &mut Worksheet, currency_symbol: &str) -> Result<(), XlsxError> {
        let styles = Styles::new(currency_symbol);
        sheet.set_name(SHEET_NAME)?;

        for (col, width) in COLUMN_WIDTHS.iter().enumerate() {
            sheet.set_column_width(to_col(col)?, *width)?;
        }

        for (col, title) in REPORT_HEADERS.iter().enumerate() {
            sheet.write_string_with_format(0, to_col(col)?, *title, &styles.header)?;
        }

        for (idx, row) in self.rows.iter().enumerate() {
            let row_num = to_row(idx + 1)?;
            match &row.date_label {
                Some(label) => sheet.write_string_with_format(row_num, 0, label, &styles.text)?,
                None => sheet.write_blank(row_num, 0, &styles.text)?,
            };
            sheet.write_string_with_format(row_num, 1, &row.from_location, &styles.text)?;
            sheet.write_string_with_format(row_num, 2, &row.to_location, &styles.text)?;
            sheet.write_string_with_format(row_num, 3, &row.client_name, &styles.text)?;
            sheet.write_number_with_format(row_num, 4, row.kilometers, &styles.number)?;
            sheet.write_number_with_format(row_num, 5, row.rate_per_km, &styles.number)?;
            sheet.write_number_with_format(row_num, 6, row.total, &styles.currency)?;
        }

        if self.has_total_row() {
            // one blank separator row after the data
            let row_num = to_row(self.rows.len() + 2)?;
            for col in [0, 1, 2, 4, 5] {
                sheet.write_blank(row_num, col, &styles.total_text)?;
            }
            sheet.write_string_with_format(row_num, 3, TOTAL_LABEL, &styles.total_text)?;
            sheet.write_number_with_format(row_num, 6, self.grand_total, &styles.total_currency)?;
        }

        Ok(())
    }
}

struct Styles {
    header: Format,
    text: Format,
    number: Format,
    currency: Format,
    total_text: Format,
    total_currency: Format,
}

impl Styles {
    fn new(currency_symbol: &str) -> Self {
        let grid = Color::RGB(GRID_COLOR);
        let cell = Format::new()
            .set_align(FormatAlign::VerticalCenter)
            .set_border(FormatBorder::Thin)
            .set_border_color(grid);
        let currency_format = format!("\"{currency_symbol}\"{NUMBER_FORMAT}");

        Self {
            header: cell
                .clone()
                .set_bold()
                .set_align(FormatAlign::Center)
                .set_pattern(FormatPattern::Solid)
                .set_background_color(grid),
            text: cell.clone(),
            number: cell.clone().set_num_format(NUMBER_FORMAT),
            currency: cell.clone().set_num_format(currency_format.as_str()),
            total_text: cell.clone().set_bold(),
            total_currency: cell.set_bold().set_num_format(currency_format.as_str()),
        }
    }
}

fn to_row(idx: usize) -> Result<RowNum, XlsxError> {
    RowNum::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}

fn to_col(idx: usize) -> Result<ColNum, XlsxError> {
    ColNum::try_from(idx).map_err(|_| XlsxError::RowColumnLimitError)
}
