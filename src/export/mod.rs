use rust_xlsxwriter::{Format, Workbook, XlsxError};

use crate::core::{ComparisonRow, GrowthPoint, PlanSummary};

pub fn workbook_bytes(
    summary: &PlanSummary,
    growth: &[GrowthPoint],
    options: &[ComparisonRow],
) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = build_workbook(summary, growth, options)?;
    workbook.save_to_buffer()
}

fn build_workbook(
    summary: &PlanSummary,
    growth: &[GrowthPoint],
    options: &[ComparisonRow],
) -> Result<Workbook, XlsxError> {
    let mut workbook = Workbook::new();
    let header = Format::new().set_bold();

    let sheet = workbook.add_worksheet();
    sheet.set_name("Summary")?;
    sheet.set_column_width(0, 22)?;
    sheet.set_column_width(1, 16)?;
    sheet.write_string_with_format(0, 0, "Summary", &header)?;
    sheet.write_string_with_format(0, 1, "Amount", &header)?;
    let summary_rows = [
        ("Total Investment", summary.total_investment),
        ("Equity FV", summary.future_value_equity),
        ("Traditional FV", summary.future_value_traditional),
    ];
    for (idx, (label, amount)) in summary_rows.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, *label)?;
        sheet.write_number(row, 1, *amount)?;
    }

    // Sheet is omitted entirely when the growth series was never computed.
    if !growth.is_empty() {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Growth Over Time")?;
        sheet.write_string_with_format(0, 0, "Year", &header)?;
        sheet.write_string_with_format(0, 1, "Equity-Based", &header)?;
        sheet.write_string_with_format(0, 2, "Traditional", &header)?;
        for (idx, point) in growth.iter().enumerate() {
            let row = idx as u32 + 1;
            sheet.write_number(row, 0, point.age as f64)?;
            sheet.write_number(row, 1, point.equity_value)?;
            sheet.write_number(row, 2, point.traditional_value)?;
        }
    }

    let sheet = workbook.add_worksheet();
    sheet.set_name("Option Comparison")?;
    sheet.set_column_width(0, 32)?;
    sheet.set_column_width(1, 20)?;
    sheet.set_column_width(3, 20)?;
    sheet.write_string_with_format(0, 0, "Option", &header)?;
    sheet.write_string_with_format(0, 1, "Expected Returns (p.a.)", &header)?;
    sheet.write_string_with_format(0, 2, "Risk Level", &header)?;
    sheet.write_string_with_format(0, 3, "Liquidity", &header)?;
    for (idx, option) in options.iter().enumerate() {
        let row = idx as u32 + 1;
        sheet.write_string(row, 0, option.option_name)?;
        sheet.write_number(row, 1, option.expected_return_percent)?;
        sheet.write_string(row, 2, option.risk_level.label())?;
        sheet.write_string(row, 3, option.liquidity)?;
    }

    Ok(workbook)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PlanInputs, comparison_table, project_plan, yearly_series};

    fn sample_inputs() -> PlanInputs {
        PlanInputs {
            current_age: 30,
            retirement_age: 60,
            monthly_investment: 5_000.0,
            equity_rate: 12.0,
            traditional_rate: 7.0,
        }
    }

    #[test]
    fn workbook_bytes_form_a_zip_archive() {
        let inputs = sample_inputs();
        let summary = project_plan(&inputs);
        let growth: Vec<_> = yearly_series(&inputs).collect();
        let bytes =
            workbook_bytes(&summary, &growth, comparison_table()).expect("workbook must build");
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..4], b"PK\x03\x04");
    }

    #[test]
    fn growth_sheet_is_omitted_when_series_was_not_computed() {
        let summary = project_plan(&sample_inputs());
        let mut workbook =
            build_workbook(&summary, &[], comparison_table()).expect("workbook must build");
        assert!(workbook.worksheet_from_name("Summary").is_ok());
        assert!(workbook.worksheet_from_name("Option Comparison").is_ok());
        assert!(workbook.worksheet_from_name("Growth Over Time").is_err());
    }

    #[test]
    fn growth_sheet_is_present_when_series_was_computed() {
        let inputs = sample_inputs();
        let summary = project_plan(&inputs);
        let growth: Vec<_> = yearly_series(&inputs).collect();
        let mut workbook =
            build_workbook(&summary, &growth, comparison_table()).expect("workbook must build");
        assert!(workbook.worksheet_from_name("Growth Over Time").is_ok());
    }
}
