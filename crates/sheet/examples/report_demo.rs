//! Demo: convert a small labor report to xlsx and CSV
//!
//! Run with: cargo run --example report_demo -p tabxl-sheet

use std::env;

use tabxl_sheet::{full_page_to_excel, page_to_csv, ColumnRule, ConvertOptions, FormatSpec};

const PAGE: &str = r#"
<table id="labor">
  <caption>Labor, week 12</caption>
  <thead>
    <tr><th>Name</th><th class="right_header">Hours</th><th class="right_header">Rate</th><th class="right_header">Pay</th></tr>
  </thead>
  <tbody>
    <tr><td>Alice</td><td class="hours">40</td><td>$25.00</td>
        <td data-excel="FORMULA RELATIVE colm002rowp000*colm001rowp000">$1,000.00</td></tr>
    <tr><td>Bob</td><td class="hours">32.5</td><td>$30.00</td>
        <td data-excel="FORMULA RELATIVE colm002rowp000*colm001rowp000">$975.00</td></tr>
  </tbody>
  <tfoot>
    <tr><td class="bold">Total</td><td class="hours" data-excel="SUM COL">72.5</td><td></td>
        <td class="overtime" data-excel="SUM COL">$1,975.00</td></tr>
  </tfoot>
</table>
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== tabxl Demo ===\n");

    let temp_dir = env::temp_dir();

    let mut options = ConvertOptions::new().with_sheet_names(["Labor"]);
    options.extra_headers = vec![vec!["Acme Corp".to_string()]];
    options.column_widths = vec![vec![ColumnRule::width("A".parse()?, 24.0)]];
    options.custom_formats.insert(
        "overtime".to_string(),
        FormatSpec::new().bold().num_format("$#,##0.00").bg_color("#FFF2CC"),
    );

    let xlsx_path = temp_dir.join("tabxl_demo.xlsx");
    let report = full_page_to_excel(&xlsx_path, PAGE, &options)?;
    println!("Wrote {} ({})", xlsx_path.display(), report.sheets.join(", "));
    for warning in &report.warnings {
        println!("  warning: {warning}");
    }

    let csv_path = temp_dir.join("tabxl_demo.csv");
    let rows = page_to_csv(&csv_path, PAGE, &options)?;
    println!("Wrote {} ({} rows)", csv_path.display(), rows.len());
    for row in &rows {
        println!("  {}", row.join(" | "));
    }

    Ok(())
}
