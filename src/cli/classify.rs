use comfy_table::{Cell, Table};

use crate::aggregator::classify_rows;
use crate::cli::RunArgs;
use crate::error::Result;
use crate::fmt::{money, pct};
use crate::models::RawRow;

pub fn run(
    description: &str,
    type_hint: Option<String>,
    cash: f64,
    transfer: f64,
    args: &RunArgs,
) -> Result<()> {
    let config = args.resolve()?;

    if let Some(keyword) = config.noise.matched(description) {
        println!("Summary row (matches \"{keyword}\"): dropped before classification.");
        return Ok(());
    }
    let row = RawRow {
        description: description.to_string(),
        type_hint,
        cash_amount: cash,
        transfer_amount: transfer,
        sheet_name: String::new(),
    };
    if !row.moved_money() {
        println!("No cash or transfer amount: this line would be dropped from a report.");
    }

    let txn = classify_rows(vec![row], &config.roster, config.commission_pct).remove(0);
    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    table.add_row(vec![Cell::new("Payment method"), Cell::new(txn.payment_method)]);
    table.add_row(vec![
        Cell::new("Employee"),
        Cell::new(
            txn.employee
                .as_ref()
                .map_or_else(|| "(no commission)".to_string(), |e| format!("{} (%{})", e.name, e.tag)),
        ),
    ]);
    table.add_row(vec![Cell::new("Total sale"), Cell::new(money(txn.total_sale()))]);
    table.add_row(vec![
        Cell::new(format!("Commission ({})", pct(config.commission_pct))),
        Cell::new(money(txn.commission_amount)),
    ]);
    println!("{table}");
    Ok(())
}
