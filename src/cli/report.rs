use std::path::PathBuf;

use colored::Colorize;
use comfy_table::{Cell, Table};

use crate::aggregator::{process_file, Report};
use crate::cli::RunArgs;
use crate::error::Result;
use crate::fmt::{money, pct};

pub fn run(file: &str, args: &RunArgs, details: bool) -> Result<()> {
    let config = args.resolve()?;
    let report = process_file(&PathBuf::from(file), &config)?;
    print_report(&report, details);
    Ok(())
}

pub fn print_report(report: &Report, details: bool) {
    if details {
        print_details(report);
    }
    print_payments(report);
    println!();
    print_commissions(report);
    print_diagnostics(report);
}

fn print_details(report: &Report) {
    let mut table = Table::new();
    table.set_header(vec![
        "Sheet",
        "Description",
        "Cash",
        "Transfer",
        "Method",
        "Employee",
        "Commission",
    ]);
    for txn in &report.transactions {
        table.add_row(vec![
            Cell::new(&txn.row.sheet_name),
            Cell::new(&txn.row.description),
            Cell::new(money(txn.row.cash_amount)),
            Cell::new(money(txn.row.transfer_amount)),
            Cell::new(txn.payment_method),
            Cell::new(txn.employee.as_ref().map_or("", |e| e.name.as_str())),
            Cell::new(money(txn.commission_amount)),
        ]);
    }
    println!("Transactions ({})\n{table}\n", report.transactions.len());
}

fn print_payments(report: &Report) {
    let mut table = Table::new();
    table.set_header(vec!["Payment Method", "Cash", "Transfer", "Total"]);
    for p in &report.payments {
        table.add_row(vec![
            Cell::new(p.method),
            Cell::new(money(p.cash)),
            Cell::new(money(p.transfer)),
            Cell::new(money(p.total_global)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(""),
        Cell::new(money(report.total_sales).bold()),
    ]);
    println!("{}\n{table}", "Sales by Payment Method".green().bold());
}

fn print_commissions(report: &Report) {
    let heading = format!("Commissions ({})", pct(report.commission_pct));
    if report.employees.is_empty() {
        println!("{}", heading.green().bold());
        println!("{}", "No sales carried an employee tag (%A, %J, ...).".yellow());
        return;
    }
    let mut table = Table::new();
    table.set_header(vec!["Employee", "Sales", "Total Sold", "Commission"]);
    for e in &report.employees {
        table.add_row(vec![
            Cell::new(&e.employee),
            Cell::new(e.transactions),
            Cell::new(money(e.total_sales)),
            Cell::new(money(e.commission)),
        ]);
    }
    table.add_row(vec![
        Cell::new("Total".bold()),
        Cell::new(""),
        Cell::new(""),
        Cell::new(money(report.total_commission).bold()),
    ]);
    println!("{}\n{table}", heading.green().bold());
}

fn print_diagnostics(report: &Report) {
    let s = &report.stats;
    println!();
    println!(
        "{} sheets read, {} skipped, {} summary rows and {} empty rows dropped",
        s.sheets_read,
        s.skipped_sheets.len(),
        s.noise_rows,
        s.empty_rows
    );
    if !s.skipped_sheets.is_empty() {
        println!("Skipped sheets: {}", s.skipped_sheets.join(", "));
    }
    if s.repaired_cells > 0 {
        println!(
            "{}",
            format!("{} non-numeric money cells were counted as 0", s.repaired_cells).yellow()
        );
    }
}
