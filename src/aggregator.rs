use std::collections::BTreeMap;
use std::path::Path;

use tracing::info;

use crate::classifier::{classify, NoiseFilter, Roster};
use crate::error::{CuadreError, Result};
use crate::loader::{self, LoadOptions, LoadStats, Sheet};
use crate::models::{ClassifiedTransaction, EmployeeSummary, PaymentSummary, RawRow};
use crate::settings::{validate_pct, ColumnNames, Settings};

// ---------------------------------------------------------------------------
// Run configuration
// ---------------------------------------------------------------------------

/// Everything one run needs, resolved from `Settings` plus command-line overrides.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub commission_pct: f64,
    pub header_row: u32,
    pub columns: ColumnNames,
    pub noise: NoiseFilter,
    pub roster: Roster,
}

impl RunConfig {
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            commission_pct: settings.commission_pct,
            header_row: settings.header_row,
            columns: settings.columns.clone(),
            noise: NoiseFilter::new(&settings.noise_keywords),
            roster: Roster::from_settings(&settings.employees),
        })
    }

    pub fn with_pct(mut self, pct: f64) -> Result<Self> {
        validate_pct(pct)?;
        self.commission_pct = pct;
        Ok(self)
    }

    fn load_options(&self) -> LoadOptions<'_> {
        LoadOptions {
            header_row: self.header_row,
            columns: &self.columns,
            noise: &self.noise,
        }
    }
}

// ---------------------------------------------------------------------------
// Classification and grouping
// ---------------------------------------------------------------------------

pub fn commission_for(total_sale: f64, pct: f64) -> f64 {
    total_sale * (pct / 100.0)
}

pub fn classify_rows(rows: Vec<RawRow>, roster: &Roster, pct: f64) -> Vec<ClassifiedTransaction> {
    rows.into_iter()
        .map(|row| {
            let (payment_method, employee) = classify(&row, roster);
            let total = row.cash_amount + row.transfer_amount;
            let commission_amount = if employee.is_some() {
                commission_for(total, pct)
            } else {
                0.0
            };
            ClassifiedTransaction {
                row,
                payment_method,
                employee,
                commission_amount,
            }
        })
        .collect()
}

/// Cash and transfer totals per payment method actually seen.
pub fn summarize_payments(txns: &[ClassifiedTransaction]) -> Vec<PaymentSummary> {
    let mut by_method = BTreeMap::new();
    for txn in txns {
        let entry = by_method.entry(txn.payment_method).or_insert((0.0, 0.0));
        entry.0 += txn.row.cash_amount;
        entry.1 += txn.row.transfer_amount;
    }
    by_method
        .into_iter()
        .map(|(method, (cash, transfer))| PaymentSummary {
            method,
            cash,
            transfer,
            total_global: cash + transfer,
        })
        .collect()
}

/// Sales and commission per tagged employee, highest commission first.
pub fn summarize_employees(txns: &[ClassifiedTransaction]) -> Vec<EmployeeSummary> {
    let mut by_employee: BTreeMap<&str, EmployeeSummary> = BTreeMap::new();
    for txn in txns {
        let Some(employee) = &txn.employee else {
            continue;
        };
        let entry = by_employee
            .entry(employee.name.as_str())
            .or_insert_with(|| EmployeeSummary {
                employee: employee.name.clone(),
                transactions: 0,
                total_sales: 0.0,
                commission: 0.0,
            });
        entry.transactions += 1;
        entry.total_sales += txn.total_sale();
        entry.commission += txn.commission_amount;
    }
    let mut out: Vec<EmployeeSummary> = by_employee.into_values().collect();
    out.sort_by(|a, b| {
        b.commission
            .total_cmp(&a.commission)
            .then_with(|| a.employee.cmp(&b.employee))
    });
    out
}

// ---------------------------------------------------------------------------
// Full run
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Report {
    pub source: String,
    pub checksum: Option<String>,
    pub commission_pct: f64,
    pub transactions: Vec<ClassifiedTransaction>,
    pub payments: Vec<PaymentSummary>,
    pub employees: Vec<EmployeeSummary>,
    pub total_sales: f64,
    pub total_commission: f64,
    pub stats: LoadStats,
}

/// Filter, classify and aggregate already-read sheets.
pub fn build_report(source: &str, sheets: &[Sheet], config: &RunConfig) -> Result<Report> {
    let loaded = loader::load_rows(sheets, &config.load_options());
    if loaded.rows.is_empty() {
        return Err(CuadreError::NoUsableData(source.to_string()));
    }

    let transactions = classify_rows(loaded.rows, &config.roster, config.commission_pct);
    let payments = summarize_payments(&transactions);
    let employees = summarize_employees(&transactions);
    let total_sales: f64 = transactions.iter().map(ClassifiedTransaction::total_sale).sum();
    let total_commission: f64 = transactions.iter().map(|t| t.commission_amount).sum();

    info!(
        transactions = transactions.len(),
        employees = employees.len(),
        pct = config.commission_pct,
        "report built"
    );

    Ok(Report {
        source: source.to_string(),
        checksum: None,
        commission_pct: config.commission_pct,
        transactions,
        payments,
        employees,
        total_sales,
        total_commission,
        stats: loaded.stats,
    })
}

pub fn process_file(file_path: &Path, config: &RunConfig) -> Result<Report> {
    let input = loader::read_source(file_path)?;
    let source = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("workbook");
    let mut report = build_report(source, &input.sheets, config)?;
    report.checksum = Some(input.checksum);
    Ok(report)
}
