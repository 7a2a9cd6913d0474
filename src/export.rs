use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use serde::Serialize;
use tracing::{info, warn};

use crate::aggregator::Report;
use crate::error::Result;
use crate::loader::LoadStats;
use crate::models::{DetailRecord, EmployeeSummary, PaymentSummary};

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

pub fn default_stem() -> String {
    let stamp = chrono::Local::now().format("%Y-%m-%d_%H-%M");
    format!("consolidated_{stamp}")
}

pub const DETAIL_SHEET: &str = "Detallado_Ventas";
pub const PAYMENTS_SHEET: &str = "Resumen_Pagos";
pub const COMMISSIONS_SHEET: &str = "Resumen_Comisiones";

#[derive(Debug)]
pub struct ExportFiles {
    /// The consolidated workbook; the artifact that gets uploaded.
    pub workbook: PathBuf,
    pub detail: PathBuf,
    pub payments: PathBuf,
    /// Absent when no transaction carried an employee tag.
    pub commissions: Option<PathBuf>,
    pub json: PathBuf,
}

impl ExportFiles {
    pub fn all(&self) -> Vec<&Path> {
        let mut out = vec![
            self.workbook.as_path(),
            self.detail.as_path(),
            self.payments.as_path(),
        ];
        if let Some(c) = &self.commissions {
            out.push(c.as_path());
        }
        out.push(self.json.as_path());
        out
    }
}

#[derive(Serialize)]
struct ReportDocument<'a> {
    source: &'a str,
    checksum: Option<&'a str>,
    generated_at: String,
    commission_pct: f64,
    total_sales: f64,
    total_commission: f64,
    payments: &'a [PaymentSummary],
    employees: &'a [EmployeeSummary],
    transactions: Vec<DetailRecord<'a>>,
    diagnostics: &'a LoadStats,
}

fn write_csv<T: Serialize>(path: &Path, records: impl IntoIterator<Item = T>) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;
    for record in records {
        wtr.serialize(record)?;
    }
    wtr.flush()?;
    Ok(())
}

fn write_headers(sheet: &mut Worksheet, headers: &[&str], bold: &Format) -> Result<()> {
    for (col, header) in headers.iter().enumerate() {
        sheet.write_string_with_format(0, col as u16, *header, bold)?;
    }
    Ok(())
}

/// Detail, payment and commission tables as one workbook. The commission
/// sheet is left out when nobody earned commission.
pub fn build_workbook(report: &Report) -> Result<Workbook> {
    let mut workbook = Workbook::new();
    let bold = Format::new().set_bold();
    let money = Format::new().set_num_format("$#,##0");

    let sheet = workbook.add_worksheet().set_name(DETAIL_SHEET)?;
    write_headers(
        sheet,
        &[
            "Description",
            "Cash",
            "Transfer",
            "Payment method",
            "Employee",
            "Total sale",
            "Commission",
            "Sheet",
        ],
        &bold,
    )?;
    for (i, txn) in report.transactions.iter().enumerate() {
        let row = i as u32 + 1;
        let record = DetailRecord::from(txn);
        sheet.write_string(row, 0, record.description)?;
        sheet.write_number_with_format(row, 1, record.cash_amount, &money)?;
        sheet.write_number_with_format(row, 2, record.transfer_amount, &money)?;
        sheet.write_string(row, 3, record.payment_method)?;
        if !record.employee.is_empty() {
            sheet.write_string(row, 4, record.employee)?;
        }
        sheet.write_number_with_format(row, 5, record.total_sale, &money)?;
        sheet.write_number_with_format(row, 6, record.commission_amount, &money)?;
        sheet.write_string(row, 7, record.sheet)?;
    }
    sheet.autofit();

    let sheet = workbook.add_worksheet().set_name(PAYMENTS_SHEET)?;
    write_headers(sheet, &["Payment method", "Cash", "Transfer", "Total"], &bold)?;
    for (i, p) in report.payments.iter().enumerate() {
        let row = i as u32 + 1;
        sheet.write_string(row, 0, p.method.label())?;
        sheet.write_number_with_format(row, 1, p.cash, &money)?;
        sheet.write_number_with_format(row, 2, p.transfer, &money)?;
        sheet.write_number_with_format(row, 3, p.total_global, &money)?;
    }
    sheet.autofit();

    if !report.employees.is_empty() {
        let sheet = workbook.add_worksheet().set_name(COMMISSIONS_SHEET)?;
        write_headers(
            sheet,
            &["Employee", "Transactions", "Total sales", "Commission"],
            &bold,
        )?;
        for (i, e) in report.employees.iter().enumerate() {
            let row = i as u32 + 1;
            sheet.write_string(row, 0, e.employee.as_str())?;
            sheet.write_number(row, 1, e.transactions as f64)?;
            sheet.write_number_with_format(row, 2, e.total_sales, &money)?;
            sheet.write_number_with_format(row, 3, e.commission, &money)?;
        }
        sheet.autofit();
    }

    Ok(workbook)
}

/// Write the consolidated workbook, the same tables as CSV, and the whole report as JSON.
pub fn write_report(report: &Report, dir: &Path, stem: &str) -> Result<ExportFiles> {
    std::fs::create_dir_all(dir)?;

    let workbook = dir.join(format!("{stem}.xlsx"));
    build_workbook(report)?.save(&workbook)?;

    let detail = dir.join(format!("{stem}_detail.csv"));
    write_csv(&detail, report.transactions.iter().map(DetailRecord::from))?;

    let payments = dir.join(format!("{stem}_payments.csv"));
    write_csv(&payments, &report.payments)?;

    let commissions = if report.employees.is_empty() {
        None
    } else {
        let path = dir.join(format!("{stem}_commissions.csv"));
        write_csv(&path, &report.employees)?;
        Some(path)
    };

    let json = dir.join(format!("{stem}.json"));
    let doc = ReportDocument {
        source: &report.source,
        checksum: report.checksum.as_deref(),
        generated_at: chrono::Local::now().to_rfc3339(),
        commission_pct: report.commission_pct,
        total_sales: report.total_sales,
        total_commission: report.total_commission,
        payments: &report.payments,
        employees: &report.employees,
        transactions: report.transactions.iter().map(DetailRecord::from).collect(),
        diagnostics: &report.stats,
    };
    std::fs::write(&json, format!("{}\n", serde_json::to_string_pretty(&doc)?))?;

    info!(dir = %dir.display(), stem, "report exported");
    Ok(ExportFiles {
        workbook,
        detail,
        payments,
        commissions,
        json,
    })
}

// ---------------------------------------------------------------------------
// Upload
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum UploadOutcome {
    Uploaded { id: String },
    Failed { message: String },
}

/// Destination for exported artifacts. Failures are values, not errors: the
/// report is already computed and stays valid whatever happens here.
pub trait Uploader {
    fn upload(&self, file: &Path, target_name: &str) -> UploadOutcome;
}

/// Copies artifacts into a folder, typically one kept in sync by a cloud drive client.
pub struct FolderUploader {
    dest: PathBuf,
}

impl FolderUploader {
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self { dest: dest.into() }
    }
}

impl Uploader for FolderUploader {
    fn upload(&self, file: &Path, target_name: &str) -> UploadOutcome {
        let target = self.dest.join(target_name);
        let result = std::fs::create_dir_all(&self.dest).and_then(|_| std::fs::copy(file, &target));
        match result {
            Ok(_) => UploadOutcome::Uploaded {
                id: target.display().to_string(),
            },
            Err(e) => {
                warn!(file = %file.display(), dest = %self.dest.display(), error = %e, "upload failed");
                UploadOutcome::Failed {
                    message: e.to_string(),
                }
            }
        }
    }
}

/// Upload every file, keeping its own name at the destination.
pub fn upload_all(uploader: &dyn Uploader, files: &[&Path]) -> Vec<(PathBuf, UploadOutcome)> {
    files
        .iter()
        .map(|file| {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_default();
            (file.to_path_buf(), uploader.upload(file, &name))
        })
        .collect()
}
