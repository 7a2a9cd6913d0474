use std::fmt;

use serde::Serialize;

/// One data row of one sheet, after header lookup and numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub description: String,
    pub type_hint: Option<String>,
    pub cash_amount: f64,
    pub transfer_amount: f64,
    pub sheet_name: String,
}

impl RawRow {
    pub fn moved_money(&self) -> bool {
        self.cash_amount != 0.0 || self.transfer_amount != 0.0
    }
}

/// Channel the money for a sale arrived through. Ordering drives display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum PaymentMethod {
    Cash,
    Nequi,
    #[serde(rename = "QR Bancolombia")]
    QrBancolombia,
    #[serde(rename = "Transfer (Other)")]
    TransferOther,
    #[serde(rename = "Transfer (Unidentified)")]
    TransferUnidentified,
}

impl PaymentMethod {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cash => "Cash",
            Self::Nequi => "Nequi",
            Self::QrBancolombia => "QR Bancolombia",
            Self::TransferOther => "Transfer (Other)",
            Self::TransferUnidentified => "Transfer (Unidentified)",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Display name of the employee owed commission, plus the tag letter it came from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EmployeeLabel {
    pub name: String,
    pub tag: char,
}

impl EmployeeLabel {
    pub fn new(name: impl Into<String>, tag: char) -> Self {
        Self {
            name: name.into(),
            tag,
        }
    }

    /// Label for a tag letter that has no roster entry.
    pub fn generic(tag: char) -> Self {
        Self::new(format!("Employee %{tag}"), tag)
    }
}

impl fmt::Display for EmployeeLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassifiedTransaction {
    pub row: RawRow,
    pub payment_method: PaymentMethod,
    pub employee: Option<EmployeeLabel>,
    pub commission_amount: f64,
}

impl ClassifiedTransaction {
    pub fn total_sale(&self) -> f64 {
        self.row.cash_amount + self.row.transfer_amount
    }
}

/// Flat export shape of a classified transaction.
#[derive(Debug, Clone, Serialize)]
pub struct DetailRecord<'a> {
    pub description: &'a str,
    pub cash_amount: f64,
    pub transfer_amount: f64,
    pub payment_method: &'static str,
    pub employee: &'a str,
    pub total_sale: f64,
    pub commission_amount: f64,
    pub sheet: &'a str,
}

impl<'a> From<&'a ClassifiedTransaction> for DetailRecord<'a> {
    fn from(txn: &'a ClassifiedTransaction) -> Self {
        Self {
            description: &txn.row.description,
            cash_amount: txn.row.cash_amount,
            transfer_amount: txn.row.transfer_amount,
            payment_method: txn.payment_method.label(),
            employee: txn.employee.as_ref().map_or("", |e| e.name.as_str()),
            total_sale: txn.total_sale(),
            commission_amount: txn.commission_amount,
            sheet: &txn.row.sheet_name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PaymentSummary {
    pub method: PaymentMethod,
    pub cash: f64,
    pub transfer: f64,
    pub total_global: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EmployeeSummary {
    pub employee: String,
    pub transactions: usize,
    pub total_sales: f64,
    pub commission: f64,
}
