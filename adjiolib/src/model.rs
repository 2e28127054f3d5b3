//! Доменные модели — нормализованный слой между сырым отчётом и CSV.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Ожидаемые категории корректировок; всё остальное — аномалия данных.
pub const EXPECTED_KINDS: [&str; 2] = ["Account", "Invoiced"];

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AdjustmentRecord {
    pub date: String,
    pub account_no: Option<String>,
    pub client: Option<String>,
    pub amount: Option<String>,
    pub kind: Option<String>,
    pub reason: Option<String>,
    pub adjusted_by: Option<String>,
    pub numeric_amount: Option<Decimal>,
}

impl AdjustmentRecord {
    pub fn kind_is_expected(&self) -> bool {
        matches!(self.kind.as_deref(), Some(k) if EXPECTED_KINDS.contains(&k))
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DiagnosticKind {
    UnexpectedKind,
    NonNumericAccount,
    MissingReason,
    MissingAdjustedBy,
    MissingAmount,
    NonNumericAmount,
}

impl DiagnosticKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::UnexpectedKind => "UNEXPECTED TYPE",
            Self::NonNumericAccount => "NON-NUMERIC ACCOUNT NO",
            Self::MissingReason => "UNDEFINED REASON",
            Self::MissingAdjustedBy => "UNDEFINED ADJUSTED BY",
            Self::MissingAmount => "MISSING AMOUNT",
            Self::NonNumericAmount => "NON-NUMERIC AMOUNT",
        }
    }
}

/// Несмертельный дефект данных: категория, номер строки, сырой блок
/// и снимок записи на момент обнаружения.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    pub line: usize,
    pub block: Vec<Vec<String>>,
    pub record: AdjustmentRecord,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Statement {
    pub records: Vec<AdjustmentRecord>,
    pub diagnostics: Vec<Diagnostic>,
}
