//! CSV-выход: супер-заголовок, итоги по категориям, общий итог, шапка колонок
//! и отсортированные записи. Все поля в кавычках, разделитель строк CRLF.

use crate::{
    error::Result,
    model::{AdjustmentRecord, Statement, EXPECTED_KINDS},
};
use csv::{QuoteStyle, Terminator, WriterBuilder};
use rust_decimal::{Decimal, RoundingStrategy};
use std::io::Write;
use std::str::FromStr;

const SUPER_HEADING: &str = "Adjustment Detail by Statement Date";
const COLUMN_HEADINGS: [&str; 6] = [
    "Account No",
    "Client",
    "Amount",
    "Type",
    "Reason",
    "Adjusted By",
];

pub struct Csv;

impl crate::traits::WriteFormat for Csv {
    fn write<W: Write>(w: W, st: &Statement) -> Result<()> {
        let groups = group_totals(&st.records);

        // итоговая сводка по категориям; неожиданные категории — с полным
        // списком записей, чтобы их можно было разобрать руками
        let kinds: Vec<&str> = groups.iter().map(|(k, _)| k.as_str()).collect();
        tracing::info!(?kinds, "adjustment kinds seen");
        for (kind, _) in &groups {
            if EXPECTED_KINDS.contains(&kind.as_str()) {
                continue;
            }
            let stray: Vec<&AdjustmentRecord> = st
                .records
                .iter()
                .filter(|r| r.kind.as_deref().unwrap_or("") == kind.as_str())
                .collect();
            tracing::warn!(kind = kind.as_str(), records = ?stray, "unexpected adjustment kind");
        }

        let mut wrt = WriterBuilder::new()
            .quote_style(QuoteStyle::Always)
            .terminator(Terminator::CRLF)
            .flexible(true)
            .from_writer(w);

        wrt.write_record([SUPER_HEADING])?;
        for (kind, sum) in &groups {
            let total = currency_string(*sum);
            let label = format!("{kind} Total");
            wrt.write_record(["", "", total.as_str(), label.as_str()])?;
        }
        let grand: Decimal = st.records.iter().filter_map(|r| r.numeric_amount).sum();
        let grand = currency_string(grand);
        wrt.write_record(["", "", grand.as_str(), "Grand Total"])?;
        wrt.write_record(COLUMN_HEADINGS)?;

        // дата разобрана и хранится в записи, но в выгрузку не попадает
        for r in sorted(&st.records) {
            wrt.write_record([
                field(&r.account_no),
                field(&r.client),
                field(&r.amount),
                field(&r.kind),
                field(&r.reason),
                field(&r.adjusted_by),
            ])?;
        }
        wrt.flush()?;
        Ok(())
    }
}

fn field(v: &Option<String>) -> &str {
    v.as_deref().unwrap_or("")
}

/// Устойчивая двухключевая сортировка: категория по алфавиту, внутри
/// категории — номер счёта как число. Нечисловые номера идут впереди.
fn sorted(records: &[AdjustmentRecord]) -> Vec<&AdjustmentRecord> {
    let mut out: Vec<&AdjustmentRecord> = records.iter().collect();
    out.sort_by(|a, b| {
        let ka = a.kind.as_deref().unwrap_or("");
        let kb = b.kind.as_deref().unwrap_or("");
        ka.cmp(kb)
            .then_with(|| account_key(a).cmp(&account_key(b)))
    });
    out
}

fn account_key(r: &AdjustmentRecord) -> Option<Decimal> {
    r.account_no
        .as_deref()
        .and_then(|s| Decimal::from_str(s.trim()).ok())
}

/// Суммы по категориям в порядке первого появления; отсутствующая сумма
/// в итог не входит.
fn group_totals(records: &[AdjustmentRecord]) -> Vec<(String, Decimal)> {
    let mut groups: Vec<(String, Decimal)> = Vec::new();
    for r in records {
        let kind = r.kind.as_deref().unwrap_or("");
        let amount = r.numeric_amount.unwrap_or_default();
        match groups.iter_mut().find(|(k, _)| k.as_str() == kind) {
            Some((_, sum)) => *sum += amount,
            None => groups.push((kind.to_string(), amount)),
        }
    }
    groups
}

/// Денежный формат: округление до 2 знаков от середины «от нуля»,
/// разделители тысяч, ровно два знака дроби, знак между `$` и цифрами.
pub fn currency_string(n: Decimal) -> String {
    let mut n = n.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    n.rescale(2);
    let neg = n.is_sign_negative();
    let s = n.abs().to_string();
    let (int_part, frac_part) = s.split_once('.').unwrap_or((s.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("${}{}.{}", if neg { "-" } else { "" }, grouped, frac_part)
}
