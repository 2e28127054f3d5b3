use crate::{
    error::{AdjioError, Result},
    model::{AdjustmentRecord, Diagnostic, DiagnosticKind, Statement, EXPECTED_KINDS},
};
use regex::Regex;
use rust_decimal::Decimal;
use std::io::BufRead;
use std::str::FromStr;

const DAYS_OF_WEEK: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Заголовки секций играют роль «псевдо-дней»: та же проверка границы,
/// но в блок такая строка не попадает.
const SECTION_MARKERS: [&str; 3] = [
    "Client Account Adjustments",
    "Invoiced Adjustments",
    "Adjustment Total",
];

const FIELD_LABELS: [&str; 6] = [
    "Account No",
    "Client",
    "Amount",
    "Type",
    "Reason",
    "Adjusted By",
];

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Полуструктурированный текстовый отчёт о корректировках: записи
/// занимают от одной до нескольких физических строк, колонки местами
/// переносятся, отдельные записи вырождаются в свободный текст.
pub struct ReportText;

impl crate::traits::ReadFormat for ReportText {
    fn read<R: BufRead>(mut r: R) -> Result<Statement> {
        let mut text = String::new();
        r.read_to_string(&mut text)?;

        let re_lines =
            Regex::new(r"[\r\n]+").map_err(|e| AdjioError::Parse(e.to_string()))?;
        let re_fields =
            Regex::new(r"\t{3,}|\s{3,}").map_err(|e| AdjioError::Parse(e.to_string()))?;
        let re_tabs = Regex::new(r"\t+").map_err(|e| AdjioError::Parse(e.to_string()))?;

        let mut records: Vec<AdjustmentRecord> = Vec::new();
        let mut diagnostics: Vec<Diagnostic> = Vec::new();
        let mut block: Vec<Vec<String>> = Vec::new();
        let mut line_no = 0usize;

        for line in re_lines.split(&text) {
            line_no += 1;

            match terminator(line) {
                Some(Terminator::Day) => {
                    // строка с датой закрывает предыдущий блок и открывает новый
                    flush(&mut block, line_no, &mut records, &mut diagnostics);
                }
                Some(Terminator::Section) => {
                    flush(&mut block, line_no, &mut records, &mut diagnostics);
                    continue;
                }
                None => {}
            }

            let row = tokenize(line, &re_fields, &re_tabs);
            if !row.is_empty() {
                block.push(row);
            }
        }
        flush(&mut block, line_no, &mut records, &mut diagnostics);

        Ok(Statement {
            records,
            diagnostics,
        })
    }
}

enum Terminator {
    Day,
    Section,
}

fn terminator(line: &str) -> Option<Terminator> {
    let first = line.split(char::is_whitespace).next().unwrap_or("");
    if DAYS_OF_WEEK.contains(&first) {
        return Some(Terminator::Day);
    }
    for marker in SECTION_MARKERS {
        if let Some(rest) = line.strip_prefix(marker) {
            if rest.chars().next().map_or(true, char::is_whitespace) {
                return Some(Terminator::Section);
            }
        }
    }
    None
}

/// Разбивает строку на поля по «большим» пробельным прогонам (3+ пробелов
/// либо 3+ табов); остатки одиночных/двойных табов внутри куска — признак
/// более плотной табличной вёрстки, их разбираем отдельно.
fn tokenize(line: &str, re_fields: &Regex, re_tabs: &Regex) -> Vec<String> {
    let line = line.trim().replace('"', "");
    if line.is_empty() {
        return Vec::new();
    }

    let mut row = Vec::new();
    for piece in re_fields.split(&line).filter(|p| !p.trim().is_empty()) {
        let parts: Vec<&str> = re_tabs.split(piece).collect();
        match parts.as_slice() {
            [] | [_] => row.push(piece.trim().to_string()),
            [a, b] => {
                row.push(a.trim().to_string());
                row.push(b.trim().to_string());
            }
            // «метка метка значение» — всё, кроме последнего куска, одно поле
            [head @ .., last] => {
                row.push(head.join(" ").trim().to_string());
                row.push(last.trim().to_string());
            }
        }
    }
    row
}

fn flush(
    block: &mut Vec<Vec<String>>,
    line_no: usize,
    records: &mut Vec<AdjustmentRecord>,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let rows = std::mem::take(block);
    if let Some(record) = build_record(rows, line_no, diagnostics) {
        records.push(record);
    }
}

/// Собирает запись из блока: сперва канонические раскладки (6 полей в одной
/// строке либо перенос 4+2), при несовпадении — эвристическое восстановление.
/// Пустой блок записи не даёт.
fn build_record(
    rows: Vec<Vec<String>>,
    line_no: usize,
    diagnostics: &mut Vec<Diagnostic>,
) -> Option<AdjustmentRecord> {
    if rows.is_empty() {
        return None;
    }

    // в блок попадают только непустые строки токенов
    let mut r = AdjustmentRecord {
        date: rows[0][0].clone(),
        ..Default::default()
    };

    if let Some(row2) = rows.get(2) {
        let labels = &rows[1];
        if row2.len() == 6 {
            for i in 0..6 {
                if let Some(label) = labels.get(i) {
                    assign_field(&mut r, label, row2[i].clone());
                }
            }
        } else if row2.len() == 4 {
            // вариант с переносом: средние две колонки уезжают на следующую
            // строку, последние две остаются в хвосте текущей
            for i in 0..2 {
                if let Some(label) = labels.get(i) {
                    assign_field(&mut r, label, row2[i].clone());
                }
            }
            if let Some(row3) = rows.get(3) {
                for i in 2..4 {
                    if let (Some(label), Some(value)) = (labels.get(i), row3.get(i - 2)) {
                        assign_field(&mut r, label, value.clone());
                    }
                }
            }
            for i in 4..6 {
                if let (Some(label), Some(value)) = (labels.get(i), row2.get(i - 2)) {
                    assign_field(&mut r, label, value.clone());
                }
            }
        }
    }

    // плоский список токенов для дозаполнения Reason/Adjusted By;
    // эвристика подменяет его своим очищенным списком
    let mut scan: Vec<String> = rows.iter().flatten().cloned().collect();

    if !r.kind_is_expected() {
        scan = heuristic_rebuild(&rows, &mut r);
    }

    if !r.kind_is_expected() {
        push_diagnostic(diagnostics, DiagnosticKind::UnexpectedKind, line_no, &rows, &r);
    }
    if !r.account_no.as_deref().is_some_and(is_numeric) {
        push_diagnostic(
            diagnostics,
            DiagnosticKind::NonNumericAccount,
            line_no,
            &rows,
            &r,
        );
    }

    if r.reason.is_none() {
        r.reason = scan
            .iter()
            .find_map(|t| t.strip_prefix("Reason ").map(str::to_string));
    }
    if r.reason.is_none() {
        push_diagnostic(diagnostics, DiagnosticKind::MissingReason, line_no, &rows, &r);
    }

    if r.adjusted_by.is_none() {
        r.adjusted_by = scan
            .iter()
            .find_map(|t| t.strip_prefix("Adjusted By ").map(str::to_string));
    }
    if r.adjusted_by.is_none() {
        push_diagnostic(
            diagnostics,
            DiagnosticKind::MissingAdjustedBy,
            line_no,
            &rows,
            &r,
        );
    }

    if let Some(amount) = r.amount.clone() {
        match Decimal::from_str(&strip_currency(&amount)) {
            Ok(n) => r.numeric_amount = Some(n),
            Err(_) => push_diagnostic(
                diagnostics,
                DiagnosticKind::NonNumericAmount,
                line_no,
                &rows,
                &r,
            ),
        }
    } else {
        push_diagnostic(diagnostics, DiagnosticKind::MissingAmount, line_no, &rows, &r);
    }

    Some(r)
}

fn assign_field(r: &mut AdjustmentRecord, label: &str, value: String) {
    match label {
        "Account No" => r.account_no = Some(value),
        "Client" => r.client = Some(value),
        "Amount" => r.amount = Some(value),
        "Type" => r.kind = Some(value),
        "Reason" => r.reason = Some(value),
        "Adjusted By" => r.adjusted_by = Some(value),
        // чужая метка — игнорируем
        _ => {}
    }
}

/// Восстановление записи из блока, не совпавшего ни с одной канонической
/// раскладкой. Порядок шагов существенен: зачистка меток → сплющивание →
/// отсечение служебных токенов → позиционное и содержательное извлечение.
/// Возвращает очищенный список токенов для последующих дозаполнений.
fn heuristic_rebuild(rows: &[Vec<String>], r: &mut AdjustmentRecord) -> Vec<String> {
    // осколки меток, просочившиеся в данные
    let mut tokens: Vec<String> = Vec::new();
    for row in rows {
        for token in row {
            let mut t = token.clone();
            for label in FIELD_LABELS {
                t = t.replacen(label, "", 1).trim().to_string();
            }
            if !t.is_empty() {
                tokens.push(t);
            }
        }
    }

    // хвостовая пара «Date Total: <сумма>» не относится к записи
    let date_total_idx = tokens.iter().position(|t| t == "Date Total:");
    if let Some(i) = date_total_idx {
        tokens.drain(i..(i + 2).min(tokens.len()));
    }

    // осколки промежуточных итогов вида «Month Year»
    tokens.retain(|t| !is_month_total(t));

    if let Some(t) = tokens.first() {
        // блок, выродившийся в пустоту, не должен терять дату
        r.date = t.clone();
    }
    r.account_no = tokens.get(1).cloned();

    let amount_idx = tokens.iter().position(|t| t.contains('$'));
    if let Some(i) = amount_idx {
        r.amount = Some(tokens[i].clone());
    }

    let kind_idx = tokens
        .iter()
        .position(|t| EXPECTED_KINDS.contains(&t.as_str()));
    if let Some(i) = kind_idx {
        r.kind = Some(tokens[i].clone());
        r.reason = tokens.get(i + 1).cloned();
        r.adjusted_by = tokens.get(i + 2).cloned();
    }

    // клиент — всё, что осталось до точки отсечения «Date Total:»
    let cut = date_total_idx.unwrap_or(tokens.len()).min(tokens.len());
    let consumed = [
        Some(0),
        Some(1),
        amount_idx,
        kind_idx,
        kind_idx.map(|i| i + 1),
        kind_idx.map(|i| i + 2),
    ];
    let client: Vec<&str> = tokens[..cut]
        .iter()
        .enumerate()
        .filter(|(i, _)| !consumed.contains(&Some(*i)))
        .map(|(_, t)| t.as_str())
        .collect();
    r.client = Some(client.join(" "));

    tokens
}

/// «Month Year»-образный токен: начинается с названия месяца, а второе
/// слово — число. Настоящие даты записей под это не попадают.
fn is_month_total(token: &str) -> bool {
    if !MONTHS.iter().any(|m| token.starts_with(m)) {
        return false;
    }
    token
        .split_whitespace()
        .nth(1)
        .and_then(|w| w.parse::<f64>().ok())
        .is_some_and(f64::is_finite)
}

fn is_numeric(s: &str) -> bool {
    Decimal::from_str(s.trim()).is_ok()
}

fn strip_currency(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect()
}

fn push_diagnostic(
    diagnostics: &mut Vec<Diagnostic>,
    kind: DiagnosticKind,
    line: usize,
    block: &[Vec<String>],
    record: &AdjustmentRecord,
) {
    tracing::warn!(line, block = ?block, record = ?record, "{}", kind.as_str());
    diagnostics.push(Diagnostic {
        kind,
        line,
        block: block.to_vec(),
        record: record.clone(),
    });
}
