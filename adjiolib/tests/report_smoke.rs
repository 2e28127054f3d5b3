use adjiolib::{formats::report::ReportText, traits::ReadFormat};
use rust_decimal::Decimal;
use std::io::Cursor;

#[test]
fn canonical_six_column_record() {
    let input = r#"Client Account Adjustments
Thursday 31 August 2023
Account No   Client   Amount   Type   Reason   Adjusted By
241760   USDA NAHMS Study/Dr. Bettina   $343.35   Invoiced   null   KAB478
"#;
    let st = ReportText::read(Cursor::new(input)).expect("read report");
    assert_eq!(st.records.len(), 1);
    assert!(st.diagnostics.is_empty());

    let r = &st.records[0];
    assert_eq!(r.date, "Thursday 31 August 2023");
    assert_eq!(r.account_no.as_deref(), Some("241760"));
    assert_eq!(r.client.as_deref(), Some("USDA NAHMS Study/Dr. Bettina"));
    assert_eq!(r.amount.as_deref(), Some("$343.35"));
    assert_eq!(r.kind.as_deref(), Some("Invoiced"));
    assert_eq!(r.reason.as_deref(), Some("null"));
    assert_eq!(r.adjusted_by.as_deref(), Some("KAB478"));
    assert_eq!(r.numeric_amount, Some(Decimal::from_str_exact("343.35").unwrap()));
}

#[test]
fn split_four_plus_two_layout() {
    // средние две колонки уехали на следующую строку, последние две
    // остались в хвосте третьей
    let input = r#"Friday 1 September 2023
Account No   Client   Amount   Type   Reason   Adjusted By
241761   Jane Doe   null   AB123
$12.00   Account
"#;
    let st = ReportText::read(Cursor::new(input)).expect("read report");
    assert_eq!(st.records.len(), 1);
    assert!(st.diagnostics.is_empty());

    let r = &st.records[0];
    assert_eq!(r.account_no.as_deref(), Some("241761"));
    assert_eq!(r.client.as_deref(), Some("Jane Doe"));
    assert_eq!(r.amount.as_deref(), Some("$12.00"));
    assert_eq!(r.kind.as_deref(), Some("Account"));
    assert_eq!(r.reason.as_deref(), Some("null"));
    assert_eq!(r.adjusted_by.as_deref(), Some("AB123"));
    assert_eq!(r.numeric_amount, Some(Decimal::from_str_exact("12.00").unwrap()));
}

#[test]
fn one_record_per_block_across_sections() {
    let input = r#"Client Account Adjustments
Thursday 31 August 2023
Account No   Client   Amount   Type   Reason   Adjusted By
241760   USDA NAHMS Study/Dr. Bettina   $343.35   Invoiced   null   KAB478
Date Total:   $343.35
Friday 1 September 2023
Account No   Client   Amount   Type   Reason   Adjusted By
100200   Acme Vet Clinic   $10.00   Account   Data entry error   JDX001
Adjustment Total   $353.35
"#;
    let st = ReportText::read(Cursor::new(input)).expect("read report");
    // заголовки секций и строка общего итога блоков не образуют
    assert_eq!(st.records.len(), 2);
    assert!(st.diagnostics.is_empty());
    assert_eq!(st.records[0].date, "Thursday 31 August 2023");
    assert_eq!(st.records[1].date, "Friday 1 September 2023");
    assert_eq!(st.records[1].reason.as_deref(), Some("Data entry error"));
}

#[test]
fn day_boundary_with_empty_block_yields_nothing() {
    // граница дня без накопленного блока: пустой блок не даёт ни записи,
    // ни диагностики
    let input = r#"Sunday 3 September 2023
Account No   Client   Amount   Type   Reason   Adjusted By
241763   Someone   $1.00   Account   null   XY001
"#;
    let st = ReportText::read(Cursor::new(input)).expect("read report");
    assert_eq!(st.records.len(), 1);
    assert!(st.diagnostics.is_empty());
    assert_eq!(st.records[0].date, "Sunday 3 September 2023");
}

#[test]
fn empty_input_gives_empty_statement() {
    let st = ReportText::read(Cursor::new("")).expect("read report");
    assert!(st.records.is_empty());
    assert!(st.diagnostics.is_empty());
}
