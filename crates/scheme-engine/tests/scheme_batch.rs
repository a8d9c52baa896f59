use scheme_engine::workflows::scheme::{
    BatchSummary, Column, SchemeBatchProcessor, SchemeSettings, SchemeTable,
};
use serde_json::{json, Value};

const SCHEMES: &str = include_str!("fixtures/schemes.csv");

fn processed(settings: SchemeSettings) -> (SchemeTable, BatchSummary) {
    SchemeBatchProcessor::new(settings)
        .process_reader(SCHEMES.as_bytes())
        .expect("fixture processes")
}

fn json_cell(table: &SchemeTable, row: usize, column: Column) -> Value {
    let raw = table.cell(row, column).expect("cell present");
    serde_json::from_str(raw).expect("cell holds json")
}

#[test]
fn fixture_rows_are_classified_and_counted() {
    let (table, summary) = processed(SchemeSettings::default());

    assert_eq!(
        summary,
        BatchSummary {
            rows_read: 4,
            rows_updated: 3,
            rows_skipped: 1,
            degenerate: 0,
        }
    );
    assert_eq!(table.len(), 4);
    assert!(table
        .headers()
        .iter()
        .any(|header| header == Column::UnsecuredCharge3.header()));
    assert_eq!(table.cell(0, Column::SecuredLegalName), Some("Rupeek Delight"));
    assert_eq!(table.cell(1, Column::SecuredLegalName), Some("Rupeek Royal"));
    assert_eq!(table.cell(3, Column::SecuredLegalName), Some("Rupeek Delight"));
}

#[test]
fn flexi_range_row_is_fully_rewritten() {
    let (table, _) = processed(SchemeSettings::default());

    assert_eq!(table.cell(0, Column::CustomerLtv), Some("75.0"));
    assert_eq!(table.cell(0, Column::Tenure), Some("6"));
    assert_eq!(table.cell(0, Column::SecuredLtv), Some("67.0"));
    assert_eq!(table.cell(0, Column::Description), Some("FL TO"));
    assert_eq!(
        table.cell(0, Column::ApplicableProcesses),
        Some("fresh-loan,takeover-loan,release")
    );

    let overall = json_cell(&table, 0, Column::OverallInterest);
    let rates: Vec<&Value> = overall["interestSlabs"]
        .as_array()
        .expect("slab list")
        .iter()
        .map(|slab| &slab["interestRate"])
        .collect();
    assert_eq!(rates, [&json!(12.0), &json!(20.09), &json!(26.58)]);
    assert_eq!(overall["interestSlabs"][2]["toDay"], json!(180));

    let fee = json_cell(&table, 0, Column::UnsecuredCharge2);
    assert_eq!(fee["chargeValue"], json!(9.37));
    assert_eq!(fee["name"], json!("Processing Fee"));

    let foreclosure = json_cell(&table, 0, Column::UnsecuredCharge3);
    assert_eq!(foreclosure["chargeValue"], json!(14.06));
    assert_eq!(table.cell(0, Column::UnsecuredChargeCount), Some("3"));
    assert_eq!(
        table.cell(0, Column::UnsecuredLegalName),
        Some("Delight 6M f8 PF 9.37% FC 90D")
    );
}

#[test]
fn stretched_row_moves_to_seven_months() {
    let (table, _) = processed(SchemeSettings::default());

    assert_eq!(
        table.cell(1, Column::RefName),
        Some("Gold (e0) 7M 2.50% PF 1% Silver 6-12L Renewal")
    );
    assert_eq!(table.cell(1, Column::Tenure), Some("7"));
    assert_eq!(table.cell(1, Column::SecuredLtv), Some("66.0"));
    assert_eq!(table.cell(1, Column::Description), Some("RWL"));
    assert_eq!(table.cell(1, Column::ApplicableProcesses), Some("renewal,release"));

    let overall = json_cell(&table, 1, Column::OverallInterest);
    assert_eq!(overall["interestSlabs"][0]["interestRate"], json!(30.0));
    assert_eq!(overall["interestSlabs"][2]["toDay"], json!(210));

    // 1% over 1 - 66/80
    let fee = json_cell(&table, 1, Column::UnsecuredCharge2);
    assert_eq!(fee["chargeValue"], json!(5.71));
    assert_eq!(fee["chargeType"], json!("processing-fee"));
    assert!(fee.get("chargesMetaData").is_none());
    assert_eq!(
        table.cell(1, Column::UnsecuredLegalName),
        Some("Royal 7M f8 PF 5.71% FC 90D")
    );
}

#[test]
fn unreadable_row_is_left_as_exported() {
    let (table, _) = processed(SchemeSettings::default());

    assert_eq!(table.cell(2, Column::RefName), Some("Gold 6M PF 1%"));
    assert_eq!(table.cell(2, Column::RefNo), Some("keep"));
    assert_eq!(table.cell(2, Column::SecuredLegalName), Some("Rupeek Royal"));
    assert_eq!(table.cell(2, Column::OverallInterest), Some("{}"));
    assert_eq!(table.cell(2, Column::UnsecuredChargeCount), Some("3"));
    assert_eq!(table.cell(2, Column::UnsecuredCharge3), Some(""));
}

#[test]
fn row_without_fee_carries_foreclosure_in_second_charge() {
    let (table, _) = processed(SchemeSettings::default());

    assert_eq!(table.cell(3, Column::ChargeText), Some("{}"));
    assert_eq!(table.cell(3, Column::UnsecuredCharge3), Some("{}"));
    assert_eq!(table.cell(3, Column::UnsecuredChargeCount), Some("2"));

    // 1% over 1 - 60/76
    let foreclosure = json_cell(&table, 3, Column::UnsecuredCharge2);
    assert_eq!(foreclosure["chargeValue"], json!(4.75));
    assert_eq!(
        foreclosure["applicableProcesses"],
        json!(["fresh-loan", "release"])
    );
    assert_eq!(
        table.cell(3, Column::UnsecuredLegalName),
        Some("Delight 12M th7.si5 FC 90D")
    );
    let unsecured = json_cell(&table, 3, Column::UnsecuredAddon);
    assert_eq!(unsecured["interestSlabs"][1]["interestRate"], json!(37.65));
}

#[test]
fn csv_round_trip_keeps_unknown_columns() {
    let processor = SchemeBatchProcessor::default();
    let (output, summary) = processor.process_csv(SCHEMES).expect("fixture processes");
    assert_eq!(summary.rows_updated, 3);

    let mut reader = csv::Reader::from_reader(output.as_bytes());
    let headers = reader.headers().expect("headers").clone();
    let notes = headers
        .iter()
        .position(|header| header == "notes")
        .expect("notes column kept");
    let notes: Vec<String> = reader
        .records()
        .map(|record| record.expect("record")[notes].to_string())
        .collect();
    assert_eq!(notes, ["flexi range", "stretched", "unreadable", "no fee"]);
}

#[test]
fn forced_flexi_charges_the_upper_bound() {
    let (table, _) = processed(SchemeSettings::default().with_force_flexi(true));

    let fee = json_cell(&table, 1, Column::UnsecuredCharge2);
    assert_eq!(fee["chargeValue"], json!(5.71));
    assert_eq!(
        fee["chargesMetaData"],
        json!({"minPercentUnsecure": 5.71, "maxPercentUnsecure": 5.71})
    );
    let text = json_cell(&table, 1, Column::ChargeText);
    assert_eq!(text["unsecureProcessingFee"], json!("5.71%+GST"));
}

#[test]
fn low_ltv_stretched_row_is_counted_degenerate() {
    let export = "\
refName,bs2-charge-2,bs2-legalName
\"Gold (si5) 6M 1.00% PF 1% Economy 3-6L\",\"{\"\"chargeValue\"\":0}\",Royal 6M f8 PF 1% FC
";
    let processor = SchemeBatchProcessor::default();
    let (table, summary) = processor
        .process_reader(export.as_bytes())
        .expect("export processes");

    assert_eq!(summary.degenerate, 1);
    assert_eq!(summary.rows_updated, 0);
    assert_eq!(table.cell(0, Column::Tenure), Some("7"));
    assert_eq!(json_cell(&table, 0, Column::UnsecuredCharge2), json!({"chargeValue": 0}));
    assert_eq!(
        table.cell(0, Column::UnsecuredLegalName),
        Some("Royal 6M f8 PF 1% FC")
    );
}
