use super::charges::{back_calculate, ChargeError};
use super::decimal::float_text;
use super::decision::{decide, TierDecision};
use super::patch;
use super::processes::resolve;
use super::rates::{rate, SlabRates};
use super::settings::SchemeSettings;
use super::signature::{parse, SignatureError};
use super::table::{Column, FieldUpdate, SchemeRow};

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordStatus {
    /// Every derived field was written.
    Updated,
    /// The row has no identifier cell.
    MissingIdentifier,
    /// The identifier could not be read; the row is left untouched.
    Invalid(SignatureError),
    /// Rates and tier were written; charges, processes and labels were not.
    DegenerateSplit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecordOutcome {
    pub status: RecordStatus,
    pub decision: Option<TierDecision>,
    pub updates: Vec<FieldUpdate>,
}

impl RecordOutcome {
    fn untouched(status: RecordStatus) -> Self {
        Self {
            status,
            decision: None,
            updates: Vec::new(),
        }
    }
}

/// Collects updates for the columns a row already has; a few columns are always written.
struct Updates<'a> {
    row: &'a SchemeRow<'a>,
    fields: Vec<FieldUpdate>,
}

impl<'a> Updates<'a> {
    fn always(&mut self, column: Column, value: impl Into<String>) {
        self.fields.push(FieldUpdate::new(column, value));
    }

    fn if_present(&mut self, column: Column, value: impl FnOnce(&str) -> String) {
        if let Some(current) = self.row.get(column) {
            let value = value(current);
            self.fields.push(FieldUpdate::new(column, value));
        }
    }

    fn current(&self, column: Column) -> &'a str {
        self.row.get(column).unwrap_or("")
    }
}

/// Runs the whole pipeline over one row and returns the cells to write back.
pub fn evaluate(row: &SchemeRow<'_>, settings: &SchemeSettings) -> RecordOutcome {
    let Some(identifier) = row.get(Column::RefName) else {
        return RecordOutcome::untouched(RecordStatus::MissingIdentifier);
    };
    let signature = match parse(identifier, &settings.ltv_codes) {
        Ok(signature) => signature,
        Err(err) => return RecordOutcome::untouched(RecordStatus::Invalid(err)),
    };

    let decision = decide(
        &signature.overall_ltv,
        &signature.monthly_rate,
        signature.requested_term,
    );
    let final_term = decision.final_term;
    let rewritten = patch::rewrite_identifier_term(identifier, final_term);

    let mut updates = Updates {
        row,
        fields: Vec::new(),
    };
    updates.always(Column::CustomerLtv, float_text(&signature.overall_ltv));
    updates.always(Column::Tenure, final_term.to_string());
    updates.always(Column::RefName, rewritten.clone());
    updates.if_present(Column::RefNo, |_| rewritten.clone());
    updates.if_present(Column::SecuredLegalName, |_| {
        settings.legal_name(decision.tier.label())
    });

    let schedule = rate(
        decision.tier,
        final_term,
        &signature.overall_ltv,
        &signature.monthly_rate,
        &settings.secured_basis,
    );
    updates.if_present(Column::SecuredLtv, |_| float_text(&schedule.secured_basis));
    let slab_columns: [(Column, &SlabRates); 4] = [
        (Column::OverallInterest, &schedule.overall),
        (Column::SecuredAddon, &schedule.secured),
        (Column::UnsecuredAddon, &schedule.unsecured_display),
        (Column::UnsecuredCalculation, &schedule.unsecured_display),
    ];
    for (column, slabs) in slab_columns {
        updates.if_present(column, |current| {
            patch::patch_slabs(current, slabs, schedule.term_days)
        });
    }

    let charges = match back_calculate(
        &signature,
        &schedule.secured_basis,
        final_term,
        settings.force_flexi,
    ) {
        Ok(charges) => charges,
        Err(ChargeError::DegenerateSplit) => {
            return RecordOutcome {
                status: RecordStatus::DegenerateSplit,
                decision: Some(decision),
                updates: updates.fields,
            }
        }
    };

    let processes = resolve(&rewritten);
    updates.if_present(Column::Description, |_| processes.label.as_str().to_string());
    updates.if_present(Column::ApplicableProcesses, |_| processes.joined());

    match &charges.fee {
        Some(fee) => {
            updates.if_present(Column::ChargeText, |current| {
                patch::patch_charge_text(current, &fee.charge_value, &fee.overall_value)
            });
            updates.if_present(Column::UnsecuredCharge2, |current| {
                patch::patch_fee_charge(current, fee, &processes)
            });
        }
        None => updates.if_present(Column::ChargeText, |_| "{}".to_string()),
    }

    let foreclosure_column = if signature.declares_fee {
        Column::UnsecuredCharge3
    } else {
        Column::UnsecuredCharge2
    };
    let foreclosure = patch::patch_foreclosure_charge(
        updates.current(foreclosure_column),
        &charges.foreclosure,
        &processes,
    );
    updates.always(foreclosure_column, foreclosure);
    if !signature.declares_fee {
        updates.always(Column::UnsecuredCharge3, "{}");
    }

    let charge_count = if signature.declares_fee { "3" } else { "2" };
    updates.if_present(Column::UnsecuredChargeCount, |_| charge_count.to_string());
    updates.if_present(Column::UnsecuredLegalName, |current| {
        let labelled = patch::patch_term_label(current, final_term);
        patch::patch_fee_label(
            &labelled,
            charges.fee.as_ref().map(|fee| &fee.charge_value),
            charges.foreclosure.duration,
            signature.declares_fee,
        )
    });

    RecordOutcome {
        status: RecordStatus::Updated,
        decision: Some(decision),
        updates: updates.fields,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::scheme::decision::Tier;
    use crate::workflows::scheme::table::SchemeTable;
    use serde_json::{json, Value};

    fn table(headers: &[&str], cells: &[&str]) -> SchemeTable {
        SchemeTable::new(
            headers.iter().map(|header| header.to_string()).collect(),
            vec![cells.iter().map(|cell| cell.to_string()).collect()],
        )
    }

    fn value_of(outcome: &RecordOutcome, column: Column) -> Option<&str> {
        outcome
            .updates
            .iter()
            .rev()
            .find(|update| update.column == column)
            .map(|update| update.value.as_str())
    }

    fn json_of(outcome: &RecordOutcome, column: Column) -> Value {
        serde_json::from_str(value_of(outcome, column).expect("column written")).expect("json cell")
    }

    fn slabs_document() -> String {
        json!({"interestSlabs": [
            {"fromDay": 1, "toDay": 30, "interestRate": 0},
            {"fromDay": 31, "toDay": 60, "interestRate": 0},
            {"fromDay": 61, "toDay": 90, "interestRate": 0}
        ]})
        .to_string()
    }

    #[test]
    fn invalid_identifier_leaves_row_untouched() {
        let table = table(&["refName", "tenure"], &["Gold 6M PF 1%", "6"]);
        let row = table.row(0).expect("row");
        let outcome = evaluate(&row, &SchemeSettings::default());
        assert_eq!(outcome.status, RecordStatus::Invalid(SignatureError::MissingLtv));
        assert!(outcome.updates.is_empty());
    }

    #[test]
    fn missing_identifier_column_is_reported() {
        let table = table(&["tenure"], &["6"]);
        let row = table.row(0).expect("row");
        let outcome = evaluate(&row, &SchemeSettings::default());
        assert_eq!(outcome.status, RecordStatus::MissingIdentifier);
    }

    #[test]
    fn flexi_fee_record_fills_every_present_column() {
        let slabs = slabs_document();
        let table = table(
            &[
                "refName",
                "refno",
                "bs1-legalName",
                "bs1-ltv",
                "OverallInterestCalculation",
                "bs1-addon-1",
                "bs2-addon-1",
                "chargeText",
                "bs2-charge-2",
                "bs2-NoOfCharges",
                "bs2-legalName",
                "description",
                "applicableProcesses",
            ],
            &[
                "Gold (s5) 6M 1.00% PF 0.70%-1.00% Economy 3-6L FL TO",
                "old",
                "",
                "",
                &slabs,
                &slabs,
                &slabs,
                "{}",
                "",
                "2",
                "Delight 6M 48% PF 1% FC",
                "",
                "",
            ],
        );
        let row = table.row(0).expect("row");
        let outcome = evaluate(&row, &SchemeSettings::default());

        assert_eq!(outcome.status, RecordStatus::Updated);
        assert_eq!(
            outcome.decision,
            Some(TierDecision {
                tier: Tier::Primary,
                final_term: 6
            })
        );
        assert_eq!(value_of(&outcome, Column::CustomerLtv), Some("75.0"));
        assert_eq!(value_of(&outcome, Column::Tenure), Some("6"));
        assert_eq!(
            value_of(&outcome, Column::RefNo),
            Some("Gold (s5) 6M 1.00% PF 0.70%-1.00% Economy 3-6L FL TO")
        );
        assert_eq!(value_of(&outcome, Column::SecuredLegalName), Some("Rupeek Delight"));
        assert_eq!(value_of(&outcome, Column::SecuredLtv), Some("67.0"));

        let overall = json_of(&outcome, Column::OverallInterest);
        assert_eq!(overall["interestSlabs"][0]["interestRate"], json!(12.0));
        assert_eq!(overall["interestSlabs"][1]["interestRate"], json!(20.09));
        assert_eq!(overall["interestSlabs"][2]["interestRate"], json!(26.58));
        assert_eq!(overall["interestSlabs"][2]["toDay"], json!(180));
        let unsecured = json_of(&outcome, Column::UnsecuredAddon);
        assert_eq!(unsecured["interestSlabs"][1]["interestRate"], json!(48.0));

        let charge_text = json_of(&outcome, Column::ChargeText);
        assert_eq!(charge_text["unsecureProcessingFee"], json!("9.37%+GST"));
        assert_eq!(charge_text["processingFee"], json!("1.00%+GST"));

        let fee = json_of(&outcome, Column::UnsecuredCharge2);
        assert_eq!(fee["chargeValue"], json!(9.37));
        assert_eq!(
            fee["chargesMetaData"],
            json!({"minPercentUnsecure": 6.56, "maxPercentUnsecure": 9.37})
        );

        let foreclosure = json_of(&outcome, Column::UnsecuredCharge3);
        assert_eq!(foreclosure["chargeValue"], json!(14.06));
        assert_eq!(foreclosure["chargesMetaData"]["duration"], json!(3));
        assert_eq!(
            foreclosure["applicableProcesses"],
            json!(["fresh-loan", "takeover-loan", "release"])
        );

        assert_eq!(value_of(&outcome, Column::UnsecuredChargeCount), Some("3"));
        assert_eq!(
            value_of(&outcome, Column::UnsecuredLegalName),
            Some("Delight 6M f8 PF 9.37% FC 90D")
        );
        assert_eq!(value_of(&outcome, Column::Description), Some("FL TO"));
        assert_eq!(
            value_of(&outcome, Column::ApplicableProcesses),
            Some("fresh-loan,takeover-loan,release")
        );
    }

    #[test]
    fn record_without_fee_moves_foreclosure_into_second_charge() {
        let table = table(
            &["refName", "chargeText", "bs2-charge-2", "bs2-NoOfCharges", "bs2-legalName"],
            &[
                "Gold (e0) 12M 2.50% silver >12L renewal",
                "{\"processingFee\":\"1%\"}",
                "{\"name\":\"PF\"}",
                "3",
                "Royal 12M f8 PF 1% FC",
            ],
        );
        let row = table.row(0).expect("row");
        let outcome = evaluate(&row, &SchemeSettings::default());

        assert_eq!(outcome.status, RecordStatus::Updated);
        let decision = outcome.decision.expect("decision");
        assert_eq!(decision.tier, Tier::Secondary);
        assert_eq!(value_of(&outcome, Column::ChargeText), Some("{}"));
        assert_eq!(value_of(&outcome, Column::UnsecuredCharge3), Some("{}"));
        assert_eq!(value_of(&outcome, Column::UnsecuredChargeCount), Some("2"));

        // e-series, above 6L: 1.00 over 1 - 60/80
        let foreclosure = json_of(&outcome, Column::UnsecuredCharge2);
        assert_eq!(foreclosure["name"], json!("Foreclosure"));
        assert_eq!(foreclosure["chargeValue"], json!(4.0));
        assert_eq!(foreclosure["applicableProcesses"], json!(["renewal", "release"]));
        assert_eq!(
            value_of(&outcome, Column::UnsecuredLegalName),
            Some("Royal 12M th7.si5 FC 90D")
        );
        assert_eq!(value_of(&outcome, Column::CustomerLtv), Some("80.0"));
    }

    #[test]
    fn degenerate_split_keeps_rates_but_skips_charges() {
        let settings = SchemeSettings {
            ltv_codes: crate::workflows::scheme::signature::LtvCodeTable::with_si5(60),
            ..SchemeSettings::default()
        };
        let table = table(
            &["refName", "bs1-ltv", "description", "bs2-charge-2"],
            &["Gold si5 12M 1.00% PF 1%", "", "", ""],
        );
        let row = table.row(0).expect("row");
        let outcome = evaluate(&row, &settings);

        assert_eq!(outcome.status, RecordStatus::DegenerateSplit);
        assert_eq!(value_of(&outcome, Column::SecuredLtv), Some("60.0"));
        assert_eq!(value_of(&outcome, Column::Tenure), Some("12"));
        assert_eq!(value_of(&outcome, Column::Description), None);
        assert_eq!(value_of(&outcome, Column::UnsecuredCharge2), None);
    }

    #[test]
    fn basis_above_ltv_never_writes_negative_charges() {
        let slabs = slabs_document();
        let table = table(
            &[
                "refName",
                "OverallInterestCalculation",
                "chargeText",
                "bs2-charge-2",
                "bs2-legalName",
                "description",
            ],
            &[
                "Gold (si5) 6M 1.00% PF 1% Economy 3-6L",
                &slabs,
                "{}",
                "{\"chargeValue\":0}",
                "Royal 6M f8 PF 1% FC",
                "",
            ],
        );
        let row = table.row(0).expect("row");
        let outcome = evaluate(&row, &SchemeSettings::default());

        assert_eq!(outcome.status, RecordStatus::DegenerateSplit);
        assert_eq!(
            outcome.decision,
            Some(TierDecision {
                tier: Tier::Secondary,
                final_term: 7
            })
        );
        assert_eq!(value_of(&outcome, Column::CustomerLtv), Some("65.0"));
        assert_eq!(value_of(&outcome, Column::Tenure), Some("7"));
        let overall = json_of(&outcome, Column::OverallInterest);
        assert_eq!(overall["interestSlabs"][1]["interestRate"], json!(18.5));
        assert_eq!(overall["interestSlabs"][2]["interestRate"], json!(24.25));
        assert_eq!(value_of(&outcome, Column::ChargeText), None);
        assert_eq!(value_of(&outcome, Column::UnsecuredCharge2), None);
        assert_eq!(value_of(&outcome, Column::UnsecuredCharge3), None);
        assert_eq!(value_of(&outcome, Column::UnsecuredLegalName), None);
        assert_eq!(value_of(&outcome, Column::Description), None);
    }

    #[test]
    fn force_flexi_charges_the_maximum_of_a_single_fee() {
        let table = table(&["refName", "bs2-charge-2"], &["Gold (e0) 12M 2.50% PF 1%", ""]);
        let row = table.row(0).expect("row");
        let settings = SchemeSettings::default().with_force_flexi(true);
        let outcome = evaluate(&row, &settings);

        let fee = json_of(&outcome, Column::UnsecuredCharge2);
        assert_eq!(fee["chargeValue"], json!(4.0));
        assert_eq!(
            fee["chargesMetaData"],
            json!({"minPercentUnsecure": 4.0, "maxPercentUnsecure": 4.0})
        );
    }
}
