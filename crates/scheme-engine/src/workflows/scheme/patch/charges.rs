use super::{parse_document, render};
use crate::workflows::scheme::charges::{FeeCharge, ForeclosureCharge};
use crate::workflows::scheme::decimal::{json_percent, percent_text};
use crate::workflows::scheme::processes::ApplicableProcesses;
use bigdecimal::BigDecimal;
use serde_json::{json, Map, Value};

const META_KEY: &str = "chargesMetaData";

fn processes_value(processes: &ApplicableProcesses) -> Value {
    Value::from(processes.tags())
}

fn set(fields: &mut Map<String, Value>, key: &str, value: Value) {
    fields.insert(key.to_string(), value);
}

/// Sets `key` inside the metadata object, replacing any non-object value stored there.
fn set_metadata(fields: &mut Map<String, Value>, key: &str, value: Value) {
    match fields.get_mut(META_KEY) {
        Some(Value::Object(meta)) => set(meta, key, value),
        _ => {
            let mut meta = Map::new();
            set(&mut meta, key, value);
            set(fields, META_KEY, Value::Object(meta));
        }
    }
}

/// Rewrites the processing-fee charge object. Blank text starts from `{}`.
pub fn patch_fee_charge(text: &str, fee: &FeeCharge, processes: &ApplicableProcesses) -> String {
    let parsed = if text.trim().is_empty() {
        Some(Value::Object(Map::new()))
    } else {
        parse_document(text)
    };
    let Some(mut document) = parsed else {
        return text.to_string();
    };
    let Some(fields) = document.as_object_mut() else {
        return text.to_string();
    };

    set(fields, "chargeValue", json_percent(&fee.charge_value));
    if fee.flexi {
        set_metadata(fields, "minPercentUnsecure", json_percent(&fee.min_unsecured));
        set_metadata(fields, "maxPercentUnsecure", json_percent(&fee.max_unsecured));
    } else {
        set(fields, "chargeCalculationType", json!("fixed-percentage"));
        set(fields, "chargeType", json!("processing-fee"));
        set(fields, "percentageOn", json!("loanamount"));
        fields.shift_remove(META_KEY);
    }
    set(fields, "applicableProcesses", processes_value(processes));
    render(&document)
}

/// Rewrites the human-readable fee summary (`"6.15%+GST"`).
pub fn patch_charge_text(text: &str, unsecured: &BigDecimal, overall: &BigDecimal) -> String {
    let Some(mut document) = parse_document(text) else {
        return text.to_string();
    };
    let Some(fields) = document.as_object_mut() else {
        return text.to_string();
    };
    set(fields, "secureProcessingFee", json!("0%"));
    set(fields, "unsecureProcessingFee", json!(format!("{}%+GST", percent_text(unsecured))));
    set(fields, "processingFee", json!(format!("{}%+GST", percent_text(overall))));
    render(&document)
}

fn foreclosure_template() -> Value {
    json!({
        "name": "Foreclosure",
        "chargeType": "foreclosure",
        "chargeCalculationType": "fixed-percentage",
        "applicableProcesses": ["fresh-loan", "renewal", "release"],
        "chargeValue": 0,
        "maxValue": 100000,
        "cityId": null,
        "percentageOn": "loanamount",
        "chargesMetaData": {"duration": 2},
        "minValue": 999
    })
}

/// Normalises the foreclosure charge object, building it from the template when the
/// field is blank or not a JSON object.
pub fn patch_foreclosure_charge(
    text: &str,
    charge: &ForeclosureCharge,
    processes: &ApplicableProcesses,
) -> String {
    let mut document = parse_document(text)
        .filter(Value::is_object)
        .unwrap_or_else(foreclosure_template);
    let Some(fields) = document.as_object_mut() else {
        return render(&document);
    };

    set(fields, "name", json!("Foreclosure"));
    set(fields, "chargeType", json!("foreclosure"));
    set(fields, "chargeCalculationType", json!("fixed-percentage"));
    set(fields, "percentageOn", json!("loanamount"));
    set(fields, "maxValue", json!(100000));
    set(fields, "minValue", json!(999));
    set(fields, "cityId", Value::Null);
    set(fields, "applicableProcesses", processes_value(processes));
    set(fields, "chargeValue", json_percent(&charge.unsecured_percent));
    set_metadata(fields, "duration", json!(charge.duration.months()));
    render(&document)
}
