use super::{parse_document, render};
use crate::workflows::scheme::decimal::json_percent;
use bigdecimal::BigDecimal;
use serde_json::{Map, Value};

const SLABS_KEY: &str = "interestSlabs";
const RATE_KEY: &str = "interestRate";
const TO_DAY_KEY: &str = "toDay";

/// Writes up to three slab rates into the first slab list of `text` and stretches
/// the last slab to `term_days`.
pub fn patch_slabs(text: &str, slabs: &[BigDecimal], term_days: u32) -> String {
    let Some(mut document) = parse_document(text) else {
        return text.to_string();
    };

    let slab_list = match find_slab_list(&document, String::new()) {
        Some(pointer) => document
            .pointer_mut(&pointer)
            .and_then(Value::as_array_mut)
            .filter(|list| !list.is_empty()),
        None => None,
    };

    if let Some(list) = slab_list {
        let count = list.len().min(slabs.len()).min(3);
        for (slab, rate) in list.iter_mut().zip(slabs).take(count) {
            if let Some(fields) = slab.as_object_mut() {
                fields.insert(RATE_KEY.to_string(), json_percent(rate));
            }
        }
        if let Some(last) = list.last_mut().and_then(Value::as_object_mut) {
            last.insert(TO_DAY_KEY.to_string(), Value::from(term_days));
        }
        return render(&document);
    }

    if let (Some(fields), Some(first)) = (document.as_object_mut(), slabs.first()) {
        if fields.contains_key(RATE_KEY) {
            fields.insert(RATE_KEY.to_string(), json_percent(first));
            if fields.contains_key(TO_DAY_KEY) {
                fields.insert(TO_DAY_KEY.to_string(), Value::from(term_days));
            }
        }
    }
    render(&document)
}

/// Depth-first search for the slab list, returned as a JSON pointer.
fn find_slab_list(node: &Value, pointer: String) -> Option<String> {
    match node {
        Value::Object(fields) => {
            if matches!(fields.get(SLABS_KEY), Some(Value::Array(_))) {
                return Some(format!("{pointer}/{SLABS_KEY}"));
            }
            fields
                .iter()
                .find_map(|(key, value)| find_slab_list(value, format!("{pointer}/{}", escape(key))))
        }
        Value::Array(items) => {
            if looks_like_slabs(items) {
                return Some(pointer);
            }
            items
                .iter()
                .enumerate()
                .find_map(|(index, item)| find_slab_list(item, format!("{pointer}/{index}")))
        }
        _ => None,
    }
}

fn looks_like_slabs(items: &[Value]) -> bool {
    let objects: Vec<&Map<String, Value>> = items.iter().filter_map(Value::as_object).collect();
    items.len() >= 3
        && objects.len() == items.len()
        && objects.iter().any(|slab| slab.contains_key(RATE_KEY))
}

fn escape(key: &str) -> String {
    key.replace('~', "~0").replace('/', "~1")
}
