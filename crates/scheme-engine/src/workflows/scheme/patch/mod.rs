//! Best-effort rewrites of the JSON documents and label text carried on a record.
//!
//! Every patch takes the field text and returns the new text. Input that cannot be
//! parsed is handed back unchanged unless the patch documents a template fallback.

mod charges;
mod label;
mod slabs;

pub use charges::{patch_charge_text, patch_fee_charge, patch_foreclosure_charge};
pub use label::{patch_fee_label, patch_term_label, rewrite_identifier_term};
pub use slabs::patch_slabs;

use serde_json::Value;

fn parse_document(text: &str) -> Option<Value> {
    serde_json::from_str(text).ok()
}

fn render(document: &Value) -> String {
    document.to_string()
}
