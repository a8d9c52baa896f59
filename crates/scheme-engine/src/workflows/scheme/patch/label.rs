use crate::workflows::scheme::charges::ForeclosureDuration;
use crate::workflows::scheme::decimal::percent_text;
use crate::workflows::scheme::scan;
use bigdecimal::BigDecimal;

const TERM_LABELS: &[&str] = &["6M", "7M", "12M"];
const ENCODINGS: &[&str] = &["th7.si5", "f8"];
const UNSECURED_RATE_LABELS: &[&str] = &["48.00%", "48%", "37.65%"];

/// Rewrites the first term token (`6M`, `6 m`) of an identifier to `<term>M`.
pub fn rewrite_identifier_term(identifier: &str, term: u32) -> String {
    let text = scan::chars(identifier);
    match scan::find_term_token(&text) {
        Some((span, _)) => scan::splice(&text, &span, &format!("{term}M")).into_iter().collect(),
        None => identifier.to_string(),
    }
}

fn encoding(term: u32) -> &'static str {
    if term == 12 {
        "th7.si5"
    } else {
        "f8"
    }
}

/// First pass over a legal-name label: term token and rate encoding.
///
/// Only the first matching token of each kind is touched, so labels that mention
/// several terms keep the later ones.
pub fn patch_term_label(label: &str, term: u32) -> String {
    let mut text = scan::chars(label);
    if let Some(span) = scan::find_exact_word(&text, TERM_LABELS) {
        text = scan::splice(&text, &span, &format!("{term}M"));
    }
    let target = scan::find_exact(&text, ENCODINGS)
        .or_else(|| scan::find_exact(&text, UNSECURED_RATE_LABELS));
    if let Some(span) = target {
        text = scan::splice(&text, &span, encoding(term));
    }
    text.into_iter().collect()
}

fn render(text: &[char]) -> String {
    text.iter().collect()
}

fn first_fc(text: &[char]) -> Option<scan::Span> {
    scan::find_word(text, "fc")
}

/// Second pass over a legal-name label: fee token and foreclosure marker.
pub fn patch_fee_label(
    label: &str,
    fee: Option<&BigDecimal>,
    duration: ForeclosureDuration,
    declares_fee: bool,
) -> String {
    let trimmed = scan::chars(label.trim());
    let mut text = scan::replace_all(&trimmed, "FC", scan::foreclosure_marker_at);

    if !declares_fee {
        text = scan::replace_all(&text, "", scan::fee_word_at);
        text = scan::chars(&scan::collapse_whitespace(&render(&text)));
    } else if let Some(fee) = fee {
        let fee_token = format!("PF {}%", percent_text(fee));
        text = if let Some((span, _)) = scan::find_fee_token(&text) {
            scan::splice(&text, &span, &fee_token)
        } else if let Some(span) = first_fc(&text) {
            scan::splice(&text, &span, &format!("{fee_token} FC"))
        } else {
            scan::chars(format!("{} {fee_token}", render(&text)).trim())
        };
    }

    if first_fc(&text).is_none() {
        text = scan::chars(format!("{} FC", render(&text)).trim());
    }
    if let Some(span) = first_fc(&text) {
        text = scan::splice(&text, &span, &format!("FC {}", duration.days_label()));
    }
    scan::collapse_whitespace(&render(&text))
}
