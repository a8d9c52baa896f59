use super::decimal::whole;
use super::scan::{self, Piece, DASHES};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// Code → overall LTV percentage lookup used when reading identifiers.
///
/// `si5` has been published as both 65 and 75; the value is always supplied
/// explicitly through [`LtvCodeTable::with_si5`] or configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LtvCodeTable {
    entries: Vec<(String, u32)>,
}

pub const DEFAULT_SI5_LTV: u32 = 65;

impl LtvCodeTable {
    pub fn with_si5(si5_ltv: u32) -> Self {
        let entries = [("e0", 80), ("s5", 75), ("s7", 77), ("s6", 76), ("si5", si5_ltv)]
            .into_iter()
            .map(|(code, ltv)| (code.to_string(), ltv))
            .collect();
        Self { entries }
    }

    pub fn lookup(&self, code: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(candidate, _)| candidate == code)
            .map(|(_, ltv)| *ltv)
    }
}

impl Default for LtvCodeTable {
    fn default() -> Self {
        Self::with_si5(DEFAULT_SI5_LTV)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    Economy,
    Silver,
}

/// Ticket-size bucket, split at 6 lakh.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TicketBucket {
    UpTo6L,
    Above6L,
}

/// Stated overall processing fee, as a range or a single value (`min == max`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeeBounds {
    pub min: BigDecimal,
    pub max: BigDecimal,
}

impl FeeBounds {
    pub fn single(value: BigDecimal) -> Self {
        Self {
            min: value.clone(),
            max: value,
        }
    }

    pub fn is_range(&self) -> bool {
        self.min != self.max
    }
}

/// Everything the engine needs from a scheme identifier.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductSignature {
    pub overall_ltv: BigDecimal,
    pub requested_term: u32,
    pub monthly_rate: BigDecimal,
    pub fee: Option<FeeBounds>,
    pub declares_fee: bool,
    pub scheme_code: Option<String>,
    pub variant: Option<Variant>,
    pub ticket: TicketBucket,
    pub fresh_or_takeover: bool,
    pub renewal: bool,
    pub flexi_keyword: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignatureError {
    #[error("identifier carries no known LTV code")]
    MissingLtv,
    #[error("identifier carries no term token such as `6M`")]
    MissingTerm,
    #[error("identifier carries no monthly rate before the PF token")]
    MissingRate,
}

pub fn parse(identifier: &str, ltv_codes: &LtvCodeTable) -> Result<ProductSignature, SignatureError> {
    let original = scan::chars(identifier);
    let lowered = scan::chars(&identifier.to_lowercase());

    let overall_ltv = overall_ltv(&lowered, ltv_codes).ok_or(SignatureError::MissingLtv)?;
    let requested_term = scan::find_term_token(&original)
        .map(|(_, months)| months)
        .filter(|months| *months > 0)
        .ok_or(SignatureError::MissingTerm)?;
    let monthly_rate = monthly_rate(&original)
        .filter(|rate| *rate != whole(0))
        .ok_or(SignatureError::MissingRate)?;

    Ok(ProductSignature {
        overall_ltv: whole(i64::from(overall_ltv)),
        requested_term,
        monthly_rate,
        fee: fee_bounds(&original),
        declares_fee: scan::find_word(&original, "pf").is_some(),
        scheme_code: scheme_code(&lowered),
        variant: variant(&lowered),
        ticket: ticket_bucket(&lowered),
        fresh_or_takeover: has_fresh_or_takeover(&lowered),
        renewal: has_renewal(&lowered),
        flexi_keyword: has_flexi_keyword(&lowered),
    })
}

fn decimal(raw: &str) -> Option<BigDecimal> {
    BigDecimal::from_str(raw).ok()
}

/// Tokens from bracket groups first, then from the whole text.
fn prioritized_tokens(lowered: &[char]) -> impl Iterator<Item = String> + '_ {
    scan::bracket_segments(lowered)
        .into_iter()
        .flat_map(scan::alnum_tokens)
        .chain(scan::alnum_tokens(lowered))
}

fn overall_ltv(lowered: &[char], ltv_codes: &LtvCodeTable) -> Option<u32> {
    prioritized_tokens(lowered).find_map(|token| {
        let ltv = ltv_codes.lookup(&token)?;
        if token == "si5" {
            debug!(ltv, "resolved ambiguous si5 LTV code from configuration");
        }
        Some(ltv)
    })
}

fn monthly_rate(original: &[char]) -> Option<BigDecimal> {
    let head = scan::split_ci(original, "pf").into_iter().next()?;
    scan::first_percent(head, false).and_then(|raw| decimal(&raw))
}

fn fee_bounds(original: &[char]) -> Option<FeeBounds> {
    let after_pf = scan::split_ci(original, "pf").get(1).copied();

    let range = scan::find_fee_range(original).or_else(|| {
        let found = scan::percents(after_pf?, true);
        match found.as_slice() {
            [low, high, ..] => Some((low.clone(), high.clone())),
            _ => None,
        }
    });
    if let Some((low, high)) = range {
        return Some(FeeBounds {
            min: decimal(&low)?,
            max: decimal(&high)?,
        });
    }

    let single = scan::find_fee_token(original)
        .map(|(_, raw)| raw)
        .or_else(|| scan::percents(after_pf?, true).into_iter().next())?;
    decimal(&single).map(FeeBounds::single)
}

fn scheme_code(lowered: &[char]) -> Option<String> {
    prioritized_tokens(lowered).find(|token| {
        let mut chars = token.chars();
        matches!(chars.next(), Some('s' | 'e'))
            && token.len() > 1
            && chars.all(|c| c.is_ascii_digit())
    })
}

fn variant(lowered: &[char]) -> Option<Variant> {
    if scan::contains_text(lowered, "economy") {
        Some(Variant::Economy)
    } else if scan::contains_text(lowered, "silver") {
        Some(Variant::Silver)
    } else {
        None
    }
}

const SMALL_TICKET: &[&[Piece]] = &[
    &[Piece::Lit("<"), Piece::Gap, Piece::Lit("3"), Piece::Gap, Piece::Lit("l")],
    &[Piece::Lit("0"), Piece::Gap, Piece::One(DASHES), Piece::Gap, Piece::Lit("3"), Piece::Gap, Piece::Lit("l")],
    &[Piece::Lit("3"), Piece::Gap, Piece::One(DASHES), Piece::Gap, Piece::Lit("6"), Piece::Gap, Piece::Lit("l")],
];

const LARGE_TICKET: &[&[Piece]] = &[
    &[Piece::Lit("6"), Piece::Gap, Piece::One(DASHES), Piece::Gap, Piece::Lit("12"), Piece::Gap, Piece::Lit("l")],
    &[Piece::Lit("12"), Piece::Gap, Piece::One(DASHES), Piece::Gap, Piece::Lit("25"), Piece::Gap, Piece::Lit("l")],
    &[Piece::Lit("12"), Piece::Gap, Piece::Lit("l"), Piece::Gap, Piece::Lit("+")],
    &[Piece::Lit(">"), Piece::Gap, Piece::Lit("12"), Piece::Gap, Piece::Lit("l")],
];

const LEGACY_SMALL_TICKET: &[&[Piece]] = &[
    &[Piece::Lit("<"), Piece::Gap, Piece::Lit("5"), Piece::Gap, Piece::Lit("l")],
    &[Piece::Lit("<"), Piece::Gap, Piece::Lit("6"), Piece::Gap, Piece::Lit("l")],
];

const LEGACY_LARGE_TICKET: &[&[Piece]] = &[
    &[Piece::Lit(">"), Piece::Gap, Piece::Lit("5"), Piece::Gap, Piece::Lit("l")],
    &[Piece::Lit(">"), Piece::Gap, Piece::Lit("6"), Piece::Gap, Piece::Lit("l")],
];

fn any_phrase(text: &[char], phrases: &[&[Piece]]) -> bool {
    phrases.iter().any(|phrase| scan::contains_phrase(text, phrase))
}

fn ticket_bucket(lowered: &[char]) -> TicketBucket {
    if any_phrase(lowered, SMALL_TICKET) {
        TicketBucket::UpTo6L
    } else if any_phrase(lowered, LARGE_TICKET) {
        TicketBucket::Above6L
    } else if any_phrase(lowered, LEGACY_SMALL_TICKET) {
        TicketBucket::UpTo6L
    } else {
        // legacy `>5l`/`>6l` tags and untagged identifiers land in the same bucket
        TicketBucket::Above6L
    }
}

const FRESH_OR_TAKEOVER: &[&[Piece]] = &[
    &[Piece::Lit("fl"), Piece::Gap, Piece::Run(&['-', '/', ' ']), Piece::Lit("to")],
    &[Piece::Lit("flto")],
    &[Piece::Lit("fresh")],
    &[Piece::Lit("take"), Piece::Gap, Piece::Maybe(&['-', ' ']), Piece::Lit("over")],
    &[Piece::Lit("takeover")],
];

const RENEWAL: &[&[Piece]] = &[&[Piece::Lit("renewal")], &[Piece::Lit("retention")]];

const FLEXI_KEYWORDS: &[&str] = &["flexipf", "flexi pf", "flexi-pf"];

pub(crate) fn has_fresh_or_takeover(lowered: &[char]) -> bool {
    FRESH_OR_TAKEOVER
        .iter()
        .any(|phrase| scan::contains_word_phrase(lowered, phrase))
}

pub(crate) fn has_renewal(lowered: &[char]) -> bool {
    RENEWAL
        .iter()
        .any(|phrase| scan::contains_word_phrase(lowered, phrase))
}

pub(crate) fn has_flexi_keyword(lowered: &[char]) -> bool {
    FLEXI_KEYWORDS
        .iter()
        .any(|keyword| scan::contains_text(lowered, keyword))
}
