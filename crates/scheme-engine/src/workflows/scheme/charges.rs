use super::decimal::{hundredths, round2, whole};
use super::signature::{FeeBounds, ProductSignature, TicketBucket, Variant};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

const GROUP_CODES: &[&str] = &["s2", "s4", "s5", "s7"];
const E_SERIES_CODES: &[&str] = &["e0", "e1", "e2", "e4"];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ChargeError {
    #[error("secured basis covers the whole overall LTV; nothing is left to carry unsecured charges")]
    DegenerateSplit,
}

/// Processing fee restated on the unsecured portion.
#[derive(Debug, Clone, PartialEq)]
pub struct FeeCharge {
    pub min_unsecured: BigDecimal,
    pub max_unsecured: BigDecimal,
    /// Value written as the charge (`max` when flexi, otherwise `min`).
    pub charge_value: BigDecimal,
    /// Overall fee quoted next to `charge_value` in the charge text.
    pub overall_value: BigDecimal,
    pub flexi: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ForeclosureDuration {
    ThreeMonths,
    FourMonths,
}

impl ForeclosureDuration {
    pub const fn months(self) -> u32 {
        match self {
            Self::ThreeMonths => 3,
            Self::FourMonths => 4,
        }
    }

    /// Day suffix used in legal names (`90D`).
    pub const fn days_label(self) -> &'static str {
        match self {
            Self::ThreeMonths => "90D",
            Self::FourMonths => "120D",
        }
    }
}

/// Overall foreclosure percentage and lock-in duration before back-calculation.
#[derive(Debug, Clone, PartialEq)]
pub struct ForeclosureTerms {
    pub overall_percent: BigDecimal,
    pub duration: ForeclosureDuration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForeclosureCharge {
    pub overall_percent: BigDecimal,
    pub unsecured_percent: BigDecimal,
    pub duration: ForeclosureDuration,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChargeSet {
    pub denominator: BigDecimal,
    pub fee: Option<FeeCharge>,
    pub foreclosure: ForeclosureCharge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TermBucket {
    Short,
    Year,
}

impl TermBucket {
    fn of(final_term: u32) -> Self {
        if final_term == 12 {
            Self::Year
        } else {
            Self::Short
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemeFamily {
    Group,
    ESeries,
    Other,
}

impl SchemeFamily {
    fn of(scheme_code: Option<&str>) -> Self {
        match scheme_code {
            Some(code) if GROUP_CODES.contains(&code) => Self::Group,
            Some(code) if E_SERIES_CODES.contains(&code) => Self::ESeries,
            _ => Self::Other,
        }
    }
}

fn terms(percent_hundredths: i64, duration: ForeclosureDuration) -> ForeclosureTerms {
    ForeclosureTerms {
        overall_percent: hundredths(percent_hundredths),
        duration,
    }
}

/// Looks up the overall foreclosure percentage and duration for a record.
pub fn foreclosure_terms(
    scheme_code: Option<&str>,
    variant: Option<Variant>,
    ticket: TicketBucket,
    final_term: u32,
) -> ForeclosureTerms {
    use ForeclosureDuration::{FourMonths, ThreeMonths};

    let Some(variant) = variant else {
        return terms(100, ThreeMonths);
    };
    let small = ticket == TicketBucket::UpTo6L;
    let duration = match TermBucket::of(final_term) {
        TermBucket::Year => FourMonths,
        TermBucket::Short => ThreeMonths,
    };

    match (SchemeFamily::of(scheme_code), variant) {
        (SchemeFamily::Group, Variant::Economy) => terms(if small { 150 } else { 100 }, duration),
        (SchemeFamily::Group, Variant::Silver) => terms(if small { 100 } else { 50 }, duration),
        (SchemeFamily::ESeries, _) => terms(if small { 150 } else { 100 }, ThreeMonths),
        (SchemeFamily::Other, _) => terms(100, ThreeMonths),
    }
}

fn fee_charge(bounds: &FeeBounds, denominator: &BigDecimal, flexi: bool) -> FeeCharge {
    let min_unsecured = round2(&(&bounds.min / denominator));
    let max_unsecured = round2(&(&bounds.max / denominator));
    let (charge_value, overall_value) = if flexi {
        (max_unsecured.clone(), bounds.max.clone())
    } else {
        (min_unsecured.clone(), bounds.min.clone())
    };
    FeeCharge {
        min_unsecured,
        max_unsecured,
        charge_value,
        overall_value,
        flexi,
    }
}

/// Restates the stated overall fee and foreclosure charges on the unsecured portion
/// of the loan, `charge / (1 - secured_basis / overall_ltv)`.
///
/// A basis at or above the overall LTV leaves no unsecured portion and is rejected.
pub fn back_calculate(
    signature: &ProductSignature,
    secured_basis: &BigDecimal,
    final_term: u32,
    force_flexi: bool,
) -> Result<ChargeSet, ChargeError> {
    let denominator = whole(1) - secured_basis / &signature.overall_ltv;
    if denominator <= whole(0) {
        return Err(ChargeError::DegenerateSplit);
    }

    let fee = signature
        .fee
        .as_ref()
        .filter(|_| signature.declares_fee)
        .map(|bounds| {
            let flexi = bounds.is_range() || signature.flexi_keyword || force_flexi;
            fee_charge(bounds, &denominator, flexi)
        });

    let ForeclosureTerms {
        overall_percent,
        duration,
    } = foreclosure_terms(
        signature.scheme_code.as_deref(),
        signature.variant,
        signature.ticket,
        final_term,
    );
    let unsecured_percent = round2(&(&overall_percent / &denominator));

    Ok(ChargeSet {
        denominator,
        fee,
        foreclosure: ForeclosureCharge {
            overall_percent,
            unsecured_percent,
            duration,
        },
    })
}
