use super::decimal::{hundredths, round2, whole};
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Product tier driving the fixed secured-rate constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Primary,
    Secondary,
}

impl Tier {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Primary => "Delight",
            Self::Secondary => "Royal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TierDecision {
    pub tier: Tier,
    pub final_term: u32,
}

/// Secondary-tier products never run for 6 months; they are stretched to 7.
fn secondary(requested_term: u32) -> TierDecision {
    let final_term = match requested_term {
        6 | 7 => 7,
        other => other,
    };
    TierDecision {
        tier: Tier::Secondary,
        final_term,
    }
}

/// Classifies a record from its overall LTV, stated monthly rate and requested term.
///
/// The primary tier applies only when the secured portion cannot carry the whole
/// loan and the stated rate falls inside the band spanned by a secured-only and a
/// fully blended first slab.
pub fn decide(overall_ltv: &BigDecimal, monthly_rate: &BigDecimal, requested_term: u32) -> TierDecision {
    let (threshold, unsecured_slab1) = if requested_term == 12 {
        (whole(60), hundredths(3765))
    } else {
        (whole(67), hundredths(4800))
    };

    if *overall_ltv <= threshold {
        return secondary(requested_term);
    }

    let secured_weight = &threshold / overall_ltv;
    let unsecured_weight = whole(1) - &secured_weight;
    let secured_slab1 = hundredths(995);
    let months = whole(12);

    let secured_part = &secured_weight * &secured_slab1;
    let min_band = round2(&(&secured_part / &months));
    let max_band = round2(&((&secured_part + &unsecured_weight * &unsecured_slab1) / &months));

    if *monthly_rate >= min_band && *monthly_rate <= max_band {
        TierDecision {
            tier: Tier::Primary,
            final_term: requested_term,
        }
    } else {
        secondary(requested_term)
    }
}
