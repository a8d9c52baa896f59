use super::decimal::{hundredths, round2, whole};
use super::decision::Tier;
use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};

/// Three slab rates, in percent per annum.
pub type SlabRates = [BigDecimal; 3];

/// Secured LTV basis (percent) per final term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BasisByTerm {
    pub six_months: u32,
    pub seven_months: u32,
    pub otherwise: u32,
}

impl BasisByTerm {
    pub const fn standard() -> Self {
        Self {
            six_months: 67,
            seven_months: 66,
            otherwise: 60,
        }
    }

    pub fn for_term(&self, term: u32) -> u32 {
        match term {
            6 => self.six_months,
            7 => self.seven_months,
            _ => self.otherwise,
        }
    }
}

/// Secured LTV basis per tier. Both tiers share [`BasisByTerm::standard`] unless configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecuredBasisTable {
    pub primary: BasisByTerm,
    pub secondary: BasisByTerm,
}

impl SecuredBasisTable {
    pub const fn uniform(basis: BasisByTerm) -> Self {
        Self {
            primary: basis,
            secondary: basis,
        }
    }

    pub fn basis(&self, tier: Tier, term: u32) -> u32 {
        match tier {
            Tier::Primary => self.primary.for_term(term),
            Tier::Secondary => self.secondary.for_term(term),
        }
    }
}

impl Default for SecuredBasisTable {
    fn default() -> Self {
        Self::uniform(BasisByTerm::standard())
    }
}

/// Computed interest schedules for one record.
#[derive(Debug, Clone, PartialEq)]
pub struct RateSchedule {
    pub secured: SlabRates,
    /// Customer-facing unsecured schedule (flat).
    pub unsecured_display: SlabRates,
    /// Unsecured tuple used only when blending the overall schedule.
    pub unsecured_blend: SlabRates,
    pub overall: SlabRates,
    pub secured_basis: BigDecimal,
    pub term_days: u32,
}

/// Length of the loan in days; the last slab ends here.
pub fn term_days(term: u32) -> u32 {
    match term {
        6 => 180,
        7 => 210,
        12 => 360,
        other => other * 30,
    }
}

/// Annualised rate of 22.9% compounded monthly over `term` months.
pub fn secured_slab3(term: u32) -> BigDecimal {
    let months = whole(12);
    let periodic = whole(1) + BigDecimal::new(229.into(), 3) / &months;
    let mut growth = whole(1);
    for _ in 0..term {
        growth = growth * &periodic;
    }
    let annualised = (growth - whole(1)) * &months / whole(i64::from(term));
    round2(&(annualised * whole(100)))
}

fn secured_fixed(tier: Tier) -> (BigDecimal, BigDecimal) {
    match tier {
        Tier::Primary => (hundredths(995), hundredths(1700)),
        Tier::Secondary => (hundredths(1320), hundredths(1850)),
    }
}

fn unsecured_tuples(term: u32) -> (SlabRates, SlabRates) {
    if term == 12 {
        (
            [hundredths(3765), hundredths(3765), hundredths(3765)],
            [hundredths(3765), hundredths(3200), hundredths(3765)],
        )
    } else {
        (
            [hundredths(4800), hundredths(4800), hundredths(4800)],
            [hundredths(4800), hundredths(4600), hundredths(4800)],
        )
    }
}

/// Builds the secured, unsecured and overall schedules for a classified record.
/// `final_term` must be non-zero.
pub fn rate(
    tier: Tier,
    final_term: u32,
    overall_ltv: &BigDecimal,
    monthly_rate: &BigDecimal,
    basis_table: &SecuredBasisTable,
) -> RateSchedule {
    let (secured_slab1, secured_slab2) = secured_fixed(tier);
    let secured_slab3 = secured_slab3(final_term);
    let secured_basis = whole(i64::from(basis_table.basis(tier, final_term)));
    let (unsecured_display, unsecured_blend) = unsecured_tuples(final_term);

    // a basis above the LTV secures the whole loan
    let secured_part = if secured_basis > *overall_ltv {
        overall_ltv.clone()
    } else {
        secured_basis.clone()
    };
    let secured_weight = &secured_part / overall_ltv;
    let unsecured_weight = whole(1) - &secured_weight;
    let blend = |secured: &BigDecimal, unsecured: &BigDecimal| {
        round2(&(&secured_weight * secured + &unsecured_weight * unsecured))
    };

    let overall = [
        round2(&(monthly_rate * whole(12))),
        blend(&secured_slab2, &unsecured_blend[1]),
        blend(&secured_slab3, &unsecured_blend[2]),
    ];

    RateSchedule {
        secured: [secured_slab1, secured_slab2, secured_slab3],
        unsecured_display,
        unsecured_blend,
        overall,
        secured_basis,
        term_days: term_days(final_term),
    }
}
