use super::rates::SecuredBasisTable;
use super::signature::LtvCodeTable;
use serde::{Deserialize, Serialize};

pub const DEFAULT_LEGAL_NAME_PREFIX: &str = "Rupeek";

/// Read-only inputs shared by every record of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemeSettings {
    /// Treat every declared fee as flexi, regardless of the identifier.
    pub force_flexi: bool,
    pub ltv_codes: LtvCodeTable,
    pub secured_basis: SecuredBasisTable,
    /// Prefix of the secured legal name, followed by the tier label.
    pub legal_name_prefix: String,
}

impl SchemeSettings {
    pub fn with_force_flexi(mut self, force_flexi: bool) -> Self {
        self.force_flexi = force_flexi;
        self
    }

    pub fn legal_name(&self, tier_label: &str) -> String {
        format!("{} {tier_label}", self.legal_name_prefix)
    }
}

impl Default for SchemeSettings {
    fn default() -> Self {
        Self {
            force_flexi: false,
            ltv_codes: LtvCodeTable::default(),
            secured_basis: SecuredBasisTable::default(),
            legal_name_prefix: DEFAULT_LEGAL_NAME_PREFIX.to_string(),
        }
    }
}
