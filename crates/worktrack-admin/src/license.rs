//! Enterprise entitlement gating.
//!
//! Some capabilities (multi-select custom fields among them) are only
//! available when the installation's enterprise license grants them. The
//! licensing service itself is external; this module only models the check.

use std::collections::HashSet;

use worktrack_core::settings::Settings;

/// A capability gated by the enterprise license.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnterpriseFeature {
    /// List custom fields may accept multiple selected options.
    MultiselectCustomFields,
    /// Baseline comparison on work package views.
    BaselineComparison,
}

impl EnterpriseFeature {
    /// Returns the feature key as it appears in settings.
    pub const fn key(self) -> &'static str {
        match self {
            Self::MultiselectCustomFields => "multiselect_custom_fields",
            Self::BaselineComparison => "baseline_comparison",
        }
    }
}

/// The entitlement check consulted before license-gated capabilities are
/// applied.
pub trait EnterpriseGate: Send + Sync {
    /// Returns `true` if the installation is entitled to the feature.
    fn allows(&self, feature: EnterpriseFeature) -> bool;
}

/// An [`EnterpriseGate`] backed by the application settings.
#[derive(Debug, Clone)]
pub struct SettingsGate {
    settings: Settings,
}

impl SettingsGate {
    /// Creates a gate reading entitlements from the given settings.
    pub const fn new(settings: Settings) -> Self {
        Self { settings }
    }
}

impl EnterpriseGate for SettingsGate {
    fn allows(&self, feature: EnterpriseFeature) -> bool {
        self.settings.enterprise_feature_enabled(feature.key())
    }
}

/// A fixed-entitlement gate, used by tests and development setups.
#[derive(Debug, Clone, Default)]
pub struct StaticGate {
    allowed: HashSet<EnterpriseFeature>,
}

impl StaticGate {
    /// A gate that grants nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// A gate that grants exactly the given features.
    pub fn allowing(features: impl IntoIterator<Item = EnterpriseFeature>) -> Self {
        Self {
            allowed: features.into_iter().collect(),
        }
    }
}

impl EnterpriseGate for StaticGate {
    fn allows(&self, feature: EnterpriseFeature) -> bool {
        self.allowed.contains(&feature)
    }
}
