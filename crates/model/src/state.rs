//! Carbon-pool state and output-variable definitions.

/// Per-particle carbon pools in Mg C ha-1. Never negative.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CarbonPools {
    /// Leaf carbon.
    pub leaf: f64,
    /// Wood carbon.
    pub wood: f64,
    /// Soil organic carbon.
    pub soil: f64,
}

impl CarbonPools {
    /// Creates a new pool triple.
    pub fn new(leaf: f64, wood: f64, soil: f64) -> Self {
        Self { leaf, wood, soil }
    }

    /// Returns true if every pool is non-negative and finite.
    pub fn is_valid(&self) -> bool {
        [self.leaf, self.wood, self.soil]
            .iter()
            .all(|p| p.is_finite() && *p >= 0.0)
    }
}

/// Number of output variables per particle per timestep.
pub const NUM_VARS: usize = 12;

/// One column of the dense `[step][particle][variable]` output tensor:
/// the three carbon pools followed by nine diagnostic fluxes.
///
/// Flux units are umol CO2 m-2 s-1; litterfall and mortality are pool
/// transfers in Mg C ha-1 per timestep.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OutputVar {
    /// Leaf carbon pool (Mg C ha-1).
    LeafCarbon,
    /// Wood carbon pool (Mg C ha-1).
    WoodCarbon,
    /// Soil organic carbon pool (Mg C ha-1).
    SoilCarbon,
    /// Leaf area index, derived from the updated leaf pool.
    Lai,
    /// Gross primary production.
    Gpp,
    /// Net ecosystem production (GPP - Ra - Rh).
    Nep,
    /// Autotrophic respiration.
    AutotrophicResp,
    /// Carbon allocated to wood growth.
    WoodGrowth,
    /// Carbon allocated to leaf growth.
    LeafGrowth,
    /// Heterotrophic (soil) respiration.
    HeterotrophicResp,
    /// Leaf turnover into the soil pool.
    Litterfall,
    /// Wood turnover into the soil pool.
    Mortality,
}

impl OutputVar {
    /// All variables in tensor column order.
    pub const ALL: [OutputVar; NUM_VARS] = [
        OutputVar::LeafCarbon,
        OutputVar::WoodCarbon,
        OutputVar::SoilCarbon,
        OutputVar::Lai,
        OutputVar::Gpp,
        OutputVar::Nep,
        OutputVar::AutotrophicResp,
        OutputVar::WoodGrowth,
        OutputVar::LeafGrowth,
        OutputVar::HeterotrophicResp,
        OutputVar::Litterfall,
        OutputVar::Mortality,
    ];

    /// Column index of this variable within an output row.
    pub fn index(&self) -> usize {
        Self::ALL
            .iter()
            .position(|v| v == self)
            .expect("OutputVar::ALL covers every variant")
    }

    /// Snake-case column name used in Parquet output and TOML config.
    pub fn name(&self) -> &'static str {
        match self {
            OutputVar::LeafCarbon => "leaf_c",
            OutputVar::WoodCarbon => "wood_c",
            OutputVar::SoilCarbon => "soil_c",
            OutputVar::Lai => "lai",
            OutputVar::Gpp => "gpp",
            OutputVar::Nep => "nep",
            OutputVar::AutotrophicResp => "ra",
            OutputVar::WoodGrowth => "npp_wood",
            OutputVar::LeafGrowth => "npp_leaf",
            OutputVar::HeterotrophicResp => "rh",
            OutputVar::Litterfall => "litterfall",
            OutputVar::Mortality => "mortality",
        }
    }
}

impl std::str::FromStr for OutputVar {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|v| v.name() == s)
            .copied()
            .ok_or_else(|| format!("unknown output variable '{s}'"))
    }
}

impl std::fmt::Display for OutputVar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
