//! Machine name standardization and overclock family lookup.

/// Fuel class burned by a large turbine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurbineFuel {
    Gas,
    Steam,
}

impl TurbineFuel {
    /// Key of the fuel table in the turbine data.
    pub fn table_key(&self) -> &'static str {
        match self {
            TurbineFuel::Gas => "gas_fuels",
            TurbineFuel::Steam => "steam_fuels",
        }
    }
}

/// Overclock model a machine follows.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MachineFamily {
    /// 4x energy, 2x speed per tier
    Standard,
    /// 4x energy, 4x speed per tier
    Perfect,
    BlastFurnace,
    PyrolyseOven,
    MultiSmelter,
    Fusion,
    Turbine { fuel: TurbineFuel, xl: bool },
    /// GT++ multiblock driven by the per-machine stats table
    GtPlusPlus,
    /// GT++ multiblock with fixed parallels and a 20 tick floor
    GtPlusPlusCustom { max_parallels: u32, speed_per_tier: f64 },
    ChemicalPlant,
    Zhuhai,
    TreeGrowthSimulator,
    Dehydrator,
}

const ALIASES: &[(&str, &str)] = &[
    ("cal", "circuit assembly line"),
    ("chem plant", "chemical plant"),
    ("exxonmobil", "chemical plant"),
    ("ebf", "electric blast furnace"),
    ("blast furnace", "electric blast furnace"),
    ("industrial mixer", "industrial mixing machine"),
    ("industrial rock breaker", "boldarnator"),
    ("industrial thermal centrifuge", "large thermal refinery"),
    ("isamill", "isamill grinding machine"),
    ("lcr", "large chemical reactor"),
    ("lpf", "large processing factory"),
    ("tgs", "tree growth simulator"),
    ("utupu tanuri", "industrial dehydrator"),
    ("utupu-tanuri", "industrial dehydrator"),
    ("xl gas turbine", "xl turbo gas turbine"),
    ("xl steam turbine", "xl turbo steam turbine"),
    ("lgt", "large gas turbine"),
    ("lst", "large steam turbine"),
    ("xlgt", "xl turbo gas turbine"),
    ("xlst", "xl turbo steam turbine"),
    ("flotation cell", "flotation cell regulator"),
    ("fusion", "fusion reactor"),
    ("high current industrial arc furnace", "industrial arc furnace"),
    ("ico", "industrial coke oven"),
];

const GTPP_MACHINES: &[&str] = &[
    "industrial centrifuge",
    "industrial material press",
    "industrial electrolyzer",
    "maceration stack",
    "wire factory",
    "industrial mixing machine",
    "industrial sifter",
    "large thermal refinery",
    "industrial wash plant",
    "industrial extrusion machine",
    "large processing factory",
    "industrial arc furnace",
    "large scale auto-assembler",
    "cutting factory controller",
    "boldarnator",
    "dangote - distillery",
    "thermic heating device",
];

/// Casefold a machine name and resolve aliases to the standard name.
pub fn canonical_machine_name(raw: &str) -> String {
    let name = raw.trim().to_lowercase();
    ALIASES
        .iter()
        .find(|(alias, _)| *alias == name)
        .map(|(_, standard)| standard.to_string())
        .unwrap_or(name)
}

impl MachineFamily {
    /// Overclock family of a standardized machine name.
    pub fn of(machine: &str) -> Self {
        match machine {
            "pyrolyse oven" => MachineFamily::PyrolyseOven,
            "electric blast furnace" => MachineFamily::BlastFurnace,
            "multi smelter" => MachineFamily::MultiSmelter,
            "fusion reactor" => MachineFamily::Fusion,
            "large chemical reactor"
            | "circuit assembly line"
            | "flotation cell regulator"
            | "isamill grinding machine" => MachineFamily::Perfect,
            "large gas turbine" => MachineFamily::Turbine {
                fuel: TurbineFuel::Gas,
                xl: false,
            },
            "xl turbo gas turbine" => MachineFamily::Turbine {
                fuel: TurbineFuel::Gas,
                xl: true,
            },
            "large steam turbine" => MachineFamily::Turbine {
                fuel: TurbineFuel::Steam,
                xl: false,
            },
            "xl turbo steam turbine" => MachineFamily::Turbine {
                fuel: TurbineFuel::Steam,
                xl: true,
            },
            "industrial coke oven" => MachineFamily::GtPlusPlusCustom {
                max_parallels: 24,
                speed_per_tier: 0.96,
            },
            "dangote - distillation tower" | "dangote" => MachineFamily::GtPlusPlusCustom {
                max_parallels: 12,
                speed_per_tier: 1.0,
            },
            "chemical plant" => MachineFamily::ChemicalPlant,
            "zhuhai" => MachineFamily::Zhuhai,
            "tree growth simulator" => MachineFamily::TreeGrowthSimulator,
            "industrial dehydrator" => MachineFamily::Dehydrator,
            m if GTPP_MACHINES.contains(&m) => MachineFamily::GtPlusPlus,
            _ => MachineFamily::Standard,
        }
    }

    /// Whether the machine generates power rather than consuming it.
    pub fn is_generator(&self) -> bool {
        matches!(self, MachineFamily::Turbine { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aliases() {
        assert_eq!(canonical_machine_name("EBF"), "electric blast furnace");
        assert_eq!(canonical_machine_name(" LCR "), "large chemical reactor");
        assert_eq!(canonical_machine_name("XLGT"), "xl turbo gas turbine");
        assert_eq!(canonical_machine_name("centrifuge"), "centrifuge");
    }

    #[test]
    fn test_family_lookup() {
        assert_eq!(MachineFamily::of("centrifuge"), MachineFamily::Standard);
        assert_eq!(MachineFamily::of("large chemical reactor"), MachineFamily::Perfect);
        assert_eq!(MachineFamily::of("wire factory"), MachineFamily::GtPlusPlus);
        assert!(MachineFamily::of("large steam turbine").is_generator());
        assert!(matches!(
            MachineFamily::of("industrial coke oven"),
            MachineFamily::GtPlusPlusCustom { max_parallels: 24, .. }
        ));
    }
}
