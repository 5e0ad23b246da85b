//! Chemical element definitions.

/// Elements that appear in the supported mechanism datasets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Element {
    /// Hydrogen
    H,
    /// Helium
    He,
    /// Carbon
    C,
    /// Nitrogen
    N,
    /// Oxygen
    O,
    /// Sulfur
    S,
    /// Argon
    Ar,
}

impl Element {
    pub const ALL: [Element; 7] = [
        Element::H,
        Element::He,
        Element::C,
        Element::N,
        Element::O,
        Element::S,
        Element::Ar,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Element::H => "H",
            Element::He => "He",
            Element::C => "C",
            Element::N => "N",
            Element::O => "O",
            Element::S => "S",
            Element::Ar => "Ar",
        }
    }

    /// Standard atomic weight [kg/kmol].
    pub fn atomic_weight(&self) -> f64 {
        match self {
            Element::H => 1.008,
            Element::He => 4.002602,
            Element::C => 12.011,
            Element::N => 14.007,
            Element::O => 15.999,
            Element::S => 32.06,
            Element::Ar => 39.95,
        }
    }

    /// O atoms needed per atom to reach complete combustion products
    /// (CO2, H2O, SO2). Oxygen itself counts negative.
    pub fn oxygen_demand(&self) -> f64 {
        match self {
            Element::C => 2.0,
            Element::H => 0.5,
            Element::S => 2.0,
            Element::O => -1.0,
            Element::He | Element::N | Element::Ar => 0.0,
        }
    }
}

impl std::str::FromStr for Element {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "H" => Ok(Element::H),
            "HE" => Ok(Element::He),
            "C" => Ok(Element::C),
            "N" => Ok(Element::N),
            "O" => Ok(Element::O),
            "S" => Ok(Element::S),
            "AR" => Ok(Element::Ar),
            _ => Err("unknown element"),
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.key())
    }
}
