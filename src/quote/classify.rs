//! Keyword classification of estimate inputs.
//!
//! Starter types and valve models arrive as free text from the estimate UI.
//! Classification happens once, up front, into tagged variants so the rule set
//! stays exhaustively testable.

/// Valve actuation family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Actuation {
    Pneumatic,
    Electric,
}

impl Actuation {
    /// Classify from the row's actuation field or its model text.
    /// Unspecified rows are pneumatic, the standard supply.
    pub fn classify(actuation: Option<&str>, model: Option<&str>) -> Self {
        let text = actuation.or(model).unwrap_or("").to_ascii_lowercase();
        if text.contains("electric") || text.contains("el.") {
            Actuation::Electric
        } else {
            Actuation::Pneumatic
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Actuation::Pneumatic => "pneumatically",
            Actuation::Electric => "electrically",
        }
    }

    pub fn template_key(&self, mode: ActingMode) -> &'static str {
        match (self, mode) {
            (Actuation::Pneumatic, ActingMode::Single) => "valves_pneumatic_single",
            (Actuation::Pneumatic, ActingMode::Double) => "valves_pneumatic_double",
            (Actuation::Electric, ActingMode::Single) => "valves_electric_single",
            (Actuation::Electric, ActingMode::Double) => "valves_electric_double",
        }
    }
}

/// Valve acting mode. Defaults to single acting when unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActingMode {
    Single,
    Double,
}

impl ActingMode {
    pub fn classify(acting: Option<&str>) -> Self {
        match acting {
            Some(text) if text.to_ascii_lowercase().contains("double") => ActingMode::Double,
            _ => ActingMode::Single,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ActingMode::Single => "single acting",
            ActingMode::Double => "double acting",
        }
    }
}

/// Motor starter type, classified by keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StarterKind {
    Vfd,
    Soft,
    StarDelta,
    Dol,
}

impl StarterKind {
    /// Keyword order matters: "VFD" and "SOFT" take precedence over the
    /// star-delta markers, anything else is direct-on-line.
    pub fn classify(starter_type: &str) -> Self {
        let text = starter_type.to_ascii_uppercase();
        if text.contains("VFD") || text.contains("FREQUENCY") {
            StarterKind::Vfd
        } else if text.contains("SOFT") {
            StarterKind::Soft
        } else if text.contains('Y') || text.contains("DELTA") {
            StarterKind::StarDelta
        } else {
            StarterKind::Dol
        }
    }

    pub fn template_key(&self) -> &'static str {
        match self {
            StarterKind::Vfd => "starter_vfd",
            StarterKind::Soft => "starter_soft",
            StarterKind::StarDelta => "starter_star_delta",
            StarterKind::Dol => "starter_dol",
        }
    }

    /// Hardcoded description used when the template dictionary has no entry.
    pub fn fallback_description(&self) -> &'static str {
        match self {
            StarterKind::Vfd => {
                "Frequency converter (VFD) starter for pump motor, incl. local control unit"
            }
            StarterKind::Soft => "Soft starter for pump motor, in steel cabinet",
            StarterKind::StarDelta => "Star-delta (Y/D) starter for pump motor",
            StarterKind::Dol => "DOL starter for pump motor",
        }
    }
}

/// Valve body style, classified from the model text by substring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValveModel {
    DoubleFlange,
    SemiLug,
    Lug,
    Wafer,
    Mono,
    Generic,
}

impl ValveModel {
    /// "semi-lug" must be probed before "lug".
    pub fn classify(model: &str) -> Self {
        let text = model.to_ascii_lowercase();
        if text.contains("double flange") || text.contains("double-flange") {
            ValveModel::DoubleFlange
        } else if text.contains("semi-lug") || text.contains("semi lug") {
            ValveModel::SemiLug
        } else if text.contains("lug") {
            ValveModel::Lug
        } else if text.contains("wafer") {
            ValveModel::Wafer
        } else if text.contains("mono") {
            ValveModel::Mono
        } else {
            ValveModel::Generic
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ValveModel::DoubleFlange => "Double-flange valve",
            ValveModel::SemiLug => "Semi-lug valve",
            ValveModel::Lug => "Lug valve",
            ValveModel::Wafer => "Wafer valve",
            ValveModel::Mono => "Mono valve",
            ValveModel::Generic => "Valve",
        }
    }
}
