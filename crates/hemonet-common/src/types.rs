//! Shared domain types
//!
//! The closed sets of blood types and blood components used across the
//! inventory store, the hospital snapshots, and the query layer. Both are
//! stored as plain text in the database; these enums are the validation
//! boundary between raw input and storage.

use serde::{Deserialize, Serialize};

/// Canonical ABO/Rh blood type values, in storage form.
pub const BLOOD_TYPES: &[&str] = &["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

/// Canonical blood component values, in storage form.
pub const BLOOD_COMPONENTS: &[&str] = &["whole_blood", "red_cells", "platelets", "plasma"];

/// ABO/Rh blood type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "A+")]
    APositive,
    #[serde(rename = "A-")]
    ANegative,
    #[serde(rename = "B+")]
    BPositive,
    #[serde(rename = "B-")]
    BNegative,
    #[serde(rename = "AB+")]
    AbPositive,
    #[serde(rename = "AB-")]
    AbNegative,
    #[serde(rename = "O+")]
    OPositive,
    #[serde(rename = "O-")]
    ONegative,
}

impl BloodType {
    /// Storage form of this blood type (e.g. `"A+"`).
    pub fn as_str(self) -> &'static str {
        match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        }
    }
}

impl std::str::FromStr for BloodType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "A+" => Ok(BloodType::APositive),
            "A-" => Ok(BloodType::ANegative),
            "B+" => Ok(BloodType::BPositive),
            "B-" => Ok(BloodType::BNegative),
            "AB+" => Ok(BloodType::AbPositive),
            "AB-" => Ok(BloodType::AbNegative),
            "O+" => Ok(BloodType::OPositive),
            "O-" => Ok(BloodType::ONegative),
            _ => Err(anyhow::anyhow!("Invalid blood type: {}", s)),
        }
    }
}

impl std::fmt::Display for BloodType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Blood component separated from a donation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BloodComponent {
    WholeBlood,
    RedCells,
    Platelets,
    Plasma,
}

impl BloodComponent {
    /// Storage form of this component (e.g. `"red_cells"`).
    pub fn as_str(self) -> &'static str {
        match self {
            BloodComponent::WholeBlood => "whole_blood",
            BloodComponent::RedCells => "red_cells",
            BloodComponent::Platelets => "platelets",
            BloodComponent::Plasma => "plasma",
        }
    }
}

impl std::str::FromStr for BloodComponent {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "whole_blood" => Ok(BloodComponent::WholeBlood),
            "red_cells" => Ok(BloodComponent::RedCells),
            "platelets" => Ok(BloodComponent::Platelets),
            "plasma" => Ok(BloodComponent::Plasma),
            _ => Err(anyhow::anyhow!("Invalid blood component: {}", s)),
        }
    }
}

impl std::fmt::Display for BloodComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_blood_type_round_trip() {
        for raw in BLOOD_TYPES {
            let parsed = BloodType::from_str(raw).unwrap();
            assert_eq!(parsed.as_str(), *raw);
        }
    }

    #[test]
    fn test_blood_type_rejects_unknown() {
        assert!(BloodType::from_str("C+").is_err());
        assert!(BloodType::from_str("a+").is_err());
        assert!(BloodType::from_str("").is_err());
    }

    #[test]
    fn test_blood_component_round_trip() {
        for raw in BLOOD_COMPONENTS {
            let parsed = BloodComponent::from_str(raw).unwrap();
            assert_eq!(parsed.as_str(), *raw);
        }
    }

    #[test]
    fn test_blood_component_rejects_unknown() {
        assert!(BloodComponent::from_str("serum").is_err());
        assert!(BloodComponent::from_str("RED_CELLS").is_err());
    }

    #[test]
    fn test_serde_uses_storage_form() {
        let json = serde_json::to_string(&BloodType::AbNegative).unwrap();
        assert_eq!(json, r#""AB-""#);

        let json = serde_json::to_string(&BloodComponent::WholeBlood).unwrap();
        assert_eq!(json, r#""whole_blood""#);

        let parsed: BloodType = serde_json::from_str(r#""O+""#).unwrap();
        assert_eq!(parsed, BloodType::OPositive);
    }
}
