use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Kind of vehicle occupying a slot.
///
/// Wire form is kebab-case (`e-bike`); parsing ignores ASCII case.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum VehicleType {
    Motorcycle,
    Car,
    Bike,
    EBike,
    Truck,
}

impl VehicleType {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Motorcycle => "Motorcycle",
            Self::Car => "Car",
            Self::Bike => "Bike",
            Self::EBike => "E-Bike",
            Self::Truck => "Truck",
        }
    }

    pub fn glyph(self) -> &'static str {
        match self {
            Self::Motorcycle => "🏍",
            Self::Car => "🚗",
            Self::Bike => "🚴",
            Self::EBike => "🛴",
            Self::Truck => "🚚",
        }
    }
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn wire_names_are_kebab_case() {
        let names: Vec<String> = VehicleType::iter().map(|v| v.to_string()).collect();
        assert_eq!(names, ["motorcycle", "car", "bike", "e-bike", "truck"]);
    }

    #[test]
    fn parse_ignores_case() {
        assert_eq!("E-Bike".parse::<VehicleType>().ok(), Some(VehicleType::EBike));
        assert_eq!("TRUCK".parse::<VehicleType>().ok(), Some(VehicleType::Truck));
        assert!("bus".parse::<VehicleType>().is_err());
    }
}
