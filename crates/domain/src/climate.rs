//! Climate value types: the abstract model a climate entity exposes.
//!
//! These are vendor-neutral: integrations map their own device codes onto
//! them. Each enum has a stable lowercase wire name used for attributes,
//! service-call payloads and serde.

use std::fmt;
use std::ops::BitOr;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A climate value could not be parsed from its wire name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} {value:?}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

macro_rules! wire_enum {
    (
        $(#[doc = $doc:expr])*
        $name:ident, $kind:literal {
            $($(#[$vmeta:meta])* $variant:ident => $wire:literal),+ $(,)?
        }
    ) => {
        $(#[doc = $doc])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $wire)] $variant),+
        }

        impl $name {
            /// Every value, in the order the entity advertises them.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            #[must_use]
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = UnknownVariant;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(UnknownVariant {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

wire_enum!(
    /// Operating mode of the unit.
    HvacMode, "hvac mode" {
        #[default]
        Off => "off",
        FanOnly => "fan_only",
        Cool => "cool",
        Dry => "dry",
        Heat => "heat",
        Auto => "auto",
    }
);

wire_enum!(
    /// Indoor fan speed.
    FanMode, "fan mode" {
        #[default]
        Auto => "auto",
        High => "high",
        MediumHigh => "medium_high",
        Medium => "medium",
        LowMedium => "low_medium",
        Low => "low",
        Quiet => "quiet",
    }
);

wire_enum!(
    /// Behaviour modifier layered on top of the HVAC mode.
    PresetMode, "preset mode" {
        #[default]
        None => "none",
        /// Economy: reduced power draw.
        Eco => "eco",
        /// Power chill / turbo.
        Boost => "boost",
    }
);

wire_enum!(
    /// Air vane oscillation.
    SwingMode, "swing mode" {
        #[default]
        Off => "off",
        Vertical => "vertical",
    }
);

wire_enum!(
    TemperatureUnit, "temperature unit" {
        #[default]
        Celsius => "°C",
    }
);

/// Bit set of optional climate capabilities.
///
/// Bit values match the conventional climate-entity feature flags so they
/// can be exposed unchanged as an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClimateFeatures(u32);

impl ClimateFeatures {
    pub const TARGET_TEMPERATURE: Self = Self(1);
    pub const FAN_MODE: Self = Self(8);
    pub const PRESET_MODE: Self = Self(16);
    pub const SWING_MODE: Self = Self(32);

    #[must_use]
    pub fn bits(self) -> u32 {
        self.0
    }

    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ClimateFeatures {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}
