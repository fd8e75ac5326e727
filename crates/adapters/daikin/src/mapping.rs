//! Bidirectional lookup tables between Daikin device codes and the climate
//! value types.

use acbridge_domain::climate::{FanMode, HvacMode, PresetMode, SwingMode};

const HVAC_CODES: [(HvacMode, i64); 6] = [
    (HvacMode::Off, 0),
    (HvacMode::Auto, 1),
    (HvacMode::Dry, 2),
    (HvacMode::Cool, 3),
    (HvacMode::Heat, 4),
    (HvacMode::FanOnly, 6),
];

const FAN_CODES: [(FanMode, i64); 7] = [
    (FanMode::Auto, 17),
    (FanMode::High, 7),
    (FanMode::MediumHigh, 6),
    (FanMode::Medium, 5),
    (FanMode::LowMedium, 4),
    (FanMode::Low, 3),
    (FanMode::Quiet, 18),
];

/// Device mode code to HVAC mode; unknown codes read as off.
#[must_use]
pub fn hvac_mode_from_code(code: i64) -> HvacMode {
    HVAC_CODES
        .iter()
        .find(|(_, c)| *c == code)
        .map_or(HvacMode::Off, |(mode, _)| *mode)
}

#[must_use]
pub fn hvac_mode_to_code(mode: HvacMode) -> i64 {
    HVAC_CODES
        .iter()
        .find(|(m, _)| *m == mode)
        .map_or(0, |(_, code)| *code)
}

/// Device fan code to fan mode; unknown or absent codes read as auto.
#[must_use]
pub fn fan_mode_from_code(code: Option<i64>) -> FanMode {
    code.and_then(|code| FAN_CODES.iter().find(|(_, c)| *c == code))
        .map_or(FanMode::Auto, |(mode, _)| *mode)
}

#[must_use]
pub fn fan_mode_to_code(mode: FanMode) -> i64 {
    FAN_CODES
        .iter()
        .find(|(m, _)| *m == mode)
        .map_or(17, |(_, code)| *code)
}

#[must_use]
pub fn swing_mode_from_flag(v_swing: Option<i64>) -> SwingMode {
    if v_swing == Some(1) {
        SwingMode::Vertical
    } else {
        SwingMode::Off
    }
}

#[must_use]
pub fn swing_mode_to_flag(mode: SwingMode) -> i64 {
    match mode {
        SwingMode::Vertical => 1,
        SwingMode::Off => 0,
    }
}

/// The `powerchill` / `econo` flag pair that encodes a preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetFlags {
    pub powerchill: i64,
    pub econo: i64,
}

/// Economy takes precedence over power chill when a unit reports both.
///
/// Command responses follow the same rule, unlike the vendor app, which lets
/// boost win there.
#[must_use]
pub fn preset_mode_from_flags(econo: Option<i64>, powerchill: Option<i64>) -> PresetMode {
    if econo == Some(1) {
        PresetMode::Eco
    } else if powerchill == Some(1) {
        PresetMode::Boost
    } else {
        PresetMode::None
    }
}

#[must_use]
pub fn preset_mode_to_flags(mode: PresetMode) -> PresetFlags {
    match mode {
        PresetMode::Eco => PresetFlags {
            powerchill: 0,
            econo: 1,
        },
        PresetMode::Boost => PresetFlags {
            powerchill: 1,
            econo: 0,
        },
        PresetMode::None => PresetFlags {
            powerchill: 0,
            econo: 0,
        },
    }
}
