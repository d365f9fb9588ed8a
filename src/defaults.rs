use crate::model::Offset;

/// Number of rungs on every axis.
pub const LEVEL_COUNT: usize = 5;
pub const MIN_VALUE: f64 = 1.0;
pub const MAX_VALUE: f64 = LEVEL_COUNT as f64;

/// Edge length of the editor surface in pixels.
pub const SURFACE_SIZE: f64 = 400.0;

pub const CONFIG_FILE_NAME: &str = "ladder-config.json";
pub const IMAGE_FILE_NAME: &str = "ladder-chart.png";

pub const TOP_LABELS: [&str; 5] = ["Technology", "System", "People", "Process", "Influence"];

pub const VALUES: [f64; 5] = [3.0, 4.0, 2.0, 5.0, 3.0];

pub const LEVEL_LABELS: [[&str; LEVEL_COUNT]; 5] = [
    ["Adopts", "Specializes", "Evangelizes", "Masters", "Creates"],
    ["Enhances", "Designs", "Owns", "Evolves", "Leads"],
    ["Learns", "Supports", "Mentors", "Coordinates", "Manages"],
    ["Follows", "Enforces", "Challenges", "Adjusts", "Defines"],
    ["Subsystem", "Team", "Multiple Teams", "Company", "Community"],
];

const fn off(x: f64, y: f64) -> Offset {
    Offset { x, y }
}

pub const TOP_LABEL_OFFSETS: [Offset; 5] = [
    off(-3.0, -16.0),
    off(39.3971488713305, 0.33126291998991064),
    off(3.145231559845172, 15.66873708001009),
    off(-3.145231559845172, 13.66873708001009),
    off(-41.3971488713305, -0.6687370800101462),
];

pub const LEVEL_LABEL_OFFSETS: [[Offset; LEVEL_COUNT]; 5] = [
    [
        off(28.0, 13.199999999999989),
        off(32.0, 11.199999999999989),
        off(36.0, 7.199999999999989),
        off(23.0, 3.200000000000017),
        off(22.0, 1.200000000000017),
    ],
    [
        off(0.914358496049374, 18.34953415699772),
        off(1.4805499746044575, 16.238077976996067),
        off(-1.953258546840459, 15.126621796994357),
        off(1.6129329317146244, 14.015165616992704),
        off(3.179124410269708, 12.903709436990994),
    ],
    [
        off(-21.392322899034866, -4.949534156997743),
        off(-29.201450972393957, -0.8380779769960327),
        off(-23.010579045753104, 3.2733782030056773),
        off(-29.819707119112252, 3.3848343830072736),
        off(-20.6288351924714, 7.4962905630089836),
    ],
    [
        off(-17.607677100965134, -5.949534156997743),
        off(-21.798549027606043, -4.838077976996033),
        off(-29.989420954246896, -5.726621796994323),
        off(-21.180292880887748, -0.6151656169927264),
        off(17.6288351924714, 14.496290563008984),
    ],
    [
        off(9.085641503950626, -10.65046584300228),
        off(-2.4805499746044575, -7.76192202300399),
        off(17.95325854684046, -10.873378203005643),
        off(15.387067068285404, -14.984834383007353),
        off(10.82087558973032, -15.096290563009006),
    ],
];

/// Placeholder row shown for an axis whose level labels are missing or malformed.
pub fn fallback_level_labels() -> Vec<String> {
    (1..=LEVEL_COUNT).map(|i| format!("Level {}", i)).collect()
}

/// Clamps to `[MIN_VALUE, MAX_VALUE]` and rounds to the nearest tenth.
pub fn normalize_value(raw: f64) -> f64 {
    if raw.is_nan() {
        return MIN_VALUE;
    }
    let rounded = (raw * 10.0).round() / 10.0;
    rounded.clamp(MIN_VALUE, MAX_VALUE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn seed_tables_have_matching_shapes() {
        assert_eq!(TOP_LABELS.len(), VALUES.len());
        assert_eq!(LEVEL_LABELS.len(), TOP_LABELS.len());
        assert_eq!(TOP_LABEL_OFFSETS.len(), TOP_LABELS.len());
        assert_eq!(LEVEL_LABEL_OFFSETS.len(), TOP_LABELS.len());
    }

    #[test]
    fn normalize_clamps_and_rounds() {
        assert_eq!(normalize_value(117.0), 5.0);
        assert_eq!(normalize_value(-3.0), 1.0);
        assert_eq!(normalize_value(3.04), 3.0);
        assert_eq!(normalize_value(3.06), 3.1);
        assert_eq!(normalize_value(f64::NAN), 1.0);
        assert_eq!(normalize_value(f64::INFINITY), 5.0);
    }

    #[test]
    fn fallback_row_is_numbered_from_one() {
        assert_eq!(
            fallback_level_labels(),
            vec!["Level 1", "Level 2", "Level 3", "Level 4", "Level 5"]
        );
    }

    proptest! {
        #[test]
        fn normalized_value_stays_in_range_with_one_decimal(raw in -1.0e6f64..1.0e6) {
            let v = normalize_value(raw);
            prop_assert!((MIN_VALUE..=MAX_VALUE).contains(&v));
            prop_assert!(((v * 10.0).round() - v * 10.0).abs() < 1e-9);
        }
    }
}
