//! Command grouping against a mixed fixture set.
//!
//! The fixture set holds one lamp per type and color mode, each in a dim,
//! matching and off variant. Names carry no whitespace, so every fixture is
//! its own logical group.

use std::time::Duration;

use hueflux::color::conversion::rgb_to_hsv;
use hueflux::color::{Brightness, ColorTemperature};
use hueflux::common::constants::MAX_WHITE_AMBIANCE_COLOR_TEMPERATURE;
use hueflux::lights::{
    ColorMode, CommandGroups, LightChange, LightCommandGrouper, LightSnapshot, LightType,
};

const DIM: i32 = 8;
const MATCHES: i32 = 128;
const TRANSITION: Duration = Duration::from_secs(60);

fn current_temperature() -> ColorTemperature {
    ColorTemperature::new(MAX_WHITE_AMBIANCE_COLOR_TEMPERATURE)
}

fn fixture(
    name: &str,
    light_type: LightType,
    on: bool,
    brightness: i32,
    color_mode: ColorMode,
) -> LightSnapshot {
    let current = current_temperature();
    let mut light = LightSnapshot::new(name, name, light_type);
    light.on = on;
    light.brightness = Brightness::new(brightness);
    light.color_mode = color_mode;

    match color_mode {
        ColorMode::Ct => light.color_temperature = Some(current),
        ColorMode::Xy => light.color_xy = Some(current.xy()),
        ColorMode::Hs => {
            let hsv = rgb_to_hsv(current.rgb());
            light.hue = Some(hsv.h.round() as u16);
            light.saturation = Some((hsv.s * 254.0).round() as u8);
        }
        ColorMode::None if light_type == LightType::WhiteAmbiance => {
            light.color_temperature = Some(current)
        }
        ColorMode::None => {}
    }
    light
}

fn all_light_styles() -> Vec<LightSnapshot> {
    use ColorMode::*;
    use LightType::*;

    vec![
        fixture("WhiteOnly-Dim", WhiteOnly, true, DIM, None),
        fixture("WhiteOnly-Matches", WhiteOnly, true, MATCHES, None),
        fixture("WhiteOnly-Off", WhiteOnly, false, 0, None),
        fixture("WhiteAmbiance-Dim", WhiteAmbiance, true, DIM, None),
        fixture("WhiteAmbiance-Matches", WhiteAmbiance, true, MATCHES, None),
        fixture("WhiteAmbiance-Off", WhiteAmbiance, false, MATCHES, None),
        fixture("ColorCT-Dim", Color, true, DIM, Ct),
        fixture("ColorCT-Matches", Color, true, MATCHES, Ct),
        fixture("ColorCT-Off", Color, false, MATCHES, Ct),
        fixture("ColorXY-Dim", Color, true, DIM, Xy),
        fixture("ColorXY-Matches", Color, true, MATCHES, Xy),
        fixture("ColorXY-Off", Color, false, MATCHES, Xy),
        fixture("ColorHS-Dim", Color, true, DIM, Hs),
        fixture("ColorHS-Matches", Color, true, MATCHES, Hs),
        fixture("ColorHS-Off", Color, false, MATCHES, Hs),
    ]
}

fn ambiance(name: &str, brightness: i32) -> LightSnapshot {
    fixture(name, LightType::WhiteAmbiance, true, brightness, ColorMode::Ct)
}

fn group(
    lights: &[LightSnapshot],
    target_temp: ColorTemperature,
    target_brightness: i32,
    last_known: i32,
) -> CommandGroups {
    LightCommandGrouper::default().group(
        lights,
        target_temp,
        Brightness::new(target_brightness),
        Brightness::new(last_known),
        TRANSITION,
    )
}

fn ids(groups: &CommandGroups, change: LightChange) -> Vec<String> {
    let mut ids = groups
        .get(&change)
        .unwrap_or_else(|| panic!("no group for {change:?}"))
        .to_vec();
    ids.sort();
    ids
}

#[test]
fn test_all_light_styles_no_change() {
    let groups = group(&all_light_styles(), current_temperature(), MATCHES, MATCHES);
    assert!(groups.is_empty(), "unexpected commands: {groups:?}");
}

#[test]
fn test_all_light_styles_brightness_change() {
    let groups = group(&all_light_styles(), current_temperature(), DIM, MATCHES);

    assert_eq!(groups.len(), 1);
    assert_eq!(
        ids(&groups, LightChange::Brightness(Brightness::new(DIM))),
        [
            "ColorCT-Matches",
            "ColorHS-Matches",
            "ColorXY-Matches",
            "WhiteAmbiance-Matches",
            "WhiteOnly-Matches",
        ]
    );
}

#[test]
fn test_temperature_change_within_white_ambiance_range() {
    let target = ColorTemperature::new(MAX_WHITE_AMBIANCE_COLOR_TEMPERATURE - 5);
    let groups = group(&all_light_styles(), target, MATCHES, MATCHES);

    assert_eq!(groups.len(), 1);
    assert_eq!(
        ids(&groups, LightChange::Temperature(target)),
        [
            "ColorCT-Dim",
            "ColorCT-Matches",
            "ColorXY-Dim",
            "ColorXY-Matches",
            "WhiteAmbiance-Dim",
            "WhiteAmbiance-Matches",
        ]
    );
}

#[test]
fn test_temperature_change_outside_white_ambiance_range() {
    let target = ColorTemperature::new(MAX_WHITE_AMBIANCE_COLOR_TEMPERATURE + 5);
    let groups = group(&all_light_styles(), target, MATCHES, MATCHES);

    assert_eq!(groups.len(), 1);
    assert_eq!(
        ids(&groups, LightChange::Temperature(target)),
        [
            "ColorCT-Dim",
            "ColorCT-Matches",
            "ColorXY-Dim",
            "ColorXY-Matches"
        ]
    );
}

#[test]
fn test_everything_changes() {
    let target = ColorTemperature::new(MAX_WHITE_AMBIANCE_COLOR_TEMPERATURE - 5);
    let brightness = Brightness::new(25);
    let groups = group(&all_light_styles(), target, 25, MATCHES);

    assert_eq!(groups.len(), 3);
    assert_eq!(
        ids(&groups, LightChange::Brightness(brightness)),
        ["ColorHS-Matches", "WhiteOnly-Matches"]
    );
    assert_eq!(
        ids(&groups, LightChange::Temperature(target)),
        ["ColorCT-Dim", "ColorXY-Dim", "WhiteAmbiance-Dim"]
    );
    assert_eq!(
        ids(&groups, LightChange::TemperatureAndBrightness(target, brightness)),
        ["ColorCT-Matches", "ColorXY-Matches", "WhiteAmbiance-Matches"]
    );
    assert_eq!(groups.light_count(), 8);
}

#[test]
fn test_group_without_last_known_match_takes_highest_brightness() {
    let lights = [
        ambiance("Test 6", 0),
        ambiance("Test 4", MATCHES - 4),
        ambiance("Test 5", 0),
        ambiance("Test 3", MATCHES + 2),
    ];
    let groups = group(&lights, current_temperature(), MATCHES, MATCHES);

    assert_eq!(groups.len(), 1);
    assert_eq!(
        ids(&groups, LightChange::Brightness(Brightness::new(MATCHES + 2))),
        ["Test 4", "Test 5", "Test 6"]
    );
}

#[test]
fn test_group_following_schedule_converges_on_target() {
    let lights = [
        ambiance("Test 4", MATCHES + 2),
        ambiance("Test 5", 0),
        ambiance("Test 2", MATCHES),
        ambiance("Test 3", MATCHES - 4),
    ];
    let groups = group(&lights, current_temperature(), MATCHES, MATCHES);

    assert_eq!(groups.len(), 1);
    assert_eq!(
        ids(&groups, LightChange::Brightness(Brightness::new(MATCHES))),
        ["Test 3", "Test 4", "Test 5"]
    );
}

#[test]
fn test_group_with_repeated_last_known_converges_on_target() {
    let lights = [
        ambiance("Test 4", MATCHES + 2),
        ambiance("Test 1", MATCHES),
        ambiance("Test 5", 0),
        ambiance("Test 2", MATCHES),
        ambiance("Test 3", MATCHES - 4),
    ];
    let groups = group(&lights, current_temperature(), MATCHES, MATCHES);

    assert_eq!(groups.len(), 1);
    assert_eq!(
        ids(&groups, LightChange::Brightness(Brightness::new(MATCHES))),
        ["Test 3", "Test 4", "Test 5"]
    );
}

#[test]
fn test_group_mismatch_moves_every_member() {
    let lights = [ambiance("Test 1", 145), ambiance("Test 2", 147)];
    let groups = group(&lights, current_temperature(), 146, 145);

    assert_eq!(groups.len(), 1);
    assert_eq!(
        ids(&groups, LightChange::Brightness(Brightness::new(146))),
        ["Test 1", "Test 2"]
    );
}

#[test]
fn test_single_light_follows_schedule_from_any_brightness() {
    let target = Brightness::new(MATCHES);

    for current in [0, 1, 2, 128, 129, 246, 247, 248, 254, 255] {
        let groups = group(&[ambiance("Test", current)], current_temperature(), MATCHES, current);

        if Brightness::new(current) == target {
            assert!(groups.is_empty(), "brightness {current} should be left alone");
        } else {
            assert_eq!(groups.len(), 1, "brightness {current}");
            assert_eq!(
                ids(&groups, LightChange::Brightness(target)),
                ["Test"],
                "brightness {current}"
            );
        }
    }
}

#[test]
fn test_user_adjusted_light_keeps_brightness_until_saturated() {
    for current in [1, 2, 129, 246] {
        let groups = group(&[ambiance("Test", current)], current_temperature(), 60, MATCHES);
        assert!(groups.is_empty(), "brightness {current} is user-adjusted");
    }

    for current in [0, 247, 254] {
        let groups = group(&[ambiance("Test", current)], current_temperature(), 60, MATCHES);
        assert_eq!(
            ids(&groups, LightChange::Brightness(Brightness::new(60))),
            ["Test"],
            "brightness {current}"
        );
    }
}

#[test]
fn test_boundary_scan_against_scheduler_brightness() {
    let target = Brightness::new(MATCHES);

    for current in [0, 1, 2, 128, 129, 246, 247, 248, 254, 255] {
        let groups = group(&[ambiance("Test", current)], current_temperature(), MATCHES, MATCHES);
        let expect_change = current == 0 || current >= 247;

        if expect_change {
            assert_eq!(
                ids(&groups, LightChange::Brightness(target)),
                ["Test"],
                "brightness {current}"
            );
        } else {
            assert!(groups.is_empty(), "brightness {current} should be left alone");
        }
    }
}

fn xy_light(name: &str, xy: [f64; 2]) -> LightSnapshot {
    let mut light = fixture(name, LightType::Color, true, MATCHES, ColorMode::Xy);
    light.color_xy = Some(xy);
    light
}

// Offset from the target chromaticity along x only
fn xy_offset_by(diff: f64) -> [f64; 2] {
    let [x, y] = current_temperature().xy();
    [x + diff, y]
}

#[test]
fn test_vivid_xy_color_is_never_touched() {
    let lights = [xy_light("Strip", [0.15, 0.06])];
    let groups = group(&lights, current_temperature(), MATCHES, MATCHES);
    assert!(groups.is_empty(), "unexpected commands: {groups:?}");
}

#[test]
fn test_xy_difference_band_is_exclusive() {
    let target = current_temperature();

    for diff in [0.0, 0.0005, 0.0009, 0.1501, 0.2, 0.5] {
        let groups = group(&[xy_light("Strip", xy_offset_by(diff))], target, MATCHES, MATCHES);
        assert!(groups.is_empty(), "diff {diff} should be left alone");
    }

    for diff in [0.0011, 0.01, 0.1, 0.1499] {
        let groups = group(&[xy_light("Strip", xy_offset_by(diff))], target, MATCHES, MATCHES);
        assert_eq!(
            ids(&groups, LightChange::Temperature(target)),
            ["Strip"],
            "diff {diff}"
        );
    }
}
