//! Configuration validation.
//!
//! Rejects values the scheduler cannot work with before anything is built
//! from them.

use anyhow::Result;
use std::collections::HashSet;

use super::Config;
use crate::common::constants::*;

pub fn validate_config(config: &Config) -> Result<()> {
    if let Some(lat) = config.latitude
        && !(MINIMUM_LATITUDE..=MAXIMUM_LATITUDE).contains(&lat)
    {
        anyhow::bail!("latitude must be between -90 and 90 degrees (got {})", lat);
    }

    if let Some(lon) = config.longitude
        && !(MINIMUM_LONGITUDE..=MAXIMUM_LONGITUDE).contains(&lon)
    {
        anyhow::bail!(
            "longitude must be between -180 and 180 degrees (got {})",
            lon
        );
    }

    config.stop_time()?;

    for (name, temp) in [
        ("sunrise_temp", config.sunrise_temp),
        ("solar_noon_temp", config.solar_noon_temp),
        ("sunset_temp", config.sunset_temp),
        ("stop_temp", config.stop_temp),
    ] {
        if let Some(temp) = temp
            && !(MINIMUM_TEMP..=MAXIMUM_TEMP).contains(&temp)
        {
            anyhow::bail!(
                "{} ({}) must be between {} and {} Kelvin",
                name,
                temp,
                MINIMUM_TEMP,
                MAXIMUM_TEMP
            );
        }
    }

    if let Some(duration) = config.transition_duration
        && !(MINIMUM_TRANSITION_DURATION..=MAXIMUM_TRANSITION_DURATION).contains(&duration)
    {
        anyhow::bail!(
            "transition_duration ({} seconds) must be between {} and {} seconds",
            duration,
            MINIMUM_TRANSITION_DURATION,
            MAXIMUM_TRANSITION_DURATION
        );
    }

    if let Some(interval) = config.min_update_interval
        && !(MINIMUM_UPDATE_INTERVAL..=MAXIMUM_UPDATE_INTERVAL).contains(&interval)
    {
        anyhow::bail!(
            "min_update_interval ({} seconds) must be between {} and {} seconds",
            interval,
            MINIMUM_UPDATE_INTERVAL,
            MAXIMUM_UPDATE_INTERVAL
        );
    }

    validate_brightness(config)?;
    validate_light_overrides(config)?;

    Ok(())
}

fn validate_brightness(config: &Config) -> Result<()> {
    let policy = config.brightness_policy();

    for (name, value) in [
        ("min_brightness", policy.min_brightness),
        ("max_brightness", policy.max_brightness),
    ] {
        if i32::from(value) > MAX_BRIGHTNESS {
            anyhow::bail!(
                "{} ({}) must be between {} and {}",
                name,
                value,
                MIN_BRIGHTNESS,
                MAX_BRIGHTNESS
            );
        }
    }

    if policy.min_brightness > policy.max_brightness {
        anyhow::bail!(
            "min_brightness ({}) must not exceed max_brightness ({})",
            policy.min_brightness,
            policy.max_brightness
        );
    }

    for (name, level) in [
        ("min_light_level", policy.min_light_level),
        ("max_light_level", policy.max_light_level),
    ] {
        if !level.is_finite() || level < 0.0 {
            anyhow::bail!("{} ({}) must be a non-negative number", name, level);
        }
    }

    if policy.min_light_level >= policy.max_light_level {
        anyhow::bail!(
            "min_light_level ({}) must be below max_light_level ({})",
            policy.min_light_level,
            policy.max_light_level
        );
    }

    Ok(())
}

fn validate_light_overrides(config: &Config) -> Result<()> {
    let mut seen = HashSet::new();
    for light in config.lights.iter().flatten() {
        let name = light.name.trim();
        if name.is_empty() {
            anyhow::bail!("[[lights]] entries must have a non-empty name");
        }
        if !seen.insert(name.to_lowercase()) {
            anyhow::bail!("Light '{}' has more than one [[lights]] override", name);
        }
    }
    Ok(())
}
