//! The scheduling loop.
//!
//! Each cycle reads the clock, looks up the target color temperature and
//! brightness, fetches fixture state from a bridge, sends one command per
//! distinct change, rewrites flux scenes, and then sleeps until the schedule
//! next moves by a whole unit. One loop runs per bridge; loops share nothing
//! except the schedule and the status sinks.

pub mod status;

use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, Local, Utc};
use std::sync::mpsc::Receiver;
use std::thread;
use std::time::Duration;

use crate::bridge::Bridge;
use crate::color::{Brightness, ColorTemperature};
use crate::lights::{BrightnessPolicy, LightCommandGrouper, plan_scene_updates};
use crate::schedule::{FluxSchedule, ScheduleError};
use crate::signals::{SignalMessage, fan_out};
use crate::time_source::{Clock, SleepOutcome};

pub use status::{AppliedState, FluxStatus, StatusFile, StatusHistory, StatusSink};

/// Outcome of a single cycle against one bridge.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    pub at: DateTime<Local>,
    pub color_temperature: ColorTemperature,
    pub brightness: Brightness,
    pub commands_sent: usize,
    pub lights_updated: usize,
    pub scenes_updated: usize,
    /// Bridge calls that failed this cycle.
    pub failures: usize,
    /// Time until the schedule next changes.
    pub planned_wake: Duration,
    /// Planned wake, raised to the minimum update interval.
    pub sleep: Duration,
}

pub struct FluxLoop<C: Clock> {
    schedule: FluxSchedule,
    grouper: LightCommandGrouper,
    policy: BrightnessPolicy,
    min_interval: Duration,
    light_level: Option<f64>,
    clock: C,
    sinks: Vec<Box<dyn StatusSink>>,
    debug_enabled: bool,
}

impl<C: Clock> FluxLoop<C> {
    pub fn new(
        schedule: FluxSchedule,
        grouper: LightCommandGrouper,
        policy: BrightnessPolicy,
        min_interval: Duration,
        clock: C,
    ) -> Self {
        Self {
            schedule,
            grouper,
            policy,
            min_interval,
            light_level: None,
            clock,
            sinks: Vec::new(),
            debug_enabled: false,
        }
    }

    /// Ambient light reading used for the brightness target.
    pub fn with_light_level(mut self, light_level: Option<f64>) -> Self {
        self.light_level = light_level;
        self
    }

    pub fn with_status_sink(mut self, sink: Box<dyn StatusSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn with_debug(mut self, debug_enabled: bool) -> Self {
        self.debug_enabled = debug_enabled;
        self
    }

    pub fn schedule(&self) -> &FluxSchedule {
        &self.schedule
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Run one cycle against `bridge`.
    ///
    /// Bridge failures are logged and counted in the report; only schedule
    /// errors abort the cycle.
    pub fn run_cycle(
        &self,
        bridge: &mut dyn Bridge,
        history: &mut StatusHistory,
    ) -> Result<CycleReport, ScheduleError> {
        self.cycle_at(self.clock.now(), bridge, history)
    }

    fn cycle_at(
        &self,
        now: DateTime<Local>,
        bridge: &mut dyn Bridge,
        history: &mut StatusHistory,
    ) -> Result<CycleReport, ScheduleError> {
        let color_temperature = ColorTemperature::new(self.schedule.color_temperature_at(&now)?);
        let brightness = self
            .policy
            .brightness_for(self.light_level, self.schedule.is_daytime(&now)?);
        let last_known = history.last_brightness().unwrap_or(brightness);
        let transition = self.schedule.config().transition;
        let name = bridge.name();

        let mut report = CycleReport {
            at: now,
            color_temperature,
            brightness,
            commands_sent: 0,
            lights_updated: 0,
            scenes_updated: 0,
            failures: 0,
            planned_wake: Duration::ZERO,
            sleep: Duration::ZERO,
        };

        match bridge.fetch_lights() {
            Ok(lights) => {
                let groups =
                    self.grouper
                        .group(&lights, color_temperature, brightness, last_known, transition);
                for (command, light_ids) in groups.iter() {
                    if self.debug_enabled {
                        log_pipe!();
                        log_debug!("[{name}] {:?} -> {}", command.change, light_ids.join(", "));
                    }
                    match bridge.send_command(&command, light_ids) {
                        Ok(()) => {
                            report.commands_sent += 1;
                            report.lights_updated += light_ids.len();
                        }
                        Err(e) => {
                            log_warning!("[{name}] Failed to send {:?}: {e:#}", command.change);
                            report.failures += 1;
                        }
                    }
                }
            }
            Err(e) => {
                log_warning!("[{name}] Failed to fetch lights: {e:#}");
                report.failures += 1;
            }
        }

        match bridge.fetch_scenes() {
            Ok(scenes) => {
                for update in plan_scene_updates(&scenes, color_temperature) {
                    match bridge.update_scene(&update) {
                        Ok(()) => report.scenes_updated += 1,
                        Err(e) => {
                            log_warning!(
                                "[{name}] Failed to update scene '{}': {e:#}",
                                update.scene_name
                            );
                            report.failures += 1;
                        }
                    }
                }
            }
            Err(e) => {
                log_warning!("[{name}] Failed to fetch scenes: {e:#}");
                report.failures += 1;
            }
        }

        let state = AppliedState {
            brightness,
            color_temperature,
            applied_at: now.with_timezone(&Utc),
        };
        history.record(state);
        for sink in &self.sinks {
            if let Err(e) = sink.publish(&name, &state) {
                log_warning!("[{name}] Failed to publish status: {e:#}");
            }
        }

        report.planned_wake = self.schedule.next_wake(&now)?;
        report.sleep = report.planned_wake.max(self.min_interval);
        Ok(report)
    }

    /// Cycle against `bridge` until shutdown is signalled or a simulation ends.
    pub fn run(
        &self,
        bridge: &mut dyn Bridge,
        signals: &Receiver<SignalMessage>,
    ) -> Result<StatusHistory> {
        self.run_on(&self.clock, bridge, signals)
    }

    fn run_on(
        &self,
        clock: &C,
        bridge: &mut dyn Bridge,
        signals: &Receiver<SignalMessage>,
    ) -> Result<StatusHistory> {
        let name = bridge.name();
        let mut history = StatusHistory::default();

        loop {
            let report = self
                .cycle_at(clock.now(), bridge, &mut history)
                .with_context(|| format!("Scheduling failed for bridge '{name}'"))?;
            self.log_report(&name, &report);

            match clock.sleep(report.sleep, signals) {
                SleepOutcome::Elapsed => {}
                SleepOutcome::Refreshed => {
                    log_block_start!("[{name}] Refresh requested");
                }
                SleepOutcome::Shutdown => {
                    log_block_start!("[{name}] Stopping");
                    break;
                }
                SleepOutcome::Ended => {
                    log_block_start!("[{name}] Simulation reached its end time");
                    break;
                }
            }
        }

        Ok(history)
    }

    /// Run one loop per bridge on its own thread until all of them stop.
    ///
    /// Every thread runs on its own fork of the clock.
    pub fn run_all(
        &self,
        bridges: Vec<Box<dyn Bridge>>,
        signals: Receiver<SignalMessage>,
    ) -> Result<()> {
        if bridges.is_empty() {
            anyhow::bail!("No bridges to schedule");
        }

        let receivers = fan_out(signals, bridges.len());
        thread::scope(|scope| {
            let handles: Vec<_> = bridges
                .into_iter()
                .zip(receivers)
                .map(|(mut bridge, receiver)| {
                    let clock = self.clock.fork();
                    scope.spawn(move || self.run_on(&clock, bridge.as_mut(), &receiver))
                })
                .collect();

            let mut first_error = None;
            for handle in handles {
                let result = handle
                    .join()
                    .unwrap_or_else(|_| Err(anyhow!("Scheduling thread panicked")));
                if let Err(e) = result {
                    log_error!("{e:#}");
                    first_error.get_or_insert(e);
                }
            }
            first_error.map_or(Ok(()), Err)
        })
    }

    fn log_report(&self, name: &str, report: &CycleReport) {
        log_block_start!(
            "[{name}] {} mired ({:.0}K), brightness {}",
            report.color_temperature.mired(),
            report.color_temperature.kelvin(),
            report.brightness.value()
        );
        log_decorated!(
            "{} command(s) for {} light(s), {} scene(s) updated",
            report.commands_sent,
            report.lights_updated,
            report.scenes_updated
        );
        if report.failures > 0 {
            log_decorated!("{} bridge call(s) failed", report.failures);
        }
        log_decorated!("Next update in {}", format_duration(report.sleep));

        if self.debug_enabled && report.sleep != report.planned_wake {
            log_pipe!();
            log_debug!(
                "Schedule changes in {}, held to the minimum interval",
                format_duration(report.planned_wake)
            );
        }
    }
}

/// Format a duration as `HH:MM:SS`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::{BridgeSnapshot, MockBridge, SnapshotFileBridge};
    use crate::lights::{
        ColorMode, LightChange, LightControls, LightSnapshot, LightType, Scene, SceneAction,
    };
    use crate::schedule::GeoTime;
    use crate::schedule::test_support::{config_with_stop, fixed_solar};
    use crate::time_source::{SimulatedClock, SystemClock, parse_datetime};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc::channel;

    fn schedule() -> FluxSchedule {
        FluxSchedule::new(
            GeoTime::new(0.0, 0.0),
            config_with_stop(22, 0),
            Box::new(fixed_solar()),
        )
        .unwrap()
    }

    fn policy() -> BrightnessPolicy {
        BrightnessPolicy {
            min_brightness: 64,
            max_brightness: 254,
            min_light_level: 3000.0,
            max_light_level: 25500.0,
        }
    }

    fn flux_loop<C: Clock>(clock: C) -> FluxLoop<C> {
        FluxLoop::new(
            schedule(),
            LightCommandGrouper::new(LightControls::new()),
            policy(),
            Duration::from_secs(240),
            clock,
        )
    }

    fn cool_light(id: &str) -> LightSnapshot {
        let mut light = LightSnapshot::new(id, format!("Light {id}"), LightType::Color);
        light.on = true;
        light.brightness = Brightness::MAX;
        light.color_mode = ColorMode::Ct;
        light.color_temperature = Some(ColorTemperature::new(154));
        light
    }

    fn simulated(start: &str, end: &str) -> SimulatedClock {
        SimulatedClock::new(parse_datetime(start).unwrap(), parse_datetime(end).unwrap())
    }

    #[test]
    fn test_run_cycle_sends_one_command_per_change() {
        let flux = flux_loop(simulated("2024-03-01 09:00:00", "2024-03-01 10:00:00"));
        let now = flux.clock().now();
        let target = ColorTemperature::new(flux.schedule().color_temperature_at(&now).unwrap());

        let mut bridge = MockBridge::new();
        bridge.expect_name().return_const("mock".to_string());
        bridge
            .expect_fetch_lights()
            .times(1)
            .returning(|| Ok(vec![cool_light("1"), cool_light("2")]));
        bridge
            .expect_send_command()
            .withf(move |command, ids| {
                command.change == LightChange::Temperature(target) && ids.len() == 2
            })
            .times(1)
            .returning(|_, _| Ok(()));
        bridge.expect_fetch_scenes().returning(|| Ok(Vec::new()));

        let mut history = StatusHistory::default();
        let report = flux.run_cycle(&mut bridge, &mut history).unwrap();

        assert_eq!(report.commands_sent, 1);
        assert_eq!(report.lights_updated, 2);
        assert_eq!(report.failures, 0);
        assert_eq!(report.brightness, Brightness::MAX);
        assert!(report.sleep >= Duration::from_secs(240));
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_run_cycle_survives_bridge_failures() {
        let flux = flux_loop(simulated("2024-03-01 09:00:00", "2024-03-01 10:00:00"));

        let mut bridge = MockBridge::new();
        bridge.expect_name().return_const("flaky".to_string());
        bridge
            .expect_fetch_lights()
            .returning(|| Err(anyhow!("connection refused")));
        bridge.expect_send_command().never();
        bridge
            .expect_fetch_scenes()
            .returning(|| Err(anyhow!("connection refused")));

        let mut history = StatusHistory::default();
        let report = flux.run_cycle(&mut bridge, &mut history).unwrap();

        assert_eq!(report.commands_sent, 0);
        assert_eq!(report.failures, 2);
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_run_cycle_updates_flux_scenes() {
        let flux = flux_loop(simulated("2024-03-01 09:00:00", "2024-03-01 10:00:00"));

        let mut bridge = MockBridge::new();
        bridge.expect_name().return_const("mock".to_string());
        bridge.expect_fetch_lights().returning(|| Ok(Vec::new()));
        bridge.expect_fetch_scenes().returning(|| {
            Ok(vec![
                Scene {
                    id: "a".into(),
                    name: "Evening FLUX".into(),
                    speed: None,
                    actions: vec![SceneAction {
                        target: "1".into(),
                        on: Some(true),
                        brightness: None,
                        color_temperature: Some(ColorTemperature::new(500)),
                    }],
                },
                Scene {
                    id: "b".into(),
                    name: "Reading".into(),
                    speed: None,
                    actions: Vec::new(),
                },
            ])
        });
        bridge
            .expect_update_scene()
            .withf(|update| update.scene_id == "a")
            .times(1)
            .returning(|_| Ok(()));

        let mut history = StatusHistory::default();
        let report = flux.run_cycle(&mut bridge, &mut history).unwrap();
        assert_eq!(report.scenes_updated, 1);
    }

    #[test]
    fn test_run_stops_on_pending_shutdown() {
        let flux = flux_loop(SystemClock);

        let mut bridge = MockBridge::new();
        bridge.expect_name().return_const("mock".to_string());
        bridge
            .expect_fetch_lights()
            .times(1)
            .returning(|| Ok(Vec::new()));
        bridge.expect_fetch_scenes().times(1).returning(|| Ok(Vec::new()));

        let (tx, rx) = channel();
        tx.send(SignalMessage::Shutdown).unwrap();

        let history = flux.run(&mut bridge, &rx).unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_run_simulated_day_converges() {
        let flux = flux_loop(simulated("2024-03-01 00:00:00", "2024-03-02 00:00:00"));
        let mut bridge = SnapshotFileBridge::from_snapshot(
            "dry-run",
            BridgeSnapshot {
                lights: vec![cool_light("1"), cool_light("2")],
                scenes: Vec::new(),
            },
            false,
        );
        let (_tx, rx) = channel();

        let history = flux.run(&mut bridge, &rx).unwrap();
        assert_eq!(history.len(), 3);

        let last = history.last().unwrap();
        for light in &bridge.snapshot().lights {
            assert_eq!(light.color_mode, ColorMode::Ct);
            assert_eq!(light.color_temperature, Some(last.color_temperature));
            assert_eq!(light.brightness, Brightness::MAX);
        }
    }

    #[test]
    fn test_run_all_requires_bridges() {
        let flux = flux_loop(SystemClock);
        let (_tx, rx) = channel();
        assert!(flux.run_all(Vec::new(), rx).is_err());
    }

    #[test]
    fn test_run_all_runs_each_bridge() {
        let flux = flux_loop(simulated("2024-03-01 09:00:00", "2024-03-01 09:30:00"));
        let bridges: Vec<Box<dyn Bridge>> = (0..2)
            .map(|i| {
                let mut bridge = MockBridge::new();
                bridge.expect_name().return_const(format!("bridge-{i}"));
                bridge.expect_fetch_lights().returning(|| Ok(Vec::new()));
                bridge.expect_fetch_scenes().returning(|| Ok(Vec::new()));
                Box::new(bridge) as Box<dyn Bridge>
            })
            .collect();
        let (_tx, rx) = channel();

        assert!(flux.run_all(bridges, rx).is_ok());
    }

    fn counting_bridge(name: &str, cycles: Arc<AtomicUsize>) -> MockBridge {
        let mut bridge = MockBridge::new();
        bridge.expect_name().return_const(name.to_string());
        bridge.expect_fetch_lights().returning(move || {
            cycles.fetch_add(1, Ordering::SeqCst);
            Ok(Vec::new())
        });
        bridge.expect_fetch_scenes().returning(|| Ok(Vec::new()));
        bridge
    }

    #[test]
    fn test_run_all_keeps_simulated_pace_per_bridge() {
        let single = Arc::new(AtomicUsize::new(0));
        let flux = flux_loop(simulated("2024-03-01 00:00:00", "2024-03-02 00:00:00"));
        let mut bridge = counting_bridge("solo", single.clone());
        let (_tx, rx) = channel();
        flux.run(&mut bridge, &rx).unwrap();

        let counts: Vec<_> = (0..3).map(|_| Arc::new(AtomicUsize::new(0))).collect();
        let flux = flux_loop(simulated("2024-03-01 00:00:00", "2024-03-02 00:00:00"));
        let bridges: Vec<Box<dyn Bridge>> = counts
            .iter()
            .enumerate()
            .map(|(i, count)| {
                Box::new(counting_bridge(&format!("bridge-{i}"), count.clone())) as Box<dyn Bridge>
            })
            .collect();
        let (_tx, rx) = channel();
        flux.run_all(bridges, rx).unwrap();

        let expected = single.load(Ordering::SeqCst);
        assert!(expected > 1);
        for count in &counts {
            assert_eq!(count.load(Ordering::SeqCst), expected);
        }
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(Duration::from_secs(0)), "00:00:00");
        assert_eq!(format_duration(Duration::from_secs(23408)), "06:30:08");
    }
}
