use opsguard_core::ScenarioTiming;
use opsguard_live::REFRESH_PERIOD;
use std::time::Duration;

pub const BOOT_DELAY: Duration = Duration::from_millis(800);
/// Shortest time the finished report stays up before the loop resets it.
pub const MIN_REPORT_HOLD: Duration = Duration::from_secs(5);
/// Upper bound on how long the event loop sleeps between redraws.
pub const MAX_IDLE_WAIT: Duration = Duration::from_millis(250);

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DashboardConfig {
    pub loop_period: Duration,
    pub boot_delay: Duration,
    pub refresh_period: Duration,
    pub live_enabled: bool,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            loop_period: ScenarioTiming::default().loop_period,
            boot_delay: BOOT_DELAY,
            refresh_period: REFRESH_PERIOD,
            live_enabled: true,
        }
    }
}

impl DashboardConfig {
    /// CLI flags win over env, env over defaults.
    pub fn resolve(loop_secs: Option<u64>, no_live: bool) -> Self {
        Self::from_sources(
            loop_secs,
            no_live,
            std::env::var("OPSGUARD_LOOP_SECS").ok().as_deref(),
            std::env::var("OPSGUARD_LIVE").ok().as_deref(),
        )
    }

    fn from_sources(
        loop_secs: Option<u64>,
        no_live: bool,
        env_loop: Option<&str>,
        env_live: Option<&str>,
    ) -> Self {
        let defaults = Self::default();
        let loop_period = loop_secs
            .or_else(|| env_loop.and_then(|value| value.trim().parse().ok()))
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.loop_period);
        let live_enabled =
            !no_live && env_live.and_then(parse_bool_flag).unwrap_or(defaults.live_enabled);
        Self {
            loop_period,
            live_enabled,
            ..defaults
        }
    }

    /// Default phase offsets with this loop period, stretched so the
    /// finished report is held for at least [`MIN_REPORT_HOLD`].
    pub fn timing(&self) -> ScenarioTiming {
        let timing = ScenarioTiming::default();
        let period = self
            .loop_period
            .max(timing.report_complete + MIN_REPORT_HOLD);
        timing.with_loop_period(period)
    }
}

pub fn parse_bool_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

pub fn log_to_stdout() -> bool {
    std::env::var("OPSGUARD_LOG_STDOUT")
        .ok()
        .and_then(|value| parse_bool_flag(&value))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use opsguard_core::orchestrator::RESOLVED_BANNER;
    use opsguard_core::{ManualClock, Orchestrator, Scenario, ScenarioPhase, ViewState};

    #[test]
    fn parse_bool_flag_accepts_common_values() {
        assert_eq!(parse_bool_flag("1"), Some(true));
        assert_eq!(parse_bool_flag(" ON "), Some(true));
        assert_eq!(parse_bool_flag("no"), Some(false));
        assert_eq!(parse_bool_flag("maybe"), None);
    }

    #[test]
    fn cli_flags_override_env() {
        let config = DashboardConfig::from_sources(Some(45), true, Some("90"), Some("1"));
        assert_eq!(config.loop_period, Duration::from_secs(45));
        assert!(!config.live_enabled);
    }

    #[test]
    fn env_applies_when_flags_absent() {
        let config = DashboardConfig::from_sources(None, false, Some("90"), Some("off"));
        assert_eq!(config.loop_period, Duration::from_secs(90));
        assert!(!config.live_enabled);

        let fallback = DashboardConfig::from_sources(None, false, Some("zero"), Some("?"));
        assert_eq!(fallback, DashboardConfig::default());
    }

    #[test]
    fn short_loop_still_shows_the_finished_report() {
        let config = DashboardConfig::from_sources(Some(4), false, None, None);
        let timing = config.timing();
        assert_eq!(timing.loop_period, Duration::from_secs(15));
        assert_eq!(timing.validate(), Ok(()));

        let clock = ManualClock::new();
        let mut orch =
            Orchestrator::new(Scenario::payment_outage(), timing, clock.clone()).unwrap();
        let mut view = ViewState::default();
        orch.start(&mut view);

        let mut phases = Vec::new();
        for _ in 0..300 {
            clock.advance_ms(100);
            orch.poll(&mut view);
            if let Some(phase) = orch.phase() {
                if phases.last() != Some(&phase) {
                    phases.push(phase);
                }
            }
            if orch.phase() == Some(ScenarioPhase::ReportComplete) {
                assert_eq!(view.banner, RESOLVED_BANNER);
            }
        }
        let completions = phases
            .iter()
            .filter(|phase| **phase == ScenarioPhase::ReportComplete)
            .count();
        assert_eq!(completions, 2);
    }

    #[test]
    fn long_loop_is_kept() {
        let config = DashboardConfig::from_sources(Some(60), false, None, None);
        assert_eq!(config.timing().loop_period, Duration::from_secs(60));
    }
}
