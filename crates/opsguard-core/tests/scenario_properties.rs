use opsguard_core::orchestrator::{ANOMALY_BANNER, RESOLVED_BANNER, RESPONSE_BANNER};
use opsguard_core::report::ReportView;
use opsguard_core::surface::IDLE_BANNER;
use opsguard_core::{
    Agent, AgentStatus, BannerSeverity, CardKind, CardState, ConnectorStatus, ManualClock,
    Orchestrator, RenderSurface, RunState, Scenario, ScenarioPhase, ScenarioTiming, Service,
    TimelineEntry, ViewState, CONNECTOR_COUNT,
};
use std::time::Duration;

/// ViewState plus a log of every banner and timeline write.
#[derive(Default)]
struct RecordingSurface {
    view: ViewState,
    banners: Vec<String>,
    timeline_lengths: Vec<usize>,
}

impl RecordingSurface {
    fn banner_count(&self, text: &str) -> usize {
        self.banners.iter().filter(|b| b.as_str() == text).count()
    }
}

impl RenderSurface for RecordingSurface {
    fn render_services(&mut self, services: &[Service]) {
        self.view.render_services(services);
    }

    fn render_agents(&mut self, agents: &[Agent]) {
        self.view.render_agents(agents);
    }

    fn set_connector(&mut self, index: usize, status: ConnectorStatus) {
        self.view.set_connector(index, status);
    }

    fn render_timeline(&mut self, entries: &[TimelineEntry]) {
        self.timeline_lengths.push(entries.len());
        self.view.render_timeline(entries);
    }

    fn render_report(&mut self, report: &ReportView) {
        self.view.render_report(report);
    }

    fn set_banner(&mut self, text: &str, severity: BannerSeverity) {
        self.banners.push(text.to_string());
        self.view.set_banner(text, severity);
    }

    fn render_card(&mut self, kind: CardKind, card: &CardState) {
        self.view.render_card(kind, card);
    }

    fn set_card_detail(&mut self, kind: CardKind, detail: &str) {
        self.view.set_card_detail(kind, detail);
    }
}

fn orchestrator(clock: &ManualClock, loop_secs: u64) -> Orchestrator<ManualClock> {
    let timing = ScenarioTiming::default().with_loop_period(Duration::from_secs(loop_secs));
    Orchestrator::new(Scenario::payment_outage(), timing, clock.clone()).expect("valid timing")
}

fn advance_to(
    clock: &ManualClock,
    orch: &mut Orchestrator<ManualClock>,
    surface: &mut impl RenderSurface,
    at_ms: u64,
) {
    while clock_ms(clock) < at_ms {
        clock.advance_ms(100u64.min(at_ms - clock_ms(clock)));
        orch.poll(surface);
    }
}

fn clock_ms(clock: &ManualClock) -> u64 {
    use opsguard_core::Clock;
    clock.now().as_millis() as u64
}

fn assert_idle(view: &ViewState, scenario: &Scenario) {
    let idle = ViewState::idle(scenario);
    assert_eq!(view.services, scenario.healthy);
    assert!(view
        .agents
        .iter()
        .all(|agent| agent.status == AgentStatus::Waiting));
    assert_eq!(view.connectors, [ConnectorStatus::None; CONNECTOR_COUNT]);
    assert!(view.timeline.is_empty());
    assert!(view.report.is_placeholder());
    assert_eq!(view.banner, IDLE_BANNER);
    assert_eq!(view.banner_severity, BannerSeverity::Nominal);
    assert_eq!(view.cards, idle.cards);
}

#[test]
fn double_start_runs_each_phase_once() {
    let clock = ManualClock::new();
    let mut orch = orchestrator(&clock, 60);
    let mut surface = RecordingSurface::default();

    orch.start(&mut surface);
    orch.start(&mut surface);
    advance_to(&clock, &mut orch, &mut surface, 12_000);

    assert_eq!(surface.banner_count(ANOMALY_BANNER), 1);
    assert_eq!(surface.banner_count(RESPONSE_BANNER), 1);
    assert_eq!(surface.banner_count(RESOLVED_BANNER), 1);
    // timeline grows one entry at a time, never by two writers
    let growth: Vec<usize> = surface
        .timeline_lengths
        .iter()
        .copied()
        .filter(|len| *len > 0)
        .collect();
    assert!(growth.windows(2).all(|pair| pair[1] == pair[0] + 1));
}

#[test]
fn restart_resets_every_view_field() {
    let clock = ManualClock::new();
    let mut orch = orchestrator(&clock, 60);
    let mut view = ViewState::default();

    orch.start(&mut view);
    advance_to(&clock, &mut orch, &mut view, 20_000);
    assert_eq!(view.banner, RESOLVED_BANNER);
    assert!(!view.timeline.is_empty());

    orch.start(&mut view);
    assert_idle(&view, orch.scenario());
    assert_eq!(orch.phase(), Some(ScenarioPhase::Idle));

    // nothing from the abandoned run lands afterwards
    clock.advance_ms(2_900);
    orch.poll(&mut view);
    assert_idle(&view, orch.scenario());
}

#[test]
fn phases_fire_in_order_at_their_offsets() {
    let clock = ManualClock::new();
    let mut orch = orchestrator(&clock, 30);
    let mut view = ViewState::default();
    orch.start(&mut view);

    let expected = [
        (2_999, ScenarioPhase::Idle),
        (3_000, ScenarioPhase::AnomalyDetected),
        (5_000, ScenarioPhase::IncidentCreated),
        (7_000, ScenarioPhase::ImpactRevealed),
        (9_000, ScenarioPhase::ActionsTaken),
        (10_000, ScenarioPhase::ReportComplete),
        (29_999, ScenarioPhase::ReportComplete),
    ];
    for (at_ms, phase) in expected {
        advance_to(&clock, &mut orch, &mut view, at_ms);
        assert_eq!(orch.phase(), Some(phase), "at {at_ms}ms");
    }

    assert_eq!(view.services, orch.scenario().incident_roster);
    assert_eq!(view.card(CardKind::Services).value, "6/8");
    assert_eq!(view.card(CardKind::Incidents).detail, "CRITICAL: payment-service");
    assert_eq!(view.card(CardKind::Revenue).value, "-$12,450/hr");
    assert_eq!(view.card(CardKind::Revenue).detail, "Projected 4hr loss: $49,800");
    assert_eq!(view.card(CardKind::Mttr).value, "1m 42s");
    assert_eq!(view.card(CardKind::Mttr).detail, "vs 2.5hr industry avg");
    assert_eq!(view.banner_severity, BannerSeverity::Resolved);
    assert!(view.report.resolution.is_some());
}

#[test]
fn timeline_chain_stops_after_last_entry() {
    let clock = ManualClock::new();
    let mut orch = orchestrator(&clock, 60);
    let mut surface = RecordingSurface::default();
    orch.start(&mut surface);

    let total = orch.scenario().timeline.len();
    // first entry at 5.3s, last at 32.8s, completion step 2s later
    advance_to(&clock, &mut orch, &mut surface, 32_799);
    assert_eq!(orch.timeline_len(), total - 1);
    advance_to(&clock, &mut orch, &mut surface, 32_800);
    assert_eq!(orch.timeline_len(), total);
    assert!(orch.is_timeline_running());

    advance_to(&clock, &mut orch, &mut surface, 34_800);
    assert!(!orch.is_timeline_running());
    assert!(surface
        .view
        .agents
        .iter()
        .all(|agent| agent.status == AgentStatus::Completed));
    assert_eq!(surface.view.connectors, [ConnectorStatus::Completed; CONNECTOR_COUNT]);

    let writes = surface.timeline_lengths.len();
    advance_to(&clock, &mut orch, &mut surface, 59_900);
    assert_eq!(orch.timeline_len(), total);
    assert_eq!(surface.view.timeline.len(), total);
    assert_eq!(surface.timeline_lengths.len(), writes);
    assert!(surface.timeline_lengths.iter().all(|len| *len <= total));
}

#[test]
fn loop_restarts_every_period_with_bounded_timers() {
    let clock = ManualClock::new();
    let mut orch = orchestrator(&clock, 30);
    let mut view = ViewState::default();
    orch.start(&mut view);
    assert_eq!(orch.runs(), 1);

    let mut max_pending = orch.pending_timers();
    for cycle in 1..=20u64 {
        let restart = cycle * 30_000;
        advance_to(&clock, &mut orch, &mut view, restart - 100);
        assert_eq!(orch.phase(), Some(ScenarioPhase::ReportComplete));
        advance_to(&clock, &mut orch, &mut view, restart);
        assert_eq!(orch.runs(), cycle + 1);
        assert_eq!(orch.phase(), Some(ScenarioPhase::Idle));
        assert_idle(&view, orch.scenario());
        max_pending = max_pending.max(orch.pending_timers());
    }
    // one loop trigger, five phases, one timeline step
    assert!(max_pending <= 7);
    assert!(orch.is_running());
}

#[test]
fn stop_freezes_the_view() {
    let clock = ManualClock::new();
    let mut orch = orchestrator(&clock, 30);
    let mut view = ViewState::default();
    orch.start(&mut view);
    advance_to(&clock, &mut orch, &mut view, 8_000);

    orch.stop();
    assert_eq!(orch.state(), RunState::Halted);
    assert_eq!(orch.pending_timers(), 0);
    let frozen = view.clone();

    clock.advance(Duration::from_secs(120));
    assert_eq!(orch.poll(&mut view), 0);
    assert_eq!(view, frozen);
    assert_eq!(orch.phase(), Some(ScenarioPhase::ImpactRevealed));
    assert_eq!(orch.time_until_next(), None);
}

#[test]
fn start_after_stop_resumes_from_idle() {
    let clock = ManualClock::new();
    let mut orch = orchestrator(&clock, 30);
    let mut view = ViewState::default();
    orch.start(&mut view);
    advance_to(&clock, &mut orch, &mut view, 6_000);
    orch.stop();

    orch.start(&mut view);
    assert_idle(&view, orch.scenario());
    advance_to(&clock, &mut orch, &mut view, 9_000);
    assert_eq!(orch.phase(), Some(ScenarioPhase::AnomalyDetected));
    assert_eq!(view.banner, ANOMALY_BANNER);
}
