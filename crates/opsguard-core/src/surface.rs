use crate::report::ReportView;
use crate::scenario::Scenario;
use crate::{Agent, ConnectorStatus, RosterSummary, Service, TimelineEntry, CONNECTOR_COUNT};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BannerSeverity {
    #[default]
    Nominal,
    Critical,
    Resolved,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CardKind {
    Services,
    Incidents,
    Revenue,
    Mttr,
}

impl CardKind {
    pub const ALL: [CardKind; 4] = [
        CardKind::Services,
        CardKind::Incidents,
        CardKind::Revenue,
        CardKind::Mttr,
    ];

    pub fn index(self) -> usize {
        match self {
            CardKind::Services => 0,
            CardKind::Incidents => 1,
            CardKind::Revenue => 2,
            CardKind::Mttr => 3,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            CardKind::Services => "Services",
            CardKind::Incidents => "Incidents",
            CardKind::Revenue => "Revenue Impact",
            CardKind::Mttr => "MTTR",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CardTone {
    #[default]
    Neutral,
    Healthy,
    Warning,
    Impact,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CardState {
    pub value: String,
    pub detail: String,
    pub tone: CardTone,
}

impl CardState {
    pub fn new(value: impl Into<String>, detail: impl Into<String>, tone: CardTone) -> Self {
        Self {
            value: value.into(),
            detail: detail.into(),
            tone,
        }
    }

    pub fn services(summary: &RosterSummary) -> Self {
        let tone = if summary.is_nominal() {
            CardTone::Healthy
        } else {
            CardTone::Warning
        };
        Self::new(summary.label(), summary.detail(), tone)
    }

    /// Idle value for each card.
    pub fn idle(kind: CardKind) -> Self {
        match kind {
            CardKind::Services => Self::new("8/8", "All services nominal", CardTone::Healthy),
            CardKind::Incidents => Self::new("0", "No active incidents", CardTone::Healthy),
            CardKind::Revenue => Self::new("$0/hr", "No revenue impact", CardTone::Healthy),
            CardKind::Mttr => Self::new("-", "Awaiting incident data", CardTone::Neutral),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DataSource {
    #[default]
    Demo,
    Loading,
    Live,
}

impl DataSource {
    pub fn label(self) -> &'static str {
        match self {
            DataSource::Demo => "DEMO MODE",
            DataSource::Loading => "LOADING...",
            DataSource::Live => "LIVE DATA",
        }
    }
}

/// Sink for view-state. Implementations keep no sequencing state of their
/// own; every call is total and may be repeated.
pub trait RenderSurface {
    fn render_services(&mut self, services: &[Service]);
    fn render_agents(&mut self, agents: &[Agent]);
    /// Out-of-range indices are ignored.
    fn set_connector(&mut self, index: usize, status: ConnectorStatus);
    fn render_timeline(&mut self, entries: &[TimelineEntry]);
    fn render_report(&mut self, report: &ReportView);
    fn set_banner(&mut self, text: &str, severity: BannerSeverity);
    fn render_card(&mut self, kind: CardKind, card: &CardState);
    /// Replaces only the detail line; value and tone stay as painted.
    fn set_card_detail(&mut self, kind: CardKind, detail: &str);

    fn set_data_source(&mut self, _source: DataSource) {}

    fn set_indexed_docs(&mut self, _total: u64) {}
}

impl<S: RenderSurface + ?Sized> RenderSurface for &mut S {
    fn render_services(&mut self, services: &[Service]) {
        (**self).render_services(services)
    }

    fn render_agents(&mut self, agents: &[Agent]) {
        (**self).render_agents(agents)
    }

    fn set_connector(&mut self, index: usize, status: ConnectorStatus) {
        (**self).set_connector(index, status)
    }

    fn render_timeline(&mut self, entries: &[TimelineEntry]) {
        (**self).render_timeline(entries)
    }

    fn render_report(&mut self, report: &ReportView) {
        (**self).render_report(report)
    }

    fn set_banner(&mut self, text: &str, severity: BannerSeverity) {
        (**self).set_banner(text, severity)
    }

    fn render_card(&mut self, kind: CardKind, card: &CardState) {
        (**self).render_card(kind, card)
    }

    fn set_card_detail(&mut self, kind: CardKind, detail: &str) {
        (**self).set_card_detail(kind, detail)
    }

    fn set_data_source(&mut self, source: DataSource) {
        (**self).set_data_source(source)
    }

    fn set_indexed_docs(&mut self, total: u64) {
        (**self).set_indexed_docs(total)
    }
}

pub const IDLE_BANNER: &str = "System Monitoring Active";

/// Last values painted through [`RenderSurface`]. Headless hosts and tests
/// read it back; the terminal dashboard draws from it every frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub services: Vec<Service>,
    pub agents: Vec<Agent>,
    pub connectors: [ConnectorStatus; CONNECTOR_COUNT],
    pub timeline: Vec<TimelineEntry>,
    pub report: ReportView,
    pub banner: String,
    pub banner_severity: BannerSeverity,
    pub cards: [CardState; 4],
    pub data_source: DataSource,
    pub indexed_docs: Option<u64>,
    /// Number of surface calls applied so far.
    pub writes: u64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            services: Vec::new(),
            agents: Agent::pipeline().to_vec(),
            connectors: [ConnectorStatus::None; CONNECTOR_COUNT],
            timeline: Vec::new(),
            report: ReportView::placeholder(),
            banner: IDLE_BANNER.to_string(),
            banner_severity: BannerSeverity::Nominal,
            cards: CardKind::ALL.map(CardState::idle),
            data_source: DataSource::Demo,
            indexed_docs: None,
            writes: 0,
        }
    }
}

impl ViewState {
    /// First paint before any run: healthy roster, empty report.
    pub fn idle(scenario: &Scenario) -> Self {
        let mut view = Self {
            services: scenario.healthy.clone(),
            ..Self::default()
        };
        view.cards[CardKind::Services.index()] =
            CardState::services(&RosterSummary::of(&scenario.healthy));
        view
    }

    pub fn card(&self, kind: CardKind) -> &CardState {
        &self.cards[kind.index()]
    }
}

impl RenderSurface for ViewState {
    fn render_services(&mut self, services: &[Service]) {
        self.writes += 1;
        self.services = services.to_vec();
    }

    fn render_agents(&mut self, agents: &[Agent]) {
        self.writes += 1;
        self.agents = agents.to_vec();
    }

    fn set_connector(&mut self, index: usize, status: ConnectorStatus) {
        if let Some(slot) = self.connectors.get_mut(index) {
            self.writes += 1;
            *slot = status;
        }
    }

    fn render_timeline(&mut self, entries: &[TimelineEntry]) {
        self.writes += 1;
        self.timeline = entries.to_vec();
    }

    fn render_report(&mut self, report: &ReportView) {
        self.writes += 1;
        self.report = report.clone();
    }

    fn set_banner(&mut self, text: &str, severity: BannerSeverity) {
        self.writes += 1;
        self.banner = text.to_string();
        self.banner_severity = severity;
    }

    fn render_card(&mut self, kind: CardKind, card: &CardState) {
        self.writes += 1;
        self.cards[kind.index()] = card.clone();
    }

    fn set_card_detail(&mut self, kind: CardKind, detail: &str) {
        self.writes += 1;
        self.cards[kind.index()].detail = detail.to_string();
    }

    fn set_data_source(&mut self, source: DataSource) {
        self.writes += 1;
        self.data_source = source;
    }

    fn set_indexed_docs(&mut self, total: u64) {
        self.writes += 1;
        self.indexed_docs = Some(total);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_connector_is_ignored() {
        let mut view = ViewState::default();
        view.set_connector(CONNECTOR_COUNT, ConnectorStatus::Completed);
        assert_eq!(view.writes, 0);
        view.set_connector(0, ConnectorStatus::Completed);
        assert_eq!(view.connectors[0], ConnectorStatus::Completed);
        assert_eq!(view.writes, 1);
    }

    #[test]
    fn card_detail_keeps_value_and_tone() {
        let mut view = ViewState::default();
        view.render_card(CardKind::Incidents, &CardState::new("1", "x", CardTone::Warning));
        view.set_card_detail(CardKind::Incidents, "CRITICAL: api (3 errors)");
        let card = view.card(CardKind::Incidents);
        assert_eq!(card.value, "1");
        assert_eq!(card.tone, CardTone::Warning);
        assert_eq!(card.detail, "CRITICAL: api (3 errors)");
    }

    #[test]
    fn idle_view_matches_healthy_roster() {
        let scenario = Scenario::payment_outage();
        let view = ViewState::idle(&scenario);
        assert_eq!(view.services, scenario.healthy);
        assert_eq!(view.card(CardKind::Services).value, "8/8");
        assert_eq!(view.card(CardKind::Mttr).detail, "Awaiting incident data");
        assert!(view.report.is_placeholder());
    }
}
