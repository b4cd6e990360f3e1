use crate::config::MAX_IDLE_WAIT;
use crossterm::event::{KeyCode, KeyEvent};
use opsguard_core::{
    ChartPeriod, Clock, DataSource, MetricSeries, Orchestrator, RenderSurface, ViewState,
};
use opsguard_live::{apply_result, EsClient, LiveDataAdapter, LiveError, LiveSnapshot};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

pub type LiveHandle = Arc<LiveDataAdapter<EsClient>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    /// Caller should spawn a live fetch.
    FetchLive,
}

pub struct App<C: Clock> {
    pub orchestrator: Orchestrator<C>,
    pub view: ViewState,
    pub series: MetricSeries,
    pub period: ChartPeriod,
    pub show_help: bool,
    pub status_note: Option<String>,
    live: Option<LiveHandle>,
    fetch_inflight: bool,
}

impl<C: Clock> App<C> {
    pub fn new(orchestrator: Orchestrator<C>, live: Option<LiveHandle>) -> Self {
        let view = ViewState::idle(orchestrator.scenario());
        Self {
            orchestrator,
            view,
            series: MetricSeries::default(),
            period: ChartPeriod::default(),
            show_help: false,
            status_note: None,
            live,
            fetch_inflight: false,
        }
    }

    pub fn live(&self) -> Option<&LiveHandle> {
        self.live.as_ref()
    }

    pub fn is_live_configured(&self) -> bool {
        self.live.is_some()
    }

    pub fn is_fetching(&self) -> bool {
        self.fetch_inflight
    }

    /// Fires due timers. Returns true when anything changed.
    pub fn tick(&mut self) -> bool {
        self.orchestrator.poll(&mut self.view) > 0
    }

    pub fn next_wake(&self) -> Duration {
        self.orchestrator
            .time_until_next()
            .map(|wait| wait.min(MAX_IDLE_WAIT))
            .unwrap_or(MAX_IDLE_WAIT)
    }

    pub fn start_now(&mut self) {
        self.orchestrator.start(&mut self.view);
        self.status_note = Some("scenario started".to_string());
    }

    pub fn start_after(&mut self, delay: Duration) {
        self.orchestrator.start_after(delay);
    }

    pub fn stop(&mut self) {
        self.orchestrator.stop();
        self.status_note = Some("scenario stopped".to_string());
    }

    /// Claims the single fetch slot. False when live mode is off or a fetch
    /// is already running.
    pub fn request_live_fetch(&mut self) -> bool {
        if self.live.is_none() || self.fetch_inflight {
            return false;
        }
        self.fetch_inflight = true;
        self.view.set_data_source(DataSource::Loading);
        debug!("live fetch requested");
        true
    }

    pub fn apply_live(&mut self, result: Result<LiveSnapshot, LiveError>) {
        self.fetch_inflight = false;
        let source = apply_result(result, &mut self.view);
        self.status_note = Some(match source {
            DataSource::Live => "live data refreshed".to_string(),
            _ => "live refresh failed, showing demo data".to_string(),
        });
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if matches!(key.code, KeyCode::Char('?') | KeyCode::F(1)) {
            self.show_help = !self.show_help;
            return Action::None;
        }
        if self.show_help {
            if key.code == KeyCode::Esc {
                self.show_help = false;
            }
            return Action::None;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            KeyCode::Char('s') => {
                self.start_now();
                Action::None
            }
            KeyCode::Char('r') => {
                let fetch = self.request_live_fetch();
                self.start_now();
                if fetch {
                    Action::FetchLive
                } else {
                    Action::None
                }
            }
            KeyCode::Char('x') => {
                self.stop();
                Action::None
            }
            KeyCode::Char('p') => {
                self.set_period(self.period.next());
                Action::None
            }
            KeyCode::Char(digit @ '1'..='4') => {
                if let Some(period) = ChartPeriod::from_digit(digit) {
                    self.set_period(period);
                }
                Action::None
            }
            _ => Action::None,
        }
    }

    fn set_period(&mut self, period: ChartPeriod) {
        if period != self.period {
            info!(period = period.as_str(), "chart period changed");
        }
        self.period = period;
    }
}
