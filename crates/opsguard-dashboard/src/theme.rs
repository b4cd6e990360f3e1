use opsguard_core::{AgentStatus, BannerSeverity, CardTone, DataSource, EntryKind, ServiceStatus};
use ratatui::style::{Color, Modifier, Style};

#[derive(Clone, Copy)]
pub struct OpsTheme {
    pub bg: Color,
    pub surface: Color,
    pub border: Color,
    pub title: Color,
    pub text: Color,
    pub muted: Color,
    pub accent: Color,
    pub memory: Color,
    pub ok: Color,
    pub warn: Color,
    pub critical: Color,
    pub info: Color,
}

pub fn ops_theme() -> OpsTheme {
    OpsTheme {
        bg: Color::Rgb(10, 14, 23),
        surface: Color::Rgb(17, 24, 39),
        border: Color::Rgb(55, 65, 81),
        title: Color::Rgb(191, 219, 254),
        text: Color::Rgb(226, 232, 240),
        muted: Color::Rgb(136, 153, 170),
        accent: Color::Rgb(0, 191, 179),
        memory: Color::Rgb(255, 140, 66),
        ok: Color::Rgb(34, 197, 94),
        warn: Color::Rgb(245, 158, 11),
        critical: Color::Rgb(255, 77, 106),
        info: Color::Rgb(59, 130, 246),
    }
}

pub mod icons {
    pub const HEALTHY: &str = "●";
    pub const WARNING: &str = "▲";
    pub const DEGRADED: &str = "✖";
    pub const CONNECTOR: &str = "→";
    pub const MARKER: &str = "▼";
}

impl OpsTheme {
    pub fn title_style(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    pub fn service_color(&self, status: ServiceStatus) -> Color {
        match status {
            ServiceStatus::Healthy => self.ok,
            ServiceStatus::Warning => self.warn,
            ServiceStatus::Degraded => self.critical,
        }
    }

    pub fn agent_style(&self, status: AgentStatus) -> Style {
        match status {
            AgentStatus::Waiting => Style::default().fg(self.muted),
            AgentStatus::Active => Style::default()
                .fg(self.accent)
                .add_modifier(Modifier::BOLD | Modifier::SLOW_BLINK),
            AgentStatus::Completed => Style::default().fg(self.ok),
        }
    }

    pub fn entry_color(&self, kind: EntryKind) -> Color {
        match kind {
            EntryKind::Active => self.accent,
            EntryKind::Completed => self.ok,
            EntryKind::Error => self.critical,
        }
    }

    pub fn banner_style(&self, severity: BannerSeverity) -> Style {
        let fg = match severity {
            BannerSeverity::Nominal => self.ok,
            BannerSeverity::Critical => self.critical,
            BannerSeverity::Resolved => self.info,
        };
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    }

    pub fn tone_color(&self, tone: CardTone) -> Color {
        match tone {
            CardTone::Neutral => self.text,
            CardTone::Healthy => self.ok,
            CardTone::Warning => self.warn,
            CardTone::Impact => self.critical,
        }
    }

    pub fn source_style(&self, source: DataSource) -> Style {
        let bg = match source {
            DataSource::Demo => self.muted,
            DataSource::Loading => self.warn,
            DataSource::Live => self.ok,
        };
        Style::default()
            .fg(self.bg)
            .bg(bg)
            .add_modifier(Modifier::BOLD)
    }
}

pub fn status_icon(status: ServiceStatus) -> &'static str {
    match status {
        ServiceStatus::Healthy => icons::HEALTHY,
        ServiceStatus::Warning => icons::WARNING,
        ServiceStatus::Degraded => icons::DEGRADED,
    }
}
