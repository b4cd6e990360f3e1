use crate::state::App;
use crate::theme::{icons, ops_theme, status_icon, OpsTheme};
use opsguard_core::chart::INCIDENT_LABEL;
use opsguard_core::report::{group_thousands, ActionState, ReportView};
use opsguard_core::{AgentStatus, CardKind, Clock, ConnectorStatus, RosterSummary};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    symbols,
    text::{Line, Span, Text},
    widgets::{
        Axis, Block, Borders, Cell, Chart, Clear, Dataset, GraphType, List, ListItem, Paragraph,
        Row, Table, Wrap,
    },
    Frame,
};

pub fn render<C: Clock>(frame: &mut Frame, app: &App<C>) {
    let theme = ops_theme();
    let area = frame.size();
    frame.render_widget(Block::default().style(Style::default().bg(theme.bg)), area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Min(10),
            Constraint::Length(3),
            Constraint::Min(8),
            Constraint::Length(1),
        ])
        .split(area);

    frame.render_widget(render_header(app, theme), rows[0]);
    render_cards(frame, app, theme, rows[1]);

    let middle = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(42), Constraint::Percentage(58)])
        .split(rows[2]);
    frame.render_widget(render_services(app, theme), middle[0]);
    render_chart(frame, app, theme, middle[1]);

    frame.render_widget(render_pipeline(app, theme), rows[3]);

    let bottom = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(58), Constraint::Percentage(42)])
        .split(rows[4]);
    render_timeline(frame, app, theme, bottom[0]);
    frame.render_widget(render_report(&app.view.report, theme), bottom[1]);

    frame.render_widget(render_footer(app, theme), rows[5]);

    if app.show_help {
        render_help_overlay(frame, theme);
    }
}

fn panel(title: &str, theme: OpsTheme) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.surface))
        .title(Span::styled(format!(" {title} "), theme.title_style()))
}

fn render_header<C: Clock>(app: &App<C>, theme: OpsTheme) -> Paragraph<'static> {
    let view = &app.view;
    let mut spans = vec![
        Span::styled("OpsGuard", theme.title_style()),
        Span::raw("  "),
        Span::styled(view.banner.clone(), theme.banner_style(view.banner_severity)),
        Span::raw("  "),
        Span::styled(
            format!(" {} ", view.data_source.label()),
            theme.source_style(view.data_source),
        ),
    ];
    if let Some(total) = view.indexed_docs {
        spans.push(Span::styled(
            format!("  {} docs indexed", group_thousands(total)),
            Style::default().fg(theme.muted),
        ));
    }
    Paragraph::new(Line::from(spans))
        .style(Style::default().fg(theme.text).bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .style(Style::default().bg(theme.bg)),
        )
}

fn render_cards<C: Clock>(frame: &mut Frame, app: &App<C>, theme: OpsTheme, area: Rect) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 4); 4])
        .split(area);
    for (kind, slot) in CardKind::ALL.into_iter().zip(columns.iter()) {
        let card = app.view.card(kind);
        let body = Text::from(vec![
            Line::from(Span::styled(
                card.value.clone(),
                Style::default()
                    .fg(theme.tone_color(card.tone))
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                card.detail.clone(),
                Style::default().fg(theme.muted),
            )),
        ]);
        frame.render_widget(
            Paragraph::new(body).block(panel(kind.title(), theme)),
            *slot,
        );
    }
}

fn render_services<C: Clock>(app: &App<C>, theme: OpsTheme) -> Table<'static> {
    let summary = RosterSummary::of(&app.view.services);
    let header = Row::new(vec!["", "Service", "Tier", "CPU", "Mem"])
        .style(Style::default().fg(theme.muted).add_modifier(Modifier::BOLD));
    let rows: Vec<Row> = app
        .view
        .services
        .iter()
        .map(|service| {
            let color = theme.service_color(service.status);
            Row::new(vec![
                Cell::from(status_icon(service.status)).style(Style::default().fg(color)),
                Cell::from(service.name.clone()).style(Style::default().fg(theme.text)),
                Cell::from(service.tier.as_str()).style(Style::default().fg(theme.muted)),
                Cell::from(format!("{}%", service.cpu)).style(Style::default().fg(color)),
                Cell::from(format!("{}%", service.memory)).style(Style::default().fg(color)),
            ])
        })
        .collect();
    Table::new(
        rows,
        [
            Constraint::Length(2),
            Constraint::Min(16),
            Constraint::Length(8),
            Constraint::Length(5),
            Constraint::Length(5),
        ],
    )
    .header(header)
    .block(panel(&format!("Services {}", summary.label()), theme))
}

fn render_chart<C: Clock>(frame: &mut Frame, app: &App<C>, theme: OpsTheme, area: Rect) {
    let cpu = app.series.cpu_points();
    let memory = app.series.memory_points();
    let marker_x = app.series.incident_at as f64;
    let marker = [(marker_x, 0.0), (marker_x, 100.0)];
    let last_x = app.series.len().saturating_sub(1) as f64;

    let datasets = vec![
        Dataset::default()
            .name(format!("{} {INCIDENT_LABEL}", icons::MARKER))
            .marker(symbols::Marker::Dot)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme.critical))
            .data(&marker),
        Dataset::default()
            .name("Memory")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme.memory))
            .data(&memory),
        Dataset::default()
            .name("CPU Usage")
            .marker(symbols::Marker::Braille)
            .graph_type(GraphType::Line)
            .style(Style::default().fg(theme.accent))
            .data(&cpu),
    ];

    let x_labels: Vec<Span> = app
        .period
        .axis_labels()
        .iter()
        .map(|label| Span::styled(*label, Style::default().fg(theme.muted)))
        .collect();
    let y_labels: Vec<Span> = ["0%", "25%", "50%", "75%", "100%"]
        .iter()
        .map(|label| Span::styled(*label, Style::default().fg(theme.muted)))
        .collect();

    let chart = Chart::new(datasets)
        .block(panel(&format!("Metrics [{}]", app.period), theme))
        .x_axis(Axis::default().bounds([0.0, last_x]).labels(x_labels))
        .y_axis(Axis::default().bounds([0.0, 100.0]).labels(y_labels));
    frame.render_widget(chart, area);
}

fn render_pipeline<C: Clock>(app: &App<C>, theme: OpsTheme) -> Paragraph<'static> {
    let mut spans = Vec::new();
    for (index, agent) in app.view.agents.iter().enumerate() {
        let label = match agent.status {
            AgentStatus::Completed => {
                format!("{} {} ✓", agent.id.glyph(), agent.id.display_name())
            }
            _ => format!("{} {}", agent.id.glyph(), agent.id.display_name()),
        };
        spans.push(Span::styled(label, theme.agent_style(agent.status)));
        if let Some(connector) = app.view.connectors.get(index) {
            let color = match connector {
                ConnectorStatus::Completed => theme.ok,
                ConnectorStatus::None => theme.border,
            };
            spans.push(Span::styled(
                format!("  {}  ", icons::CONNECTOR),
                Style::default().fg(color),
            ));
        }
    }
    Paragraph::new(Line::from(spans))
        .alignment(Alignment::Center)
        .block(panel("Agent Pipeline", theme))
}

fn render_timeline<C: Clock>(frame: &mut Frame, app: &App<C>, theme: OpsTheme, area: Rect) {
    let entries = &app.view.timeline;
    let visible = area.height.saturating_sub(2) as usize;
    // newest entry stays in view
    let items: Vec<ListItem> = entries
        .iter()
        .skip(entries.len().saturating_sub(visible))
        .map(|entry| {
            ListItem::new(Line::from(vec![
                Span::styled(format!("{} ", entry.time), Style::default().fg(theme.muted)),
                Span::styled(
                    format!("{} ", entry.agent.glyph()),
                    Style::default().fg(theme.accent),
                ),
                Span::styled(
                    entry.content.clone(),
                    Style::default().fg(theme.entry_color(entry.kind)),
                ),
            ]))
        })
        .collect();
    let title = format!(
        "Timeline {}/{}",
        entries.len(),
        app.orchestrator.scenario().timeline.len()
    );
    frame.render_widget(List::new(items).block(panel(&title, theme)), area);
}

fn render_report(report: &ReportView, theme: OpsTheme) -> Paragraph<'static> {
    let block = panel("Incident Report", theme);
    let Some(details) = &report.details else {
        return Paragraph::new(Line::from(Span::styled(
            "No active incidents",
            Style::default().fg(theme.muted),
        )))
        .alignment(Alignment::Center)
        .block(block);
    };

    let label = Style::default().fg(theme.muted);
    let mut lines = vec![
        Line::from(vec![
            Span::styled(details.id.clone(), theme.title_style()),
            Span::raw("  "),
            Span::styled(
                details.severity.clone(),
                Style::default()
                    .fg(theme.critical)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(vec![
            Span::styled("Service: ", label),
            Span::raw(details.service.clone()),
            Span::styled("  Detected: ", label),
            Span::raw(details.detected_at.clone()),
        ]),
    ];

    if report.analyzing {
        lines.push(Line::from(Span::styled(
            "Analyzing root cause...",
            Style::default().fg(theme.accent),
        )));
    }

    for hypothesis in &report.hypotheses {
        let color = if hypothesis.accepted {
            theme.ok
        } else {
            theme.muted
        };
        let verdict = if hypothesis.accepted { "ACCEPTED" } else { "REJECTED" };
        lines.push(Line::from(vec![
            Span::styled(
                format!("{} {} ({}%) ", hypothesis.label, hypothesis.title, hypothesis.confidence),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ),
            Span::styled(verdict, Style::default().fg(color)),
        ]));
        lines.push(Line::from(Span::styled(hypothesis.evidence.clone(), label)));
    }

    if let Some(impact) = &report.impact {
        lines.push(Line::from(vec![
            Span::styled("Revenue: ", label),
            Span::styled(
                format!("-${}/hr", group_thousands(impact.revenue_loss_per_hour)),
                Style::default().fg(theme.critical),
            ),
            Span::styled("  Txns: ", label),
            Span::raw(format!("{}%", impact.transaction_drop_pct)),
            Span::styled("  Users: ", label),
            Span::raw(impact.users_affected.to_string()),
        ]));
        if report.show_projection {
            lines.push(Line::from(Span::styled(
                format!(
                    "Projected {}hr loss: ${}",
                    impact.projected_hours,
                    group_thousands(impact.projected_loss())
                ),
                Style::default().fg(theme.warn),
            )));
        }
    }

    for action in &report.actions {
        let (mark, color) = match action.state {
            ActionState::Done => ("✓", theme.ok),
            ActionState::Recommended => ("→", theme.warn),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{mark} {}: ", action.label), Style::default().fg(color)),
            Span::raw(action.value.clone()),
        ]));
    }

    if let Some(resolution) = &report.resolution {
        lines.push(Line::from(vec![
            Span::styled("MTTR: ", label),
            Span::styled(
                resolution.mttr.clone(),
                Style::default().fg(theme.ok).add_modifier(Modifier::BOLD),
            ),
            Span::styled(format!("  (industry avg {})", resolution.industry_average), label),
        ]));
    }

    Paragraph::new(Text::from(lines))
        .wrap(Wrap { trim: true })
        .style(Style::default().fg(theme.text))
        .block(block)
}

fn render_footer<C: Clock>(app: &App<C>, theme: OpsTheme) -> Paragraph<'static> {
    let phase = app
        .orchestrator
        .phase()
        .map(|phase| phase.as_str())
        .unwrap_or("waiting");
    let mut text = format!(
        "phase {phase} | run {} | s start  r refresh  x stop  p period  ? help  q quit",
        app.orchestrator.runs()
    );
    if let Some(note) = &app.status_note {
        text.push_str(&format!(" | {note}"));
    }
    Paragraph::new(Line::from(Span::styled(text, Style::default().fg(theme.muted))))
        .style(Style::default().bg(theme.bg))
}

fn render_help_overlay(frame: &mut Frame, theme: OpsTheme) {
    let area = centered_rect(frame.size(), 48, 13);
    let key = Style::default().fg(theme.accent).add_modifier(Modifier::BOLD);
    let bindings = [
        ("s", "Run the scenario now"),
        ("r", "Refresh live data and run"),
        ("x", "Stop the scenario"),
        ("p", "Cycle chart period"),
        ("1-4", "Chart period 1h/6h/24h/7d"),
        ("?", "Toggle this help"),
        ("q / Esc", "Quit"),
    ];
    let mut lines = vec![Line::from("")];
    for (keys, description) in bindings {
        lines.push(Line::from(vec![
            Span::styled(format!("{keys:<9}"), key),
            Span::raw(description),
        ]));
    }
    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(Text::from(lines))
            .style(Style::default().fg(theme.text))
            .block(panel("Help", theme)),
        area,
    );
}

fn centered_rect(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect {
        x: area.x + (area.width - width) / 2,
        y: area.y + (area.height - height) / 2,
        width,
        height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_rect_clamps_to_area() {
        let area = Rect::new(0, 0, 40, 10);
        let rect = centered_rect(area, 48, 13);
        assert_eq!(rect, Rect::new(0, 0, 40, 10));

        let rect = centered_rect(Rect::new(0, 0, 100, 40), 48, 13);
        assert_eq!(rect, Rect::new(26, 13, 48, 13));
    }
}
