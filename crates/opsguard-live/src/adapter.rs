//! Maps backend query results onto the dashboard.
//!
//! A refresh runs every query first and only then touches the surface, so a
//! failure part-way through leaves the view exactly as it was.

use crate::client::{EsqlResponse, IndexCount, QueryBackend};
use crate::config::IndexNames;
use crate::error::LiveError;
use opsguard_core::report::group_thousands;
use opsguard_core::{
    CardKind, CardState, CardTone, DataSource, RenderSurface, RosterSummary, Scenario, Service,
    ServiceStatus, Tier,
};
use serde_json::Value;
use std::time::Duration;
use tracing::{info, warn};

pub const REFRESH_PERIOD: Duration = Duration::from_secs(30);
const PROJECTED_HOURS: u64 = 4;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorHotspot {
    pub service: String,
    pub errors: u64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LiveSnapshot {
    pub indexed_docs: Option<u64>,
    pub services: Option<Vec<Service>>,
    pub hotspot: Option<ErrorHotspot>,
    pub hourly_loss: Option<u64>,
}

impl LiveSnapshot {
    pub fn apply<S: RenderSurface + ?Sized>(&self, surface: &mut S) {
        if let Some(total) = self.indexed_docs {
            surface.set_indexed_docs(total);
        }
        if let Some(services) = &self.services {
            surface.render_services(services);
            surface.render_card(
                CardKind::Services,
                &CardState::services(&RosterSummary::of(services)),
            );
        }
        if let Some(hotspot) = &self.hotspot {
            let detail = format!("CRITICAL: {} ({} errors)", hotspot.service, hotspot.errors);
            surface.set_card_detail(CardKind::Incidents, &detail);
        }
        if let Some(loss) = self.hourly_loss {
            let card = CardState::new(
                format!("-${}/hr", group_thousands(loss)),
                format!(
                    "Projected {PROJECTED_HOURS}hr loss: ${}",
                    group_thousands(loss * PROJECTED_HOURS)
                ),
                CardTone::Impact,
            );
            surface.render_card(CardKind::Revenue, &card);
        }
    }
}

/// Applies a finished fetch. Failures leave every view field alone and only
/// flip the marker back to demo.
pub fn apply_result<S: RenderSurface + ?Sized>(
    result: Result<LiveSnapshot, LiveError>,
    surface: &mut S,
) -> DataSource {
    let source = match result {
        Ok(snapshot) => {
            snapshot.apply(surface);
            info!(
                docs = snapshot.indexed_docs,
                services = snapshot.services.as_ref().map(Vec::len),
                "live data applied"
            );
            DataSource::Live
        }
        Err(err) => {
            warn!(error = %err, "live refresh failed, staying on demo data");
            DataSource::Demo
        }
    };
    surface.set_data_source(source);
    source
}

pub struct LiveDataAdapter<B: QueryBackend> {
    backend: B,
    indices: IndexNames,
    scenario: Scenario,
}

impl<B: QueryBackend> LiveDataAdapter<B> {
    pub fn new(backend: B, indices: IndexNames) -> Self {
        Self {
            backend,
            indices,
            scenario: Scenario::payment_outage(),
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub async fn fetch(&self) -> Result<LiveSnapshot, LiveError> {
        let counts = self.backend.index_counts(&self.indices.pattern).await?;
        let health = self.backend.esql(&health_query(&self.indices)).await?;
        let errors = self.backend.esql(&error_query(&self.indices)).await?;
        let business = self.backend.esql(&business_query(&self.indices)).await?;

        Ok(LiveSnapshot {
            indexed_docs: Some(total_docs(&counts)),
            services: map_services(&health, &self.scenario),
            hotspot: error_hotspot(&errors),
            hourly_loss: hourly_loss(&business),
        })
    }

    /// Marks the surface as loading, fetches, then applies the outcome.
    pub async fn fetch_and_apply<S: RenderSurface + ?Sized>(&self, surface: &mut S) -> DataSource {
        surface.set_data_source(DataSource::Loading);
        let result = self.fetch().await;
        apply_result(result, surface)
    }
}

pub fn health_query(indices: &IndexNames) -> String {
    format!(
        "FROM {}\n\
         | STATS avg_cpu = AVG(system.cpu.usage_percent),\n\
         \x20       avg_memory = AVG(system.memory.usage_percent),\n\
         \x20       max_cpu = MAX(system.cpu.usage_percent)\n\
         \x20 BY service.name\n\
         | SORT max_cpu DESC",
        indices.metrics
    )
}

pub fn error_query(indices: &IndexNames) -> String {
    format!(
        "FROM {}\n\
         | WHERE log.level IN (\"ERROR\", \"CRITICAL\")\n\
         | STATS error_count = COUNT(*),\n\
         \x20       unique_codes = COUNT_DISTINCT(error.code)\n\
         \x20 BY service.name\n\
         | SORT error_count DESC",
        indices.logs
    )
}

pub fn business_query(indices: &IndexNames) -> String {
    format!(
        "FROM {}\n\
         | STATS total_revenue = SUM(revenue.amount_usd),\n\
         \x20       avg_baseline = AVG(revenue.baseline_hourly_usd),\n\
         \x20       total_failures = SUM(transactions.failure_count),\n\
         \x20       total_txns = SUM(transactions.count),\n\
         \x20       avg_users = AVG(active_users)\n\
         \x20 BY service.name\n\
         | SORT total_failures DESC",
        indices.business
    )
}

pub fn total_docs(counts: &[IndexCount]) -> u64 {
    counts.iter().map(IndexCount::docs).sum()
}

fn number(row: &[Value], column: Option<usize>) -> f64 {
    column
        .and_then(|idx| row.get(idx))
        .and_then(Value::as_f64)
        .unwrap_or(0.0)
}

fn text(row: &[Value], column: Option<usize>) -> Option<String> {
    column
        .and_then(|idx| row.get(idx))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// `None` when the result has no usable rows, so an empty index never blanks
/// the roster.
pub fn map_services(response: &EsqlResponse, scenario: &Scenario) -> Option<Vec<Service>> {
    let name = response.column("service.name");
    let avg_cpu = response.column("avg_cpu");
    let avg_memory = response.column("avg_memory");
    let max_cpu = response.column("max_cpu");

    let services: Vec<Service> = response
        .values
        .iter()
        .filter_map(|row| {
            let name = text(row, name)?;
            let tier = scenario.tier_of(&name).unwrap_or(Tier::Medium);
            let peak = number(row, max_cpu).round();
            Some(Service {
                tier,
                cpu: percent(number(row, avg_cpu)),
                memory: percent(number(row, avg_memory)),
                status: ServiceStatus::from_peak_cpu(peak),
                name,
            })
        })
        .collect();
    (!services.is_empty()).then_some(services)
}

/// Service with the most errors. Ties keep the first row.
pub fn error_hotspot(response: &EsqlResponse) -> Option<ErrorHotspot> {
    let name = response.column("service.name");
    let count = response.column("error_count");

    let mut hotspot: Option<ErrorHotspot> = None;
    for row in &response.values {
        let errors = number(row, count).max(0.0) as u64;
        if errors == 0 {
            continue;
        }
        let Some(service) = text(row, name) else {
            continue;
        };
        if hotspot.as_ref().map_or(true, |best| errors > best.errors) {
            hotspot = Some(ErrorHotspot { service, errors });
        }
    }
    hotspot
}

/// Baseline hourly revenue minus observed per-minute revenue scaled to an
/// hour. Only a positive loss is reported.
pub fn hourly_loss(response: &EsqlResponse) -> Option<u64> {
    if response.values.is_empty() {
        return None;
    }
    let revenue = response.column("total_revenue");
    let baseline = response.column("avg_baseline");

    let total_revenue: f64 = response.values.iter().map(|row| number(row, revenue)).sum();
    let total_baseline: f64 = response.values.iter().map(|row| number(row, baseline)).sum();
    let rows = response.values.len() as f64;

    let loss = (total_baseline - total_revenue * 60.0 / rows).round();
    (loss > 0.0).then_some(loss as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::EsqlColumn;
    use serde_json::json;

    fn response(columns: &[&str], values: Vec<Vec<Value>>) -> EsqlResponse {
        EsqlResponse {
            columns: columns
                .iter()
                .map(|name| EsqlColumn {
                    name: name.to_string(),
                    kind: String::new(),
                })
                .collect(),
            values,
        }
    }

    #[test]
    fn health_rows_classify_by_peak_cpu() {
        let health = response(
            &["avg_cpu", "avg_memory", "max_cpu", "service.name"],
            vec![
                vec![json!(71.6), json!(80.2), json!(96.0), json!("payment-service")],
                vec![json!(50.0), json!(60.0), json!(70.0), json!("order-processing")],
                vec![json!(20.0), json!(30.0), json!(65.0), json!("brand-new-svc")],
            ],
        );
        let services = map_services(&health, &Scenario::payment_outage()).unwrap();
        assert_eq!(services.len(), 3);
        assert_eq!(services[0].status, ServiceStatus::Degraded);
        assert_eq!(services[0].cpu, 72);
        assert_eq!(services[0].tier, Tier::Critical);
        assert_eq!(services[1].status, ServiceStatus::Warning);
        assert_eq!(services[2].status, ServiceStatus::Healthy);
        assert_eq!(services[2].tier, Tier::Medium);
    }

    #[test]
    fn empty_health_result_keeps_roster() {
        let health = response(&["service.name"], Vec::new());
        assert!(map_services(&health, &Scenario::payment_outage()).is_none());
    }

    #[test]
    fn hotspot_picks_most_errors() {
        let errors = response(
            &["error_count", "unique_codes", "service.name"],
            vec![
                vec![json!(120), json!(4), json!("order-processing")],
                vec![json!(847), json!(12), json!("payment-service")],
                vec![json!(0), json!(0), json!("user-api")],
            ],
        );
        let hotspot = error_hotspot(&errors).unwrap();
        assert_eq!(hotspot.service, "payment-service");
        assert_eq!(hotspot.errors, 847);
    }

    #[test]
    fn loss_scales_minute_revenue_to_hours() {
        let business = response(
            &["total_revenue", "avg_baseline", "service.name"],
            vec![
                vec![json!(100.0), json!(15_000.0), json!("payment-service")],
                vec![json!(50.0), json!(5_000.0), json!("order-processing")],
            ],
        );
        // 20000 - 150 * 60 / 2 = 15500
        assert_eq!(hourly_loss(&business), Some(15_500));

        let healthy = response(
            &["total_revenue", "avg_baseline"],
            vec![vec![json!(1_000.0), json!(100.0)]],
        );
        assert_eq!(hourly_loss(&healthy), None);
        assert_eq!(hourly_loss(&response(&[], Vec::new())), None);
    }

    #[test]
    fn snapshot_paints_cards() {
        let snapshot = LiveSnapshot {
            indexed_docs: Some(12_000),
            services: None,
            hotspot: Some(ErrorHotspot {
                service: "payment-service".to_string(),
                errors: 847,
            }),
            hourly_loss: Some(12_450),
        };
        let mut view = opsguard_core::ViewState::default();
        let incidents_before = view.card(CardKind::Incidents).clone();
        snapshot.apply(&mut view);
        assert_eq!(view.indexed_docs, Some(12_000));
        let incidents = view.card(CardKind::Incidents);
        assert_eq!(incidents.detail, "CRITICAL: payment-service (847 errors)");
        assert_eq!(incidents.value, incidents_before.value);
        assert_eq!(incidents.tone, incidents_before.tone);
        assert_eq!(view.card(CardKind::Revenue).value, "-$12,450/hr");
        assert_eq!(
            view.card(CardKind::Revenue).detail,
            "Projected 4hr loss: $49,800"
        );
    }

    #[test]
    fn queries_target_configured_indices() {
        let indices = IndexNames {
            metrics: "metrics-custom".to_string(),
            ..IndexNames::default()
        };
        assert!(health_query(&indices).starts_with("FROM metrics-custom\n"));
        assert!(error_query(&indices).contains("log.level IN (\"ERROR\", \"CRITICAL\")"));
        assert!(business_query(&indices).contains("BY service.name"));
    }
}
