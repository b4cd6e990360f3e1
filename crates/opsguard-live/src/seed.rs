//! Synthetic backend data for the payment-service outage.
//!
//! Two hours of telemetry ending at `now`: a quiet stretch, the v2.4.2
//! deploy at T-45min, then forty minutes of escalating payment-service
//! failures with order-processing dragged along. Live queries against the
//! seeded indices land on the same story the scripted run tells.

use crate::client::{BulkOutcome, EsClient};
use crate::config::IndexNames;
use crate::error::LiveError;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use opsguard_core::Tier;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

pub const DEFAULT_SEED: u64 = 42;
/// Documents per `_bulk` request.
pub const BULK_CHUNK: usize = 200;

const GOOD_VERSION: &str = "v2.4.1";
const BAD_VERSION: &str = "v2.4.2";
const DEPLOY_MINUTES_AGO: i64 = 45;
const NORMAL_FROM: i64 = 120;
const INCIDENT_FROM: i64 = 40;

/// Name, tier and baseline hourly revenue in USD.
static SERVICES: [(&str, Tier, u64); 8] = [
    ("payment-service", Tier::Critical, 15_000),
    ("user-api", Tier::High, 5_000),
    ("product-catalog", Tier::High, 3_000),
    ("notification-svc", Tier::Medium, 500),
    ("search-service", Tier::Medium, 2_000),
    ("auth-service", Tier::Critical, 8_000),
    ("order-processing", Tier::Critical, 12_000),
    ("inventory-svc", Tier::High, 4_000),
];
const INCIDENT_SERVICE: usize = 0;
const CASCADE_SERVICE: usize = 6;

/// Name, address and region.
static HOSTS: [(&str, &str, &str); 6] = [
    ("prod-web-01", "10.0.1.10", "us-east-1"),
    ("prod-web-02", "10.0.1.11", "us-east-1"),
    ("prod-api-01", "10.0.2.10", "us-west-2"),
    ("prod-api-02", "10.0.2.11", "us-west-2"),
    ("prod-db-01", "10.0.3.10", "eu-west-1"),
    ("prod-worker-01", "10.0.4.10", "us-east-1"),
];
/// Hosts carrying the degraded services.
const AFFECTED_HOSTS: usize = 3;

static ERROR_CODES: [&str; 12] = [
    "DB_CONN_TIMEOUT",
    "DB_QUERY_FAILED",
    "REDIS_UNAVAILABLE",
    "HTTP_502_BAD_GATEWAY",
    "HTTP_503_SERVICE_UNAVAILABLE",
    "HTTP_504_GATEWAY_TIMEOUT",
    "OOM_KILLED",
    "DISK_FULL",
    "SSL_HANDSHAKE_FAILED",
    "DNS_RESOLUTION_FAILED",
    "CONNECTION_POOL_EXHAUSTED",
    "RATE_LIMIT_EXCEEDED",
];

static URL_PATHS: [&str; 9] = [
    "/api/v1/payments",
    "/api/v1/users",
    "/api/v1/orders",
    "/api/v1/products",
    "/api/v1/auth/login",
    "/api/v1/search",
    "/api/v1/notifications",
    "/api/v1/inventory",
    "/health",
];

/// Generated documents, grouped by target index.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SeedData {
    pub logs: Vec<Value>,
    pub metrics: Vec<Value>,
    pub business: Vec<Value>,
    pub incidents: Vec<Value>,
}

impl SeedData {
    /// Same `now` and `seed` always give the same documents.
    pub fn generate(now: DateTime<Utc>, seed: u64) -> Self {
        Generator {
            rng: StdRng::seed_from_u64(seed),
            now,
            data: SeedData {
                incidents: historical_incidents(now),
                ..SeedData::default()
            },
        }
        .run()
    }

    pub fn total(&self) -> usize {
        self.logs.len() + self.metrics.len() + self.business.len() + self.incidents.len()
    }

    /// `(index, documents, mappings)` for every seeded index.
    pub fn batches<'a>(
        &'a self,
        indices: &'a IndexNames,
    ) -> [(&'a str, &'a [Value], Value); 4] {
        [
            (indices.logs.as_str(), self.logs.as_slice(), logs_mapping()),
            (indices.metrics.as_str(), self.metrics.as_slice(), metrics_mapping()),
            (indices.business.as_str(), self.business.as_slice(), business_mapping()),
            (indices.incidents.as_str(), self.incidents.as_slice(), incidents_mapping()),
        ]
    }
}

struct Generator {
    rng: StdRng,
    now: DateTime<Utc>,
    data: SeedData,
}

impl Generator {
    fn run(mut self) -> SeedData {
        for minutes_ago in (DEPLOY_MINUTES_AGO + 1..=NORMAL_FROM).rev() {
            self.quiet_minute(minutes_ago);
        }
        self.deploy();
        for minutes_ago in (1..=INCIDENT_FROM).rev() {
            self.incident_minute(minutes_ago);
        }
        self.data
    }

    fn timestamp(&mut self, minutes_ago: i64, jitter_secs: i64) -> String {
        let jitter = if jitter_secs > 0 {
            self.rng.gen_range(-jitter_secs..=jitter_secs)
        } else {
            0
        };
        (self.now - ChronoDuration::minutes(minutes_ago) + ChronoDuration::seconds(jitter))
            .to_rfc3339()
    }

    fn pick(&mut self, len: usize) -> usize {
        self.rng.gen_range(0..len)
    }

    fn quiet_minute(&mut self, minutes_ago: i64) {
        let service = self.pick(SERVICES.len());
        let host = self.pick(HOSTS.len());
        let ts = self.timestamp(minutes_ago, 10);
        let metric = self.metric(&ts, service, host, None);
        self.data.metrics.push(metric);

        for _ in 0..self.rng.gen_range(3..=5) {
            let ts = self.timestamp(minutes_ago, 25);
            let log = self.info_log(&ts, service, host);
            self.data.logs.push(log);
        }

        if minutes_ago % 5 == 0 {
            for service in 0..SERVICES.len() {
                let ts = self.timestamp(minutes_ago, 5);
                let row = self.business_row(&ts, service, 1.0);
                self.data.business.push(row);
            }
        }
    }

    fn deploy(&mut self) {
        let ts = self.timestamp(DEPLOY_MINUTES_AGO, 0);
        let (host, ip, region) = HOSTS[2];
        self.data.logs.push(json!({
            "@timestamp": ts,
            "service.name": SERVICES[INCIDENT_SERVICE].0,
            "service.environment": "production",
            "log.level": "INFO",
            "message": format!(
                "Deployment started: {BAD_VERSION} - Updating payment-service to latest build"
            ),
            "host.name": host,
            "host.ip": ip,
            "http.response.status_code": 200,
            "http.request.method": "POST",
            "url.path": "/deploy",
            "response_time_ms": 150,
            "deployment.version": BAD_VERSION,
            "deployment.timestamp": ts,
            "geo.region": region,
        }));
    }

    fn incident_minute(&mut self, minutes_ago: i64) {
        // 1.0 at the onset, climbing toward 3.0
        let severity = 1.0 + (INCIDENT_FROM - minutes_ago) as f64 / 20.0;

        for host in 0..AFFECTED_HOSTS {
            let ts = self.timestamp(minutes_ago, 10);
            if self.rng.gen_bool(0.7) {
                let metric = self.metric(&ts, INCIDENT_SERVICE, host, Some(severity));
                self.data.metrics.push(metric);
            }
            if self.rng.gen_bool(0.4) {
                let metric = self.metric(&ts, CASCADE_SERVICE, host, Some(severity * 0.6));
                self.data.metrics.push(metric);
            }
            let bystander = loop {
                let candidate = self.pick(SERVICES.len());
                if candidate != INCIDENT_SERVICE && candidate != CASCADE_SERVICE {
                    break candidate;
                }
            };
            let metric = self.metric(&ts, bystander, host, None);
            self.data.metrics.push(metric);

            let errors = (1.0 + severity * 2.0) as usize;
            for _ in 0..errors {
                let ts = self.timestamp(minutes_ago, 20);
                let level = if severity > 2.5 && self.rng.gen_bool(0.3) {
                    "CRITICAL"
                } else {
                    "ERROR"
                };
                let log = self.error_log(&ts, INCIDENT_SERVICE, host, BAD_VERSION, level);
                self.data.logs.push(log);
            }

            if severity > 1.5 && self.rng.gen_bool(0.5) {
                let ts = self.timestamp(minutes_ago, 20);
                let log = self.error_log(&ts, CASCADE_SERVICE, host, GOOD_VERSION, "ERROR");
                self.data.logs.push(log);
            }

            if self.rng.gen_bool(0.5) {
                let ts = self.timestamp(minutes_ago, 20);
                let log = self.warning_log(&ts, host, severity);
                self.data.logs.push(log);
            }
        }

        if minutes_ago % 5 == 0 {
            let degraded = (1.0 - (severity - 1.0) / 3.0).max(0.2);
            for service in 0..SERVICES.len() {
                let health = if service == INCIDENT_SERVICE || service == CASCADE_SERVICE {
                    degraded
                } else {
                    self.rng.gen_range(0.9..1.0)
                };
                let ts = self.timestamp(minutes_ago, 5);
                let row = self.business_row(&ts, service, health);
                self.data.business.push(row);
            }
        }
    }

    /// `severity == None` is a healthy reading.
    fn metric(&mut self, ts: &str, service: usize, host: usize, severity: Option<f64>) -> Value {
        let (cpu, memory, load, connections) = match severity {
            None => (
                self.rng.gen_range(15.0..45.0),
                self.rng.gen_range(40.0..65.0),
                self.rng.gen_range(0.5..2.0),
                self.rng.gen_range(50..200),
            ),
            Some(factor) => (
                (70.0 + self.rng.gen_range(0.0..25.0) * factor).min(99.0),
                (75.0 + self.rng.gen_range(0.0..20.0) * factor).min(98.0),
                5.0 + self.rng.gen_range(0.0..10.0) * factor,
                self.rng.gen_range(400..900),
            ),
        };
        let (service, _, _) = SERVICES[service];
        let (host, ip, region) = HOSTS[host];
        json!({
            "@timestamp": ts,
            "service.name": service,
            "service.environment": "production",
            "host.name": host,
            "host.ip": ip,
            "system.cpu.usage_percent": round2(cpu),
            "system.memory.usage_percent": round2(memory),
            "system.load.1m": round2(load),
            "network.connections_active": connections,
            "container.id": format!("ctr-{host}-{}", &service[..4]),
            "geo.region": region,
        })
    }

    fn info_log(&mut self, ts: &str, service: usize, host: usize) -> Value {
        let name = SERVICES[service].0;
        let message = match self.pick(4) {
            0 => format!("Request processed successfully in {}ms", self.rng.gen_range(10..200)),
            1 => format!("Health check passed for {name}"),
            2 => format!("Connection pool: {}/100 active connections", self.rng.gen_range(10..50)),
            _ => format!("Cache hit ratio: {}%", self.rng.gen_range(80..99)),
        };
        let level = if self.rng.gen_bool(0.25) { "DEBUG" } else { "INFO" };
        let path = URL_PATHS[self.pick(URL_PATHS.len())];
        let response_time = round2(self.rng.gen_range(20.0..300.0));
        self.log(ts, name, host, level, message, GOOD_VERSION)
            .with("http.response.status_code", json!(200))
            .with("url.path", json!(path))
            .with("response_time_ms", json!(response_time))
            .into_value()
    }

    fn error_log(
        &mut self,
        ts: &str,
        service: usize,
        host: usize,
        version: &str,
        level: &str,
    ) -> Value {
        let name = SERVICES[service].0;
        let code = ERROR_CODES[self.pick(ERROR_CODES.len())];
        let status = [500, 502, 503, 504][self.pick(4)];
        let path = URL_PATHS[self.pick(URL_PATHS.len())];
        let message = if level == "CRITICAL" {
            match self.pick(2) {
                0 => format!("CRITICAL: Service {name} is DOWN - {code}"),
                _ => format!("CRITICAL: Payment processing halted: {code}"),
            }
        } else {
            match self.pick(3) {
                0 => format!(
                    "Failed to connect to database: {code} after {} retries",
                    self.rng.gen_range(1..=5)
                ),
                1 => format!("Service {name} returned HTTP {status}: {code}"),
                _ => format!(
                    "Request timeout after {}ms for {path}: {code}",
                    self.rng.gen_range(5_000..30_000)
                ),
            }
        };
        let response_time = round2(self.rng.gen_range(3_000.0..30_000.0));
        self.log(ts, name, host, level, message, version)
            .with("error.code", json!(code))
            .with("error.message", json!(format!("Service degradation detected: {code}")))
            .with("http.response.status_code", json!(status))
            .with("url.path", json!(path))
            .with("response_time_ms", json!(response_time))
            .into_value()
    }

    fn warning_log(&mut self, ts: &str, host: usize, severity: f64) -> Value {
        let message = match self.pick(3) {
            0 => format!(
                "Slow query detected: {}ms (threshold: 500ms)",
                self.rng.gen_range(2_000..15_000)
            ),
            1 => format!(
                "Connection pool nearing capacity: {}/100",
                self.rng.gen_range(80..=100)
            ),
            _ => format!("Memory usage elevated: {:.1}%", 75.0 + severity * 8.0),
        };
        let response_time = round2(self.rng.gen_range(1_000.0..10_000.0 * severity));
        self.log(
            ts,
            SERVICES[INCIDENT_SERVICE].0,
            host,
            "WARNING",
            message,
            BAD_VERSION,
        )
        .with("response_time_ms", json!(response_time))
        .into_value()
    }

    fn log(
        &mut self,
        ts: &str,
        service: &str,
        host: usize,
        level: &str,
        message: String,
        version: &str,
    ) -> Doc {
        let (host, ip, region) = HOSTS[host];
        let trace = self.rng.gen_range(100_000..1_000_000);
        Doc(json!({
            "@timestamp": ts,
            "service.name": service,
            "service.environment": "production",
            "log.level": level,
            "message": message,
            "host.name": host,
            "host.ip": ip,
            "trace.id": format!("trace-{trace}"),
            "deployment.version": version,
            "geo.region": region,
        }))
    }

    /// `health` is 1.0 when healthy and falls toward 0.2 in a severe outage.
    fn business_row(&mut self, ts: &str, service: usize, health: f64) -> Value {
        let (name, tier, baseline) = SERVICES[service];
        let transactions = (self.rng.gen_range(500..1_500) as f64 * health) as u64;
        let success_ratio = (self.rng.gen_range(0.85..0.99) * health).min(1.0);
        let succeeded = (transactions as f64 * success_ratio) as u64;
        let success_rate = succeeded as f64 / transactions.max(1) as f64 * 100.0;
        let revenue = baseline as f64 / 60.0 * health * self.rng.gen_range(0.8..1.2);
        json!({
            "@timestamp": ts,
            "service.name": name,
            "service.tier": tier.as_str(),
            "transactions.count": transactions,
            "transactions.success_count": succeeded,
            "transactions.failure_count": transactions - succeeded,
            "transactions.success_rate": round2(success_rate),
            "revenue.amount_usd": round2(revenue),
            "revenue.baseline_hourly_usd": baseline,
            "active_users": (self.rng.gen_range(200..800) as f64 * health) as u64,
            "error_rate_percent": round2((1.0 - health) * 100.0 * self.rng.gen_range(0.8..1.2)),
            "sla_compliance": health > 0.7,
        })
    }
}

/// JSON object under construction.
struct Doc(Value);

impl Doc {
    fn with(mut self, key: &str, value: Value) -> Self {
        if let Value::Object(map) = &mut self.0 {
            map.insert(key.to_string(), value);
        }
        self
    }

    fn into_value(self) -> Value {
        self.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

struct PastIncident {
    id: &'static str,
    title: &'static str,
    root_cause: &'static str,
    category: &'static str,
    severity: &'static str,
    service: &'static str,
    impacted: &'static [&'static str],
    resolution_minutes: i64,
    revenue_impact: u64,
    days_ago: i64,
    version: &'static str,
    tags: &'static [&'static str],
}

static PAST_INCIDENTS: [PastIncident; 5] = [
    PastIncident {
        id: "INC-2026-001",
        title: "Payment Service Database Connection Pool Exhaustion",
        root_cause: "Connection pool limit reset during the v2.3.5 migration; max connections \
                     dropped from 100 to 10 and the pool was exhausted under normal load.",
        category: "configuration",
        severity: "CRITICAL",
        service: "payment-service",
        impacted: &["payment-service", "order-processing"],
        resolution_minutes: 45,
        revenue_impact: 25_000,
        days_ago: 30,
        version: "v2.3.5",
        tags: &["database", "connection-pool", "configuration", "payment"],
    },
    PastIncident {
        id: "INC-2026-002",
        title: "Auth Service Memory Leak After v2.4.0 Deployment",
        root_cause: "JWT validation cache introduced in v2.4.0 never evicted expired tokens, \
                     so memory grew without bound.",
        category: "deployment",
        severity: "HIGH",
        service: "auth-service",
        impacted: &["auth-service", "user-api"],
        resolution_minutes: 120,
        revenue_impact: 15_000,
        days_ago: 15,
        version: "v2.4.0",
        tags: &["memory-leak", "deployment", "jwt", "cache", "auth"],
    },
    PastIncident {
        id: "INC-2026-003",
        title: "Product Catalog Search Latency Spike Due to Index Corruption",
        root_cause: "Product index segments were corrupted by an emergency cluster restart \
                     that did not close the index first.",
        category: "infrastructure",
        severity: "HIGH",
        service: "search-service",
        impacted: &["search-service", "product-catalog"],
        resolution_minutes: 90,
        revenue_impact: 8_500,
        days_ago: 45,
        version: "v2.3.2",
        tags: &["elasticsearch", "index-corruption", "search", "infrastructure"],
    },
    PastIncident {
        id: "INC-2026-004",
        title: "Order Processing Queue Backlog During Flash Sale",
        root_cause: "Autoscaler capped order-processing at 5 replicas while flash sale traffic \
                     needed 15.",
        category: "capacity",
        severity: "CRITICAL",
        service: "order-processing",
        impacted: &["order-processing", "payment-service", "inventory-svc"],
        resolution_minutes: 30,
        revenue_impact: 50_000,
        days_ago: 7,
        version: "v2.4.1",
        tags: &["scaling", "capacity", "flash-sale", "hpa", "kubernetes"],
    },
    PastIncident {
        id: "INC-2026-005",
        title: "Notification Service SSL Certificate Expiry",
        root_cause: "Certificate auto-renewal failed on a DNS validation timeout and nothing \
                     alerted on the failure.",
        category: "configuration",
        severity: "MEDIUM",
        service: "notification-svc",
        impacted: &["notification-svc"],
        resolution_minutes: 20,
        revenue_impact: 2_000,
        days_ago: 60,
        version: "v2.2.8",
        tags: &["ssl", "certificate", "expiry", "notification", "configuration"],
    },
];

fn historical_incidents(now: DateTime<Utc>) -> Vec<Value> {
    PAST_INCIDENTS
        .iter()
        .map(|incident| {
            let created = now - ChronoDuration::days(incident.days_ago);
            let resolved = created + ChronoDuration::minutes(incident.resolution_minutes);
            json!({
                "incident_id": incident.id,
                "title": incident.title,
                "root_cause": incident.root_cause,
                "root_cause_category": incident.category,
                "severity": incident.severity,
                "status": "resolved",
                "service_affected": incident.service,
                "services_impacted": incident.impacted,
                "resolution_time_minutes": incident.resolution_minutes,
                "revenue_impact_usd": incident.revenue_impact,
                "created_at": created.to_rfc3339(),
                "resolved_at": resolved.to_rfc3339(),
                "deployment_version": incident.version,
                "tags": incident.tags,
            })
        })
        .collect()
}

fn keyword() -> Value {
    json!({ "type": "keyword" })
}

fn date() -> Value {
    json!({ "type": "date" })
}

fn logs_mapping() -> Value {
    json!({
        "properties": {
            "@timestamp": date(),
            "service.name": keyword(),
            "log.level": keyword(),
            "error.code": keyword(),
            "host.name": keyword(),
            "deployment.version": keyword(),
            "message": { "type": "text" },
            "response_time_ms": { "type": "float" },
        }
    })
}

fn metrics_mapping() -> Value {
    json!({
        "properties": {
            "@timestamp": date(),
            "service.name": keyword(),
            "host.name": keyword(),
            "system.cpu.usage_percent": { "type": "float" },
            "system.memory.usage_percent": { "type": "float" },
        }
    })
}

fn business_mapping() -> Value {
    json!({
        "properties": {
            "@timestamp": date(),
            "service.name": keyword(),
            "service.tier": keyword(),
            "revenue.amount_usd": { "type": "double" },
            "revenue.baseline_hourly_usd": { "type": "double" },
            "transactions.count": { "type": "long" },
            "transactions.failure_count": { "type": "long" },
        }
    })
}

fn incidents_mapping() -> Value {
    json!({
        "properties": {
            "incident_id": keyword(),
            "service_affected": keyword(),
            "severity": keyword(),
            "root_cause_category": keyword(),
            "created_at": date(),
            "resolved_at": date(),
            "title": { "type": "text" },
            "root_cause": { "type": "text" },
        }
    })
}

/// `_bulk` body indexing every document into `index`.
pub fn bulk_body(index: &str, docs: &[Value]) -> Result<String, LiveError> {
    let action = serde_json::to_string(&json!({ "index": { "_index": index } }))?;
    let mut body = String::new();
    for doc in docs {
        body.push_str(&action);
        body.push('\n');
        body.push_str(&serde_json::to_string(doc)?);
        body.push('\n');
    }
    Ok(body)
}

/// Writes one `<index>.ndjson` bulk file per index into `dir`.
pub fn write_bulk_files(
    dir: &Path,
    indices: &IndexNames,
    data: &SeedData,
) -> Result<Vec<PathBuf>, LiveError> {
    fs::create_dir_all(dir)?;
    let mut written = Vec::new();
    for (index, docs, _) in data.batches(indices) {
        let path = dir.join(format!("{index}.ndjson"));
        fs::write(&path, bulk_body(index, docs)?)?;
        written.push(path);
    }
    Ok(written)
}

#[derive(Debug, Clone, PartialEq)]
pub struct IndexSeedResult {
    pub index: String,
    pub outcome: BulkOutcome,
    /// Document count reported after loading; `None` if the count failed.
    pub count: Option<u64>,
}

/// Creates the indices (dropping existing ones when `recreate` is set),
/// bulk-loads `data` in [`BULK_CHUNK`] batches and reads back each count.
pub async fn seed(
    client: &EsClient,
    indices: &IndexNames,
    data: &SeedData,
    recreate: bool,
) -> Result<Vec<IndexSeedResult>, LiveError> {
    let mut results = Vec::new();
    for (index, docs, mappings) in data.batches(indices) {
        if recreate {
            client.delete_index(index).await?;
        }
        client.create_index(index, &mappings).await?;

        let mut outcome = BulkOutcome::default();
        for chunk in docs.chunks(BULK_CHUNK) {
            outcome.merge(client.bulk(bulk_body(index, chunk)?).await?);
        }
        if outcome.failed > 0 {
            warn!(
                index,
                failed = outcome.failed,
                error = ?outcome.first_error,
                "some documents were rejected"
            );
        }

        let count = match client.count(index).await {
            Ok(count) => Some(count),
            Err(err) => {
                warn!(index, error = %err, "could not verify document count");
                None
            }
        };
        info!(index, indexed = outcome.indexed, "index seeded");
        results.push(IndexSeedResult {
            index: index.to_string(),
            outcome,
            count,
        });
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use opsguard_core::Scenario;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 25, 14, 32, 19).unwrap()
    }

    fn field<'a>(doc: &'a Value, key: &str) -> &'a str {
        doc[key].as_str().unwrap_or_default()
    }

    #[test]
    fn same_seed_same_documents() {
        let a = SeedData::generate(fixed_now(), DEFAULT_SEED);
        let b = SeedData::generate(fixed_now(), DEFAULT_SEED);
        assert_eq!(a, b);
        assert_ne!(a, SeedData::generate(fixed_now(), 7));
    }

    #[test]
    fn services_match_the_scripted_roster() {
        let scenario = Scenario::payment_outage();
        for (name, tier, _) in SERVICES {
            assert_eq!(scenario.tier_of(name), Some(tier));
        }
        assert_eq!(SERVICES[INCIDENT_SERVICE].0, scenario.affected_service());
    }

    #[test]
    fn payment_service_dominates_the_errors() {
        let data = SeedData::generate(fixed_now(), DEFAULT_SEED);
        let mut errors: HashMap<&str, usize> = HashMap::new();
        for log in &data.logs {
            if matches!(field(log, "log.level"), "ERROR" | "CRITICAL") {
                *errors.entry(field(log, "service.name")).or_default() += 1;
            }
        }
        let top = errors.iter().max_by_key(|(_, count)| **count).map(|(name, _)| *name);
        assert_eq!(top, Some("payment-service"));
        assert!(errors.contains_key("order-processing"));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn exactly_one_bad_deploy() {
        let data = SeedData::generate(fixed_now(), DEFAULT_SEED);
        let deploys: Vec<&Value> = data
            .logs
            .iter()
            .filter(|log| field(log, "url.path") == "/deploy")
            .collect();
        assert_eq!(deploys.len(), 1);
        assert_eq!(field(deploys[0], "deployment.version"), BAD_VERSION);
    }

    #[test]
    fn incident_revenue_falls_below_baseline() {
        let data = SeedData::generate(fixed_now(), DEFAULT_SEED);
        let payments: Vec<&Value> = data
            .business
            .iter()
            .filter(|row| field(row, "service.name") == "payment-service")
            .collect();
        // 15 quiet samples, then 8 during the outage
        assert_eq!(payments.len(), 23);
        let last = payments[payments.len() - 1];
        let revenue = last["revenue.amount_usd"].as_f64().unwrap_or_default();
        assert!(revenue < 15_000.0 / 60.0 * 0.6);
        assert_eq!(last["sla_compliance"], json!(false));
    }

    #[test]
    fn history_spans_the_past_incidents() {
        let data = SeedData::generate(fixed_now(), DEFAULT_SEED);
        assert_eq!(data.incidents.len(), PAST_INCIDENTS.len());
        assert_eq!(field(&data.incidents[0], "incident_id"), "INC-2026-001");
        assert_eq!(
            field(&data.incidents[0], "created_at"),
            "2026-01-26T14:32:19+00:00"
        );
    }

    #[test]
    fn bulk_body_pairs_action_and_source() {
        let docs = vec![json!({"a": 1}), json!({"b": 2})];
        let body = bulk_body("logs-x", &docs).unwrap();
        let lines: Vec<&str> = body.lines().collect();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], r#"{"index":{"_index":"logs-x"}}"#);
        assert_eq!(lines[3], r#"{"b":2}"#);
        assert!(body.ends_with('\n'));
    }

    #[test]
    fn bulk_files_land_per_index() {
        let dir = tempdir().expect("tempdir");
        let data = SeedData::generate(fixed_now(), DEFAULT_SEED);
        let indices = IndexNames::default();
        let paths = write_bulk_files(dir.path(), &indices, &data).expect("write");
        assert_eq!(paths.len(), 4);

        let logs = fs::read_to_string(dir.path().join(format!("{}.ndjson", indices.logs)))
            .expect("read");
        assert_eq!(logs.lines().count(), data.logs.len() * 2);
    }
}
