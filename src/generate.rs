use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Duration, Utc};
use rand::prelude::*;
use serde::Serialize;

use crate::formats::LogFormat;

const IPS: &[&str] = &[
    "192.168.1.100",
    "192.168.1.101",
    "192.168.1.102",
    "192.168.1.103",
    "10.0.0.50",
    "10.0.0.51",
    "10.0.0.52",
    "10.0.0.53",
    "172.16.0.10",
    "172.16.0.11",
    "172.16.0.12",
    "203.0.113.50",
    "203.0.113.51",
];

const PATHS: &[&str] = &[
    "/",
    "/index.html",
    "/about",
    "/contact",
    "/products",
    "/api/users",
    "/api/products",
    "/api/orders",
    "/api/checkout",
    "/api/login",
    "/api/logout",
    "/static/css/style.css",
    "/static/js/app.js",
    "/static/img/logo.png",
    "/admin",
    "/admin/dashboard",
    "/health",
    "/metrics",
    "/favicon.ico",
];

// GET weighted heavier, like real traffic.
const METHODS: &[&str] = &["GET", "GET", "GET", "GET", "POST", "PUT", "DELETE"];

const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36",
    "Mozilla/5.0 (iPhone; CPU iPhone OS 14_0 like Mac OS X)",
    "curl/7.68.0",
    "PostmanRuntime/7.28.4",
    "python-requests/2.25.1",
];

const SERVICES: &[&str] = &[
    "api-gateway",
    "user-service",
    "payment-service",
    "order-service",
    "notification-service",
    "cache-service",
    "auth-service",
];

const LOG_LEVELS: &[&str] = &["DEBUG", "INFO", "INFO", "INFO", "WARN", "ERROR"];

const ERROR_MESSAGES: &[&str] = &[
    "Database connection timeout",
    "Connection refused",
    "Out of memory",
    "Disk space low",
    "Authentication failed",
    "Rate limit exceeded",
    "Service unavailable",
    "Invalid request",
];

const HOSTNAMES: &[&str] = &[
    "webserver01",
    "webserver02",
    "appserver01",
    "appserver02",
    "dbserver01",
    "cacheserver01",
    "loadbalancer",
];

const PROCESSES: &[&str] = &[
    "nginx",
    "sshd",
    "mysqld",
    "redis-server",
    "app",
    "haproxy",
    "kernel",
];

const ERROR_STATUSES: &[u16] = &[400, 401, 403, 404, 500, 502, 503];
const OK_STATUSES: &[u16] = &[200, 200, 200, 200, 201, 204, 301, 304];

#[derive(Serialize)]
struct JsonLog {
    timestamp: String,
    level: String,
    service: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration_ms: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<u16>,
}

/// Write `lines` synthetic log lines in the given format, roughly
/// `error_rate` of them errors. Returns the size of the finished file
/// in bytes. A seed makes the output reproducible.
pub fn generate_file(
    path: &Path,
    format: LogFormat,
    lines: usize,
    error_rate: f64,
    seed: Option<u64>,
) -> io::Result<u64> {
    let file = File::create(path)?;
    let mut writer = BufWriter::with_capacity(1024 * 1024, file);

    let mut rng = match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    };
    // Seeded runs pin the time origin too, so output is byte-identical
    // across runs; unseeded runs start 24h in the past.
    let start_time = match seed {
        Some(_) => DateTime::<Utc>::UNIX_EPOCH + Duration::days(20_000),
        None => Utc::now() - Duration::days(1),
    };

    for i in 0..lines {
        let timestamp =
            start_time + Duration::milliseconds(i as i64 * 50 + rng.random_range(0..50));
        let is_error = rng.random::<f64>() < error_rate;

        let line = match format {
            LogFormat::Apache => apache_line(&mut rng, timestamp, is_error),
            LogFormat::Json => json_line(&mut rng, timestamp, is_error)?,
            LogFormat::Syslog => syslog_line(&mut rng, timestamp, is_error),
        };
        writeln!(writer, "{}", line)?;
    }
    writer.flush()?;

    Ok(fs::metadata(path)?.len())
}

fn pick<T: Copy, R: Rng>(rng: &mut R, pool: &[T]) -> T {
    pool[rng.random_range(0..pool.len())]
}

fn apache_line<R: Rng>(rng: &mut R, timestamp: DateTime<Utc>, is_error: bool) -> String {
    let ip = pick(rng, IPS);
    let method = pick(rng, METHODS);
    let path = pick(rng, PATHS);
    let user_agent = pick(rng, USER_AGENTS);

    let status = if is_error {
        pick(rng, ERROR_STATUSES)
    } else {
        pick(rng, OK_STATUSES)
    };
    // Error responses are small; real pages vary.
    let size = if status >= 400 {
        rng.random_range(50..200)
    } else {
        rng.random_range(500..50000)
    };
    let ts = timestamp.format("%d/%b/%Y:%H:%M:%S %z");

    format!(
        "{} - - [{}] \"{} {} HTTP/1.1\" {} {} \"-\" \"{}\"",
        ip, ts, method, path, status, size, user_agent
    )
}

fn json_line<R: Rng>(rng: &mut R, timestamp: DateTime<Utc>, is_error: bool) -> io::Result<String> {
    let service = pick(rng, SERVICES);
    let level = if is_error { "ERROR" } else { pick(rng, LOG_LEVELS) };

    let (message, error, duration_ms, path, status) = if is_error {
        let err_msg = pick(rng, ERROR_MESSAGES);
        (err_msg.to_string(), Some(err_msg.to_string()), None, None, None)
    } else {
        let path = pick(rng, PATHS);
        (
            format!("Request processed for {}", path),
            None,
            Some(rng.random_range(10..500)),
            Some(path.to_string()),
            Some(pick(rng, &[200u16, 200, 200, 201, 204])),
        )
    };

    let log = JsonLog {
        timestamp: timestamp.to_rfc3339(),
        level: level.to_string(),
        service: service.to_string(),
        message,
        error,
        duration_ms,
        path,
        status,
    };
    serde_json::to_string(&log).map_err(io::Error::from)
}

fn syslog_line<R: Rng>(rng: &mut R, timestamp: DateTime<Utc>, is_error: bool) -> String {
    let hostname = pick(rng, HOSTNAMES);
    let process = pick(rng, PROCESSES);
    let pid = rng.random_range(1000..50000);
    let ts = timestamp.format("%b %d %H:%M:%S");

    let message = if is_error {
        format!("ERROR {}", pick(rng, ERROR_MESSAGES))
    } else {
        match process {
            "sshd" => format!(
                "Accepted publickey for user{} from {} port {}",
                rng.random_range(1..10),
                pick(rng, IPS),
                rng.random_range(40000..60000)
            ),
            "nginx" => format!(
                "*{} upstream response time: {}ms",
                rng.random_range(1000..9999),
                rng.random_range(10..500)
            ),
            "mysqld" => format!("Query executed in {}ms", rng.random_range(1..100)),
            _ => "Operation completed successfully".to_string(),
        }
    };

    format!("{} {} {}[{}]: {}", ts, hostname, process, pid, message)
}
