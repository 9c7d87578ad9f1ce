//! HTML pages: data table, time-series chart, and health dashboard.
//!
//! Each page is rendered from a single snapshot taken by the handler.

use std::time::Duration;

use espsink_core::record::{metric, sensor};
use espsink_core::{HealthSummary, HostSnapshot, Snapshot, TelemetryRecord};

use crate::levels::{self, HealthLevel};

const CHART_JS_CDN: &str = "https://cdn.jsdelivr.net/npm/chart.js@4.4.1";

/// Escape text for HTML element and attribute content.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn page_head(title: &str, extra_head: &str, style: &str) -> String {
    format!(
        "<html><head><meta charset='UTF-8'><title>{}</title>{extra_head}<style>{style}</style></head><body>",
        escape(title)
    )
}

// ---------------------------------------------------------------------------
// Data table (GET /datos)
// ---------------------------------------------------------------------------

const TABLE_STYLE: &str = "table{border-collapse:collapse;width:95%;margin:auto;}\
th,td{border:1px solid #ccc;padding:8px;text-align:center;}\
th{background-color:#4CAF50;color:white;}";

const TABLE_SENSORS: [&str; 5] = [
    sensor::TEMP,
    sensor::HUM,
    sensor::MQ_VOLT,
    sensor::UV_VOLT,
    sensor::VBAT,
];

const TABLE_METRICS: [&str; 5] = [
    metric::I2C_LATENCY_US,
    metric::WIFI_RSSI,
    metric::WIFI_BYTES_SENT,
    metric::WIFI_BYTES_RECV,
    metric::COMM_ERRORS,
];

fn table_row(rec: &TelemetryRecord) -> String {
    let mut row = format!("<tr><td>{}</td>", rec.timestamp);
    for name in TABLE_SENSORS {
        // Missing sensors show as NaN so gaps stand out in the log.
        let v = rec.sensor(name).unwrap_or(f64::NAN);
        row.push_str(&format!("<td>{v}</td>"));
    }
    for name in TABLE_METRICS {
        let v = rec.metric(name).map(ToString::to_string).unwrap_or_default();
        row.push_str(&format!("<td>{}</td>", escape(&v)));
    }
    row.push_str("</tr>");
    row
}

/// Every record in arrival order, one row each.
pub fn render_table(snapshot: &Snapshot) -> String {
    let mut html = page_head("ESP32 Readings", "", TABLE_STYLE);
    html.push_str("<h2 style='text-align:center'>Readings received from the ESP32</h2>");
    html.push_str(
        "<table><tr><th>Timestamp</th><th>Temp</th><th>Hum</th><th>MQ</th><th>UV</th><th>Vbat</th>\
         <th>I2C Latency (us)</th><th>WiFi RSSI</th><th>Bytes Tx</th><th>Bytes Rx</th><th>Comm Errors</th></tr>",
    );
    for rec in snapshot.iter() {
        html.push_str(&table_row(rec));
    }
    html.push_str(
        "</table><p style='text-align:center'>\
         <a href='/metricas'>View charts</a> | <a href='/estado'>View system status</a>\
         </p></body></html>",
    );
    html
}

// ---------------------------------------------------------------------------
// Chart (GET /metricas)
// ---------------------------------------------------------------------------

const CHART_STYLE: &str = "body{font-family:Arial;background:#f7f7f7;color:#333;text-align:center;}\
canvas{display:block;margin:30px auto;border:1px solid #ccc;background:white;padding:10px;border-radius:10px;}";

const CHART_SCRIPT: &str = "const labels = data.map(e => new Date(e.ts).toLocaleTimeString());\
const safe = (obj, key) => (obj && obj[key] !== undefined ? obj[key] : null);\
const ctx = document.getElementById('chart').getContext('2d');\
new Chart(ctx, {type:'line',data:{labels:labels,datasets:[\
{label:'Temp (°C)',data:data.map(e=>safe(e.sensors,'temp')),borderColor:'red',fill:false,tension:0.2},\
{label:'Hum (%)',data:data.map(e=>safe(e.sensors,'hum')),borderColor:'blue',fill:false,tension:0.2},\
{label:'I2C Latency (us)',data:data.map(e=>safe(e.metrics,'i2cLatencyUs')),borderColor:'orange',fill:false,tension:0.2},\
{label:'WiFi RSSI (dBm)',data:data.map(e=>safe(e.metrics,'wifiRSSI')),borderColor:'green',fill:false,tension:0.2},\
{label:'Comm Errors',data:data.map(e=>safe(e.metrics,'commErrors')),borderColor:'purple',fill:false,tension:0.2}\
]},options:{responsive:true,interaction:{mode:'index',intersect:false},\
plugins:{legend:{position:'bottom'}},\
scales:{x:{title:{display:true,text:'Time'},grid:{display:false}},y:{title:{display:true,text:'Value'},beginAtZero:true}}}});";

/// Snapshot as JSON that is safe to inline in a `<script>` element.
fn inline_json(snapshot: &Snapshot) -> String {
    match serde_json::to_string(snapshot) {
        Ok(json) => json.replace("</", "<\\/"),
        Err(e) => {
            log::error!("failed to serialize snapshot for chart: {e}");
            "[]".to_string()
        }
    }
}

/// Line chart of the main sensors and link metrics over time.
pub fn render_chart(snapshot: &Snapshot) -> String {
    let head = format!("<script src='{CHART_JS_CDN}'></script>");
    let mut html = page_head("ESP32 Metrics", &head, CHART_STYLE);
    html.push_str("<h2>Variables over time</h2>");
    html.push_str("<canvas id='chart' width='900' height='400'></canvas>");
    html.push_str("<p><a href='/datos'>&larr; Back to data</a></p>");
    html.push_str("<script>const data = ");
    html.push_str(&inline_json(snapshot));
    html.push(';');
    html.push_str(CHART_SCRIPT);
    html.push_str("</script></body></html>");
    html
}

// ---------------------------------------------------------------------------
// Dashboard (GET /estado)
// ---------------------------------------------------------------------------

const DASHBOARD_STYLE: &str = "body{font-family:Arial;text-align:center;background:#f7f7f7;color:#333;}\
.bar-container{width:70%;margin:10px auto;background:#ddd;border-radius:20px;overflow:hidden;height:25px;}\
.bar{height:100%;text-align:right;padding-right:10px;color:white;font-weight:bold;transition:width 1s ease;}\
table{margin:20px auto;border-collapse:collapse;}th,td{padding:8px 12px;border:1px solid #ccc;}";

/// Seconds between automatic dashboard reloads.
pub const DASHBOARD_REFRESH_SECS: u32 = 30;

/// Everything the dashboard shows, gathered by the handler.
#[derive(Debug, Clone)]
pub struct DashboardView {
    pub health: HealthSummary,
    pub host: HostSnapshot,
    pub server_uptime: Duration,
}

fn bar(label: &str, value: &str, width: u32, level: HealthLevel) -> String {
    format!(
        "<p><b>{label}:</b> {value}</p>\
         <div class='bar-container'><div class='bar' style='width:{width}%;background:{};'>{value}</div></div>",
        level.color()
    )
}

fn summary_row(name: &str, value: &str, target: &str) -> String {
    format!(
        "<tr><td>{name}</td><td>{value}</td><td>{}</td></tr>",
        escape(target)
    )
}

fn format_uptime(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}h {:02}m {:02}s", secs / 3600, (secs % 3600) / 60, secs % 60)
}

/// Color-coded health bars plus a summary table.
pub fn render_dashboard(view: &DashboardView) -> String {
    let head = format!("<meta http-equiv='refresh' content='{DASHBOARD_REFRESH_SECS}'>");
    let mut html = page_head("System Status", &head, DASHBOARD_STYLE);
    html.push_str("<h2>ESP32 Performance Dashboard</h2>");
    html.push_str(&format!(
        "<h4>Refreshes every {DASHBOARD_REFRESH_SECS} s</h4><br>"
    ));

    let mem_pct = view.host.memory_used_pct();
    let mem_text = mem_pct
        .map(|p| format!("{p:.1}%"))
        .unwrap_or_else(|| "n/a".to_string());
    html.push_str(&bar(
        "Host memory used",
        &mem_text,
        levels::bar_width(mem_pct.unwrap_or(0.0)),
        levels::memory_level(mem_pct),
    ));

    // Unavailable load average is shown as an idle host.
    let load = view.host.loadavg_1m.filter(|l| *l >= 0.0).unwrap_or(0.0);
    html.push_str(&bar(
        "CPU load (1m avg)",
        &format!("{:.0}%", load * 100.0),
        levels::bar_width(load * 100.0),
        levels::load_level(load),
    ));

    let latency = view.health.avg_i2c_latency_us;
    html.push_str(&bar(
        "Average I2C latency",
        &format!("{latency:.0} µs"),
        levels::bar_width(latency / 1000.0),
        levels::latency_level(latency),
    ));

    let uptime = view.health.wifi_uptime_pct;
    html.push_str(&bar(
        "WiFi uptime",
        &format!("{uptime:.1}%"),
        levels::bar_width(uptime),
        levels::uptime_level(uptime),
    ));

    html.push_str("<h3>Summary</h3><table><tr><th>Parameter</th><th>Value</th><th>Target</th></tr>");
    html.push_str(&summary_row("Host memory used", &mem_text, "<60%"));
    html.push_str(&summary_row(
        "CPU idle",
        &format!("{:.0}%", 100.0 - load * 100.0),
        ">75%",
    ));
    html.push_str(&summary_row(
        "I2C transmission",
        &format!("{latency:.0} µs"),
        "<10 000 µs",
    ));
    html.push_str(&summary_row("WiFi uptime", &format!("{uptime:.1}%"), ">95%"));
    let restarts = view.health.unexpected_restarts;
    let restarts_text = if view.health.has_restart_baseline() {
        restarts.to_string()
    } else {
        format!("{restarts} (no POWERON yet)")
    };
    html.push_str(&summary_row("Unexpected restarts", &restarts_text, "0"));
    html.push_str(&summary_row(
        "Records received",
        &view.health.records.to_string(),
        "-",
    ));
    html.push_str(&summary_row(
        "Server uptime",
        &format_uptime(view.server_uptime),
        "-",
    ));
    html.push_str("</table><br><a href='/datos'>&larr; Back to data</a></body></html>");
    html
}
