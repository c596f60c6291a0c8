//! Historical series, chart geometry and spreadsheet export.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use crate::api::BackendClient;
use crate::error::{Error, Result};
use crate::sensor::{parse_reading, Reading, SensorKind};

/// Aggregation bucket served by `/data/<sensor>/<bucket>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TimeRange {
    #[default]
    #[serde(rename = "realtime")]
    Realtime,
    #[serde(rename = "24h")]
    Last24h,
    #[serde(rename = "7d-avg")]
    Avg7d,
    #[serde(rename = "30d-avg")]
    Avg30d,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::Realtime,
        TimeRange::Last24h,
        TimeRange::Avg7d,
        TimeRange::Avg30d,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            TimeRange::Realtime => "realtime",
            TimeRange::Last24h => "24h",
            TimeRange::Avg7d => "7d-avg",
            TimeRange::Avg30d => "30d-avg",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TimeRange::Realtime => "Real-time",
            TimeRange::Last24h => "Last 24 hours",
            TimeRange::Avg7d => "7-day average",
            TimeRange::Avg30d => "30-day average",
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|r| r.as_str() == s)
            .ok_or_else(|| Error::UnknownRange(s.to_string()))
    }
}

/// Decode a series response: a bare array of rows or `{ data: [...] }`.
/// Rows that carry no numeric value are skipped.
pub fn parse_series(v: &Value) -> Vec<Reading> {
    let rows = match v.get("data").unwrap_or(v) {
        Value::Array(rows) => rows,
        _ => return Vec::new(),
    };
    let series: Vec<Reading> = rows.iter().filter_map(parse_reading).collect();
    if series.len() < rows.len() {
        debug!("Skipped {} unreadable series rows", rows.len() - series.len());
    }
    series
}

// ─── Export ──────────────────────────────────────────────────────────────────

/// One output row, shared by every sensor sheet.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct ExportRow {
    pub timestamp: String,
    pub value: f64,
    pub unit: &'static str,
}

pub fn to_rows(kind: SensorKind, series: &[Reading]) -> Vec<ExportRow> {
    series
        .iter()
        .map(|r| ExportRow {
            timestamp: r
                .timestamp
                .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_default(),
            value: r.value,
            unit: kind.unit(),
        })
        .collect()
}

/// Fetch every sensor's series for `range`.
///
/// All-or-nothing: the first failure aborts the export and no partial
/// result is returned.
pub async fn fetch_all(
    client: &BackendClient,
    range: TimeRange,
) -> Result<Vec<(SensorKind, Vec<ExportRow>)>> {
    let mut sheets = Vec::with_capacity(SensorKind::ALL.len());
    for kind in SensorKind::ALL {
        let series = client.series(kind, range).await.map_err(|e| {
            warn!("Export of {kind} ({range}) failed: {e}");
            Error::Export(format!("{kind}: {}", e.user_message()))
        })?;
        sheets.push((kind, to_rows(kind, &series)));
    }
    Ok(sheets)
}

/// Render the sheets as one CSV table (`Sensor,Timestamp,Value,Unit`).
pub fn to_csv(sheets: &[(SensorKind, Vec<ExportRow>)]) -> String {
    let mut out = String::from("Sensor,Timestamp,Value,Unit\n");
    for (kind, rows) in sheets {
        for row in rows {
            out.push_str(&csv_field(kind.name()));
            out.push(',');
            out.push_str(&csv_field(&row.timestamp));
            out.push(',');
            out.push_str(&row.value.to_string());
            out.push(',');
            out.push_str(&csv_field(row.unit));
            out.push('\n');
        }
    }
    out
}

fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

/// File name offered for the download, e.g. `water-quality-7d-avg.csv`.
pub fn export_file_name(range: TimeRange) -> String {
    format!("water-quality-{}.csv", range.as_str())
}

// ─── Chart ───────────────────────────────────────────────────────────────────

/// SVG path (`M x,y L x,y …`) for a line chart of `series` in a
/// `width`×`height` box.  The y-axis spans the series' own min/max.
pub fn chart_path(series: &[Reading], width: f64, height: f64) -> String {
    if series.is_empty() {
        return String::new();
    }
    let padding = 5.0;
    let (lo, hi) = series
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), r| {
            (lo.min(r.value), hi.max(r.value))
        });
    let span = if hi - lo > f64::EPSILON { hi - lo } else { 1.0 };
    let step = if series.len() > 1 {
        width / (series.len() - 1) as f64
    } else {
        0.0
    };

    let points: Vec<String> = series
        .iter()
        .enumerate()
        .map(|(i, r)| {
            let x = i as f64 * step;
            let y = height - padding - ((r.value - lo) / span) * (height - padding * 2.0);
            format!("{x:.1},{y:.1}")
        })
        .collect();

    format!("M {}", points.join(" L "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    #[test]
    fn test_range_wire_names() {
        assert_eq!(TimeRange::Avg7d.as_str(), "7d-avg");
        assert_eq!("30d-avg".parse::<TimeRange>().unwrap(), TimeRange::Avg30d);
        assert!("1y".parse::<TimeRange>().is_err());
        assert_eq!(serde_json::to_string(&TimeRange::Last24h).unwrap(), "\"24h\"");
    }

    #[test]
    fn test_parse_series_shapes() {
        let doc = json!({"data": [
            {"timestamp": "2024-05-01T10:00:00Z", "value": 7.1},
            {"time": "2024-05-01 11:00:00", "avg": "7.3"},
            {"timestamp": "2024-05-01T12:00:00Z"}
        ]});
        let s = parse_series(&doc);
        assert_eq!(s.len(), 2);
        assert_eq!(s[1].value, 7.3);
        assert!(parse_series(&json!({"error": "x"})).is_empty());
    }

    #[test]
    fn test_rows_and_csv() {
        let t = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let rows = to_rows(
            SensorKind::Tds,
            &[Reading { value: 310.5, timestamp: Some(t) }, Reading::new(299.0)],
        );
        assert_eq!(rows[0].timestamp, "2024-05-01 10:00:00");
        assert_eq!(rows[0].unit, "ppm");
        assert_eq!(rows[1].timestamp, "");

        let csv = to_csv(&[(SensorKind::Tds, rows)]);
        let lines: Vec<_> = csv.lines().collect();
        assert_eq!(lines[0], "Sensor,Timestamp,Value,Unit");
        assert_eq!(lines[1], "TDS,2024-05-01 10:00:00,310.5,ppm");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_csv_quoting() {
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("say \"hi\""), "\"say \"\"hi\"\"\"");
        assert_eq!(csv_field("plain"), "plain");
    }

    #[test]
    fn test_export_row_headers() {
        let row = ExportRow { timestamp: "t".into(), value: 1.0, unit: "pH" };
        let json = serde_json::to_value(row).unwrap();
        assert!(json.get("Timestamp").is_some());
        assert!(json.get("Value").is_some());
        assert!(json.get("Unit").is_some());
    }

    #[test]
    fn test_chart_path() {
        assert_eq!(chart_path(&[], 400.0, 150.0), "");
        let s = [Reading::new(1.0), Reading::new(3.0), Reading::new(2.0)];
        let path = chart_path(&s, 400.0, 150.0);
        assert_eq!(path, "M 0.0,145.0 L 200.0,5.0 L 400.0,75.0");
        // A flat series sits on the baseline instead of dividing by zero.
        let flat = chart_path(&[Reading::new(4.0), Reading::new(4.0)], 100.0, 50.0);
        assert_eq!(flat, "M 0.0,45.0 L 100.0,45.0");
    }
}
