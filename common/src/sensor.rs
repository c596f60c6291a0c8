//! Sensor catalogue, quality thresholds and live-value reconciliation.
//!
//! Each water-quality parameter the stations report is a [`SensorKind`].
//! The kind carries everything a gauge needs: socket event name, REST slug,
//! unit, gauge range and the threshold table that maps a value to a quality
//! label and colour.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;
use crate::wire::value_to_f64;

// ─── Quality bands ───────────────────────────────────────────────────────────

pub const COLOR_SAFE: &str = "#20a44c";
pub const COLOR_MODERATE: &str = "#f5a623";
pub const COLOR_NOT_SAFE: &str = "#f0761d";
pub const COLOR_CRITICAL: &str = "#d0312d";

/// One contiguous `[min, max)` range of a threshold table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub min: f64,
    pub max: f64,
    pub label: &'static str,
    pub color: &'static str,
    /// Readings in this band raise the warning popup.
    pub alert: bool,
}

const fn band(min: f64, max: f64, label: &'static str, color: &'static str, alert: bool) -> Band {
    Band {
        min,
        max,
        label,
        color,
        alert,
    }
}

/// Ascending, contiguous bands.
#[derive(Debug, Clone, Copy)]
pub struct ThresholdTable {
    pub bands: &'static [Band],
}

impl ThresholdTable {
    /// The band containing `value`.  The last band is closed at its upper
    /// end; values outside the table clamp to the nearest end band.
    pub fn classify(&self, value: f64) -> &'static Band {
        let bands = self.bands;
        let first = &bands[0];
        let last = &bands[bands.len() - 1];
        if value.is_nan() || value < first.min {
            return first;
        }
        if value >= last.min {
            return last;
        }
        bands
            .iter()
            .find(|b| value >= b.min && value < b.max)
            .unwrap_or(last)
    }
}

const PH_BANDS: &[Band] = &[
    band(0.0, 5.0, "Critical", COLOR_CRITICAL, true),
    band(5.0, 6.0, "Not Safe", COLOR_NOT_SAFE, false),
    band(6.0, 6.5, "Moderate", COLOR_MODERATE, false),
    band(6.5, 8.5, "Safe", COLOR_SAFE, false),
    band(8.5, 9.0, "Moderate", COLOR_MODERATE, false),
    band(9.0, 10.0, "Not Safe", COLOR_NOT_SAFE, false),
    band(10.0, 14.0, "Critical", COLOR_CRITICAL, true),
];

// Turbidity is reported as a clarity percentage: higher is better.
const TURBIDITY_BANDS: &[Band] = &[
    band(0.0, 40.0, "Poor", COLOR_CRITICAL, true),
    band(40.0, 70.0, "Fair", COLOR_MODERATE, false),
    band(70.0, 100.0, "Good", COLOR_SAFE, false),
];

const TDS_BANDS: &[Band] = &[
    band(0.0, 500.0, "Safe", COLOR_SAFE, false),
    band(500.0, 1000.0, "Moderate", COLOR_MODERATE, false),
    band(1000.0, 1500.0, "Not Safe", COLOR_NOT_SAFE, false),
    band(1500.0, 5000.0, "Critical", COLOR_CRITICAL, true),
];

const SALINITY_BANDS: &[Band] = &[
    band(0.0, 0.5, "Safe", COLOR_SAFE, false),
    band(0.5, 3.0, "Moderate", COLOR_MODERATE, false),
    band(3.0, 10.0, "Not Safe", COLOR_NOT_SAFE, false),
    band(10.0, 50.0, "Critical", COLOR_CRITICAL, true),
];

const TEMPERATURE_BANDS: &[Band] = &[
    band(-50.0, 0.0, "Critical", COLOR_CRITICAL, true),
    band(0.0, 10.0, "Moderate", COLOR_MODERATE, false),
    band(10.0, 30.0, "Safe", COLOR_SAFE, false),
    band(30.0, 35.0, "Moderate", COLOR_MODERATE, false),
    band(35.0, 40.0, "Not Safe", COLOR_NOT_SAFE, false),
    band(40.0, 100.0, "Critical", COLOR_CRITICAL, true),
];

// EC is scored 0–100 by the station firmware.
const EC_BANDS: &[Band] = &[
    band(0.0, 30.0, "Critical", COLOR_CRITICAL, true),
    band(30.0, 50.0, "Not Safe", COLOR_NOT_SAFE, false),
    band(50.0, 70.0, "Moderate", COLOR_MODERATE, false),
    band(70.0, 100.0, "Safe", COLOR_SAFE, false),
];

const CONDUCTIVITY_BANDS: &[Band] = &[
    band(0.0, 800.0, "Safe", COLOR_SAFE, false),
    band(800.0, 1500.0, "Moderate", COLOR_MODERATE, false),
    band(1500.0, 2500.0, "Not Safe", COLOR_NOT_SAFE, false),
    band(2500.0, 10000.0, "Critical", COLOR_CRITICAL, true),
];

// ─── Sensor kinds ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SensorKind {
    Ph,
    Turbidity,
    Tds,
    Salinity,
    Temperature,
    /// Raw electrical conductivity score (`updateECData`).
    ElectricalConductivity,
    /// Temperature-compensated conductivity (`updateECCompensatedData`).
    Conductivity,
}

impl SensorKind {
    pub const ALL: [SensorKind; 7] = [
        SensorKind::Ph,
        SensorKind::Turbidity,
        SensorKind::Tds,
        SensorKind::Salinity,
        SensorKind::Temperature,
        SensorKind::ElectricalConductivity,
        SensorKind::Conductivity,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SensorKind::Ph => "pH",
            SensorKind::Turbidity => "Turbidity",
            SensorKind::Tds => "TDS",
            SensorKind::Salinity => "Salinity",
            SensorKind::Temperature => "Temperature",
            SensorKind::ElectricalConductivity => "Electrical Conductivity",
            SensorKind::Conductivity => "Conductivity",
        }
    }

    pub fn unit(self) -> &'static str {
        match self {
            SensorKind::Ph => "pH",
            SensorKind::Turbidity => "%",
            SensorKind::Tds => "ppm",
            SensorKind::Salinity => "ppt",
            SensorKind::Temperature => "°C",
            SensorKind::ElectricalConductivity => "µS/cm",
            SensorKind::Conductivity => "µS/cm",
        }
    }

    /// Path segment in `/data/<slug>/<bucket>`.
    pub fn slug(self) -> &'static str {
        match self {
            SensorKind::Ph => "ph",
            SensorKind::Turbidity => "turbidity",
            SensorKind::Tds => "tds",
            SensorKind::Salinity => "salinity",
            SensorKind::Temperature => "temperature",
            SensorKind::ElectricalConductivity => "ec",
            SensorKind::Conductivity => "ec_compensated",
        }
    }

    /// Field name in the `/api/sensors/latest` document.
    pub fn latest_key(self) -> &'static str {
        match self {
            SensorKind::Ph => "ph",
            SensorKind::Turbidity => "turbidity",
            SensorKind::Tds => "tds",
            SensorKind::Salinity => "salinity",
            SensorKind::Temperature => "temperature",
            SensorKind::ElectricalConductivity => "ec",
            SensorKind::Conductivity => "ecCompensated",
        }
    }

    /// Socket.IO event carrying live values for this sensor.
    pub fn event(self) -> &'static str {
        match self {
            SensorKind::Ph => "updatePHData",
            SensorKind::Turbidity => "updateTurbidityData",
            SensorKind::Tds => "updateTDSData",
            SensorKind::Salinity => "updateSalinityData",
            SensorKind::Temperature => "updateTemperatureData",
            SensorKind::ElectricalConductivity => "updateECData",
            SensorKind::Conductivity => "updateECCompensatedData",
        }
    }

    pub fn from_event(event: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.event() == event)
    }

    /// Display range of the gauge dial.
    pub fn gauge_range(self) -> (f64, f64) {
        match self {
            SensorKind::Ph => (0.0, 14.0),
            SensorKind::Turbidity => (0.0, 100.0),
            SensorKind::Tds => (0.0, 2000.0),
            SensorKind::Salinity => (0.0, 15.0),
            SensorKind::Temperature => (0.0, 50.0),
            SensorKind::ElectricalConductivity => (0.0, 100.0),
            SensorKind::Conductivity => (0.0, 3000.0),
        }
    }

    /// Position of `value` on the dial, clamped to `0.0..=1.0`.
    pub fn gauge_fraction(self, value: f64) -> f64 {
        let (lo, hi) = self.gauge_range();
        if value.is_nan() {
            return 0.0;
        }
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    }

    pub fn thresholds(self) -> ThresholdTable {
        let bands = match self {
            SensorKind::Ph => PH_BANDS,
            SensorKind::Turbidity => TURBIDITY_BANDS,
            SensorKind::Tds => TDS_BANDS,
            SensorKind::Salinity => SALINITY_BANDS,
            SensorKind::Temperature => TEMPERATURE_BANDS,
            SensorKind::ElectricalConductivity => EC_BANDS,
            SensorKind::Conductivity => CONDUCTIVITY_BANDS,
        };
        ThresholdTable { bands }
    }

    pub fn classify(self, value: f64) -> &'static Band {
        self.thresholds().classify(value)
    }

    /// Popup text when `value` falls in an alerting band.
    pub fn warning(self, value: f64) -> Option<String> {
        let band = self.classify(value);
        if !band.alert {
            return None;
        }
        Some(match self {
            SensorKind::Turbidity => format!(
                "Turbidity is below 40% ({value:.1}%). Water clarity is poor."
            ),
            _ => format!(
                "{} reading of {value:.2} {} is {}.",
                self.name(),
                self.unit(),
                band.label.to_lowercase()
            ),
        })
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SensorKind {
    type Err = Error;

    /// Parses a REST slug (`ph`, `ec_compensated`, …).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|k| k.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::UnknownSensor(s.to_string()))
    }
}

// ─── Readings ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    pub value: f64,
    pub timestamp: Option<DateTime<Utc>>,
}

impl Reading {
    pub fn new(value: f64) -> Self {
        Self {
            value,
            timestamp: None,
        }
    }
}

/// RFC 3339, `YYYY-MM-DD HH:MM:SS` (as UTC) or epoch seconds/milliseconds.
pub fn parse_timestamp(v: &Value) -> Option<DateTime<Utc>> {
    match v {
        Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
            .or_else(|| {
                NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
                    .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
                    .ok()
                    .map(|n| Utc.from_utc_datetime(&n))
            }),
        Value::Number(n) => {
            let n = n.as_i64()?;
            // Anything past 1e11 cannot be seconds (year 5138).
            if n.abs() > 100_000_000_000 {
                Utc.timestamp_millis_opt(n).single()
            } else {
                Utc.timestamp_opt(n, 0).single()
            }
        }
        _ => None,
    }
}

const VALUE_FIELDS: &[&str] = &["value", "avg", "average", "reading"];
const TIME_FIELDS: &[&str] = &["timestamp", "time", "date", "createdAt"];

fn first_field<'a>(obj: &'a serde_json::Map<String, Value>, names: &[&str]) -> Option<&'a Value> {
    names.iter().find_map(|n| obj.get(*n))
}

/// Decode one reading from a socket payload or series row.
///
/// Accepts `{value}`, `{value, timestamp}` (and the aliases above), a bare
/// number, or a numeric string.
pub fn parse_reading(v: &Value) -> Option<Reading> {
    match v {
        Value::Object(obj) => {
            let value = first_field(obj, VALUE_FIELDS).and_then(value_to_f64)?;
            let timestamp = first_field(obj, TIME_FIELDS).and_then(parse_timestamp);
            Some(Reading { value, timestamp })
        }
        other => value_to_f64(other).map(Reading::new),
    }
}

/// Socket payloads use the same shapes as series rows.
pub fn parse_socket_payload(v: &Value) -> Option<Reading> {
    parse_reading(v)
}

/// Decode `GET /api/sensors/latest`.
///
/// The document is an object keyed by sensor (optionally wrapped in
/// `data`); each entry is a number or a reading object.  A top-level
/// timestamp applies to entries that lack their own.
pub fn parse_latest(v: &Value) -> BTreeMap<SensorKind, Reading> {
    let obj = match v.get("data").filter(|d| d.is_object()).unwrap_or(v) {
        Value::Object(obj) => obj,
        _ => return BTreeMap::new(),
    };
    let shared_ts = first_field(obj, TIME_FIELDS).and_then(parse_timestamp);

    SensorKind::ALL
        .into_iter()
        .filter_map(|kind| {
            let entry = obj.get(kind.latest_key()).or_else(|| obj.get(kind.slug()))?;
            let mut reading = parse_reading(entry)?;
            if reading.timestamp.is_none() {
                reading.timestamp = shared_ts;
            }
            Some((kind, reading))
        })
        .collect()
}

// ─── Live value ──────────────────────────────────────────────────────────────

/// Current value of one gauge.
///
/// Socket messages always win.  A one-shot REST backfill only lands while
/// no live message has arrived, or when it is provably newer than the
/// live value, so a slow HTTP response cannot roll the gauge back.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LiveValue {
    reading: Option<Reading>,
    live: bool,
}

impl LiveValue {
    pub fn reading(&self) -> Option<Reading> {
        self.reading
    }

    pub fn value(&self) -> Option<f64> {
        self.reading.map(|r| r.value)
    }

    pub fn is_live(&self) -> bool {
        self.live
    }

    pub fn apply_live(&mut self, reading: Reading) {
        self.reading = Some(reading);
        self.live = true;
    }

    /// Returns whether the backfill was applied.
    pub fn apply_backfill(&mut self, reading: Reading) -> bool {
        let accept = match (self.reading, self.live) {
            (None, _) | (Some(_), false) => true,
            (Some(current), true) => matches!(
                (reading.timestamp, current.timestamp),
                (Some(new), Some(old)) if new > old
            ),
        };
        if accept {
            self.reading = Some(reading);
        }
        accept
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_ec_72_is_safe_green() {
        let r = parse_socket_payload(&json!({"value": 72})).unwrap();
        let band = SensorKind::ElectricalConductivity.classify(r.value);
        assert_eq!(band.label, "Safe");
        assert_eq!(band.color, "#20a44c");
        assert!(SensorKind::ElectricalConductivity.warning(r.value).is_none());
    }

    #[test]
    fn test_turbidity_zero_is_poor_with_warning() {
        let r = parse_socket_payload(&json!({"value": 0})).unwrap();
        assert_eq!(SensorKind::Turbidity.classify(r.value).label, "Poor");
        let msg = SensorKind::Turbidity.warning(r.value).unwrap();
        assert!(msg.contains("below 40"));
        assert!(SensorKind::Turbidity.warning(40.0).is_none());
    }

    #[test]
    fn test_band_edges() {
        let ec = SensorKind::ElectricalConductivity;
        assert_eq!(ec.classify(70.0).label, "Safe");
        assert_eq!(ec.classify(69.99).label, "Moderate");
        assert_eq!(ec.classify(100.0).label, "Safe");
        assert_eq!(ec.classify(250.0).label, "Safe");
        assert_eq!(ec.classify(-3.0).label, "Critical");
        assert_eq!(ec.classify(f64::NAN).label, "Critical");
    }

    #[test]
    fn test_ph_is_bad_on_both_sides() {
        let ph = SensorKind::Ph;
        assert_eq!(ph.classify(7.0).label, "Safe");
        assert_eq!(ph.classify(6.2).label, "Moderate");
        assert_eq!(ph.classify(8.7).label, "Moderate");
        assert_eq!(ph.classify(3.0).label, "Critical");
        assert_eq!(ph.classify(12.5).label, "Critical");
        assert!(ph.warning(12.5).is_some());
    }

    #[test]
    fn test_tables_are_contiguous() {
        for kind in SensorKind::ALL {
            let bands = kind.thresholds().bands;
            for pair in bands.windows(2) {
                assert_eq!(pair[0].max, pair[1].min, "{kind}");
            }
        }
    }

    #[test]
    fn test_event_names_round_trip() {
        for kind in SensorKind::ALL {
            assert_eq!(SensorKind::from_event(kind.event()), Some(kind));
            assert_eq!(kind.slug().parse::<SensorKind>().unwrap(), kind);
        }
        assert_eq!(SensorKind::from_event("newNotification"), None);
    }

    #[test]
    fn test_payload_shapes() {
        assert_eq!(parse_socket_payload(&json!(7.2)).unwrap().value, 7.2);
        assert_eq!(parse_socket_payload(&json!("7.25")).unwrap().value, 7.25);
        let r = parse_socket_payload(&json!({"value": "8", "timestamp": "2024-05-01T10:00:00Z"}))
            .unwrap();
        assert_eq!(r.value, 8.0);
        assert!(r.timestamp.is_some());
        assert!(parse_socket_payload(&json!({"foo": 1})).is_none());
        assert!(parse_socket_payload(&json!(null)).is_none());
    }

    #[test]
    fn test_parse_timestamp_variants() {
        let a = parse_timestamp(&json!("2024-05-01 10:00:00")).unwrap();
        let b = parse_timestamp(&json!(1714557600)).unwrap();
        let c = parse_timestamp(&json!(1714557600000i64)).unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_parse_latest() {
        let doc = json!({
            "data": {
                "ph": 7.1,
                "turbidity": {"value": 88},
                "ecCompensated": "640",
                "timestamp": "2024-05-01T10:00:00Z"
            }
        });
        let latest = parse_latest(&doc);
        assert_eq!(latest.len(), 3);
        assert_eq!(latest[&SensorKind::Ph].value, 7.1);
        assert_eq!(latest[&SensorKind::Conductivity].value, 640.0);
        assert!(latest[&SensorKind::Turbidity].timestamp.is_some());
        assert!(!latest.contains_key(&SensorKind::Tds));
    }

    #[test]
    fn test_live_value_prefers_socket() {
        let mut v = LiveValue::default();
        assert!(v.apply_backfill(Reading::new(5.0)));
        assert_eq!(v.value(), Some(5.0));

        v.apply_live(Reading::new(6.0));
        // Untimed backfill after a live message is stale by definition.
        assert!(!v.apply_backfill(Reading::new(1.0)));
        assert_eq!(v.value(), Some(6.0));
        assert!(v.is_live());
    }

    #[test]
    fn test_live_value_accepts_newer_backfill() {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let t1 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 1, 0).unwrap();
        let mut v = LiveValue::default();
        v.apply_live(Reading { value: 1.0, timestamp: Some(t0) });
        assert!(v.apply_backfill(Reading { value: 2.0, timestamp: Some(t1) }));
        assert!(!v.apply_backfill(Reading { value: 3.0, timestamp: Some(t0) }));
        assert_eq!(v.value(), Some(2.0));
    }

    #[test]
    fn test_gauge_fraction_clamps() {
        assert_eq!(SensorKind::Ph.gauge_fraction(7.0), 0.5);
        assert_eq!(SensorKind::Ph.gauge_fraction(20.0), 1.0);
        assert_eq!(SensorKind::Ph.gauge_fraction(-1.0), 0.0);
    }
}
