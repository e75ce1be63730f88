use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{DomainError, DomainResult};

/// Bulky raw time-series property removed from every stored dynamb,
/// independent of what any upstream filter does.
pub const ACCELERATION_TIME_SERIES_PROPERTY: &str = "accelerationTimeSeries";

const POINT_GEOMETRY_TYPE: &str = "Point";

/// The closed set of event kinds the sink can store. Kinds double as
/// notification topics and table routing tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Raddec,
    Dynamb,
    Spatem,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Raddec => "raddec",
            EventKind::Dynamb => "dynamb",
            EventKind::Spatem => "spatem",
        }
    }

    /// Maps an inbound event name to its kind. Unrecognized names are
    /// not an error; the sink ignores them.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "raddec" => Some(EventKind::Raddec),
            "dynamb" => Some(EventKind::Dynamb),
            "spatem" => Some(EventKind::Spatem),
            _ => None,
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One receiver's observation of a transmitter within a raddec.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RssiObservation {
    pub receiver_id: String,
    pub receiver_id_type: u8,
    pub rssi: i16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_decodings: Option<u32>,
}

/// Location event: one transmitter as observed by one or more
/// receivers at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Raddec {
    pub transmitter_id: String,
    pub transmitter_id_type: u8,
    #[serde(default)]
    pub rssi_signature: Vec<RssiObservation>,
    pub initial_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub packets: Option<Vec<String>>,
}

impl Raddec {
    /// Pre-combined transmitter signature used as the storage key.
    pub fn signature(&self) -> String {
        format!("{}/{}", self.transmitter_id, self.transmitter_id_type)
    }

    /// Initial observation time as an absolute UTC timestamp.
    pub fn occurred_at(&self) -> DomainResult<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.initial_time)
            .ok_or(DomainError::InvalidTimestamp(self.initial_time))
    }

    /// Flattened storage record. Packets are excluded unless the
    /// per-kind option requests them.
    pub fn to_record(&self, include_packets: bool) -> DomainResult<Value> {
        let mut record = serde_json::to_value(self)?;
        if !include_packets {
            if let Value::Object(map) = &mut record {
                map.remove("packets");
            }
        }
        Ok(record)
    }
}

/// Dynamic-ambient event: a timestamped bundle of sensor-derived
/// readings for one device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dynamb {
    pub device_id: String,
    pub device_id_type: u8,
    pub timestamp: i64,
    #[serde(flatten)]
    pub properties: Map<String, Value>,
}

impl Dynamb {
    pub fn signature(&self) -> String {
        format!("{}/{}", self.device_id, self.device_id_type)
    }

    pub fn occurred_at(&self) -> DomainResult<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
            .ok_or(DomainError::InvalidTimestamp(self.timestamp))
    }

    /// Storage record with the raw time-series property removed
    /// unconditionally (size containment).
    pub fn to_record(&self) -> DomainResult<Value> {
        let mut record = serde_json::to_value(self)?;
        if let Value::Object(map) = &mut record {
            map.remove(ACCELERATION_TIME_SERIES_PROPERTY);
        }
        Ok(record)
    }
}

/// GeoJSON geometry. Coordinates stay untyped so non-point geometries
/// deserialize without loss; only points are ever extracted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub geometry_type: String,
    #[serde(default)]
    pub coordinates: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub feature_type: String,
    pub geometry: Geometry,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub collection_type: String,
    #[serde(default)]
    pub features: Vec<Feature>,
}

/// Spatial event: a timestamped geospatial feature report for one
/// device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Spatem {
    pub device_id: String,
    pub device_id_type: u8,
    pub timestamp: i64,
    pub data: FeatureCollection,
}

impl Spatem {
    pub fn signature(&self) -> String {
        format!("{}/{}", self.device_id, self.device_id_type)
    }

    pub fn occurred_at(&self) -> DomainResult<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.timestamp)
            .ok_or(DomainError::InvalidTimestamp(self.timestamp))
    }

    /// The only feature the sink ever stores. None when the
    /// collection is empty.
    pub fn primary_feature(&self) -> Option<&Feature> {
        self.data.features.first()
    }

    /// 3D WKT point literal for the primary feature, when that
    /// feature is a point with at least x and y ordinates. A missing
    /// z ordinate defaults to 0. Any other geometry yields None and
    /// the event is dropped upstream.
    pub fn point_wkt(&self) -> Option<String> {
        let geometry = &self.primary_feature()?.geometry;
        if geometry.geometry_type != POINT_GEOMETRY_TYPE {
            return None;
        }
        let ordinates = geometry.coordinates.as_array()?;
        let x = ordinates.first()?.as_f64()?;
        let y = ordinates.get(1)?.as_f64()?;
        let z = ordinates.get(2).and_then(Value::as_f64).unwrap_or(0.0);
        Some(format!("POINT Z ({} {} {})", x, y, z))
    }

    /// Storage record retaining only the primary feature.
    pub fn to_record(&self) -> DomainResult<Value> {
        let mut truncated = self.clone();
        truncated.data.features.truncate(1);
        Ok(serde_json::to_value(&truncated)?)
    }
}

/// Tagged union over the supported event kinds.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    Raddec(Raddec),
    Dynamb(Dynamb),
    Spatem(Spatem),
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::Raddec(_) => EventKind::Raddec,
            Event::Dynamb(_) => EventKind::Dynamb,
            Event::Spatem(_) => EventKind::Spatem,
        }
    }

    /// Deserializes an inbound payload into the typed variant for a
    /// known kind.
    pub fn from_payload(kind: EventKind, payload: Value) -> DomainResult<Self> {
        let event = match kind {
            EventKind::Raddec => Event::Raddec(serde_json::from_value(payload)?),
            EventKind::Dynamb => Event::Dynamb(serde_json::from_value(payload)?),
            EventKind::Spatem => Event::Spatem(serde_json::from_value(payload)?),
        };
        Ok(event)
    }
}
