//! Flat, string keyed snapshot of a store for file writers.

use indexmap::IndexMap;
use serde::Serialize;

use crate::{ChannelId, WaveformStore};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExportValue {
    Integer(i64),
    Float(f64),
    Integers(Vec<i64>),
    Floats(Vec<f64>),
    Channels(Vec<ChannelId>),
}

impl WaveformStore {
    /// Snapshot every channel under keys `maxVal`, `channels`, and `<field><channel>` for each
    /// preamble field plus `rawData`, `time` and `ch`.
    pub fn to_mapping(&self) -> IndexMap<String, ExportValue> {
        let mut out = IndexMap::new();
        out.insert("maxVal".to_owned(),
            ExportValue::Integer(self.configuration().full_scale as i64));
        out.insert("channels".to_owned(),
            ExportValue::Channels(self.channels().collect()));
        for (channel, record) in self.records() {
            let preamble = &record.preamble;
            let mut put = |field: &str, value: ExportValue| {
                out.insert(format!("{}{}", field, channel), value);
            };
            put("rawData", ExportValue::Integers(record.raw.clone()));
            put("format", ExportValue::Float(preamble.format));
            put("type", ExportValue::Float(preamble.kind));
            put("points", ExportValue::Float(preamble.points));
            put("count", ExportValue::Integer(preamble.count));
            put("xIncrement", ExportValue::Float(preamble.x_increment));
            put("xOrigin", ExportValue::Float(preamble.x_origin));
            put("xReference", ExportValue::Float(preamble.x_reference));
            put("yIncrement", ExportValue::Float(preamble.y_increment));
            put("yOrigin", ExportValue::Float(preamble.y_origin));
            put("yReference", ExportValue::Float(preamble.y_reference));
            put("time", ExportValue::Floats(record.time().collect()));
            put("ch", ExportValue::Floats(record.volts().collect()));
        }
        log::debug!("exported {} channels as {} keys", self.len(), out.len());
        out
    }
}
