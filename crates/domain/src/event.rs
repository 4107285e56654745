//! Events — immutable, timestamped records of something a thing reported,
//! and the bounded log that keeps them in order.

use std::collections::VecDeque;

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::schema::DataSchema;
use crate::time::{Timestamp, now_after};

/// Advertised description of an event type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EventMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "@type", default, skip_serializing_if = "Option::is_none")]
    pub semantic_type: Option<String>,
    /// Schema of the event payload, flattened like a property schema.
    #[serde(flatten)]
    pub data: Option<DataSchema>,
}

impl EventMetadata {
    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn semantic_type(mut self, semantic_type: impl Into<String>) -> Self {
        self.semantic_type = Some(semantic_type.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn data(mut self, schema: DataSchema) -> Self {
        self.data = Some(schema);
        self
    }
}

/// A single emitted event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<JsonValue>,
    pub timestamp: Timestamp,
}

/// How much history an [`EventLog`] keeps.
///
/// Both bounds are optional; with neither set the log grows without limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventRetention {
    pub max_events: Option<usize>,
    pub max_age: Option<TimeDelta>,
}

impl EventRetention {
    /// Keep at most `max_events` entries.
    #[must_use]
    pub fn max_events(max_events: usize) -> Self {
        Self {
            max_events: Some(max_events),
            max_age: None,
        }
    }
}

/// Append-only, insertion-ordered log of events with timestamps that never
/// decrease.
#[derive(Debug, Default)]
pub struct EventLog {
    entries: VecDeque<EventRecord>,
    retention: EventRetention,
}

impl EventLog {
    #[must_use]
    pub fn new(retention: EventRetention) -> Self {
        Self {
            entries: VecDeque::new(),
            retention,
        }
    }

    /// Stamp and append a new event, then prune according to the retention
    /// policy. Returns a copy of the stored record.
    pub fn append(&mut self, name: impl Into<String>, data: Option<JsonValue>) -> EventRecord {
        let timestamp = now_after(self.entries.back().map(|e| e.timestamp));
        let record = EventRecord {
            name: name.into(),
            data,
            timestamp,
        };
        self.entries.push_back(record.clone());
        self.prune(timestamp);
        record
    }

    fn prune(&mut self, reference: Timestamp) {
        if let Some(max_events) = self.retention.max_events {
            while self.entries.len() > max_events {
                self.entries.pop_front();
            }
        }
        if let Some(max_age) = self.retention.max_age {
            let cutoff = reference - max_age;
            while self.entries.front().is_some_and(|e| e.timestamp < cutoff) {
                self.entries.pop_front();
            }
        }
    }

    /// Every retained event, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.entries.iter()
    }

    /// Events stamped at or after `since`, oldest first.
    pub fn since(&self, since: Timestamp) -> impl Iterator<Item = &EventRecord> {
        self.entries.iter().filter(move |e| e.timestamp >= since)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::NumericSchema;
    use serde_json::json;

    #[test]
    fn should_keep_insertion_order_with_non_decreasing_timestamps() {
        let mut log = EventLog::default();
        for i in 0..50 {
            log.append("tick", Some(json!(i)));
        }
        let entries: Vec<_> = log.iter().collect();
        assert_eq!(entries.len(), 50);
        for pair in entries.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
        assert_eq!(entries[0].data, Some(json!(0)));
        assert_eq!(entries[49].data, Some(json!(49)));
    }

    #[test]
    fn should_prune_oldest_when_count_bound_exceeded() {
        let mut log = EventLog::new(EventRetention::max_events(3));
        for i in 0..5 {
            log.append("tick", Some(json!(i)));
        }
        let data: Vec<_> = log.iter().filter_map(|e| e.data.clone()).collect();
        assert_eq!(data, vec![json!(2), json!(3), json!(4)]);
    }

    #[test]
    fn should_prune_entries_older_than_max_age() {
        let mut log = EventLog::new(EventRetention {
            max_events: None,
            max_age: Some(TimeDelta::hours(1)),
        });
        log.entries.push_back(EventRecord {
            name: "old".to_string(),
            data: None,
            timestamp: crate::time::now() - TimeDelta::hours(2),
        });
        log.append("fresh", None);
        let names: Vec<_> = log.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["fresh"]);
    }

    #[test]
    fn should_filter_events_since_timestamp() {
        let mut log = EventLog::default();
        log.entries.push_back(EventRecord {
            name: "before".to_string(),
            data: None,
            timestamp: crate::time::now() - TimeDelta::minutes(5),
        });
        let cutoff = crate::time::now() - TimeDelta::minutes(1);
        log.append("after", None);
        let names: Vec<_> = log.since(cutoff).map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["after"]);
    }

    #[test]
    fn should_flatten_data_schema_into_event_metadata() {
        let metadata = EventMetadata::default()
            .description("The lamp has exceeded its safe operating temperature")
            .data(DataSchema::Number(NumericSchema::default().unit("degree celsius")));
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["type"], "number");
        assert_eq!(json["unit"], "degree celsius");
    }

    #[test]
    fn should_deserialize_event_metadata_without_schema() {
        let metadata: EventMetadata =
            serde_json::from_value(json!({"description": "pressed"})).unwrap();
        assert!(metadata.data.is_none());
    }
}
