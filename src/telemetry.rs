// Copyright (c) 2025 Hive Adapter Contributors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Fire-and-forget usage tracking.
//!
//! Every operational event (connection open/close, query start/end, ...)
//! is reported through a [`UsageTracker`]. Delivery is strictly
//! best-effort: a tracker must swallow its own failures, and callers never
//! branch on the outcome. Profiles can opt out, which swaps in the
//! [`NoopTracker`].

use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Event kinds reported to the usage collector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackingEventType {
    Open,
    Close,
    StartQuery,
    EndQuery,
    Debug,
    ModelAccess,
    Incremental,
}

/// One usage record. Optional fields are populated per event type.
#[derive(Debug, Clone, Serialize)]
pub struct UsageEvent {
    pub event_type: TrackingEventType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connection_state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<serde_json::Value>,
}

impl UsageEvent {
    pub fn new(event_type: TrackingEventType) -> Self {
        Self {
            event_type,
            auth: None,
            connection_state: None,
            elapsed_time: None,
            sql: None,
            status: None,
            profile: None,
            permissions: None,
        }
    }

    pub fn auth(mut self, auth: impl Into<String>) -> Self {
        self.auth = Some(auth.into());
        self
    }

    pub fn connection_state(mut self, state: impl Into<String>) -> Self {
        self.connection_state = Some(state.into());
        self
    }

    /// Elapsed wall time, recorded with two-decimal precision.
    pub fn elapsed(mut self, elapsed: std::time::Duration) -> Self {
        self.elapsed_time = Some((elapsed.as_secs_f64() * 100.0).round() / 100.0);
        self
    }

    pub fn sql(mut self, sql: impl Into<String>) -> Self {
        self.sql = Some(sql.into());
        self
    }

    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }

    pub fn profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    pub fn permissions(mut self, permissions: serde_json::Value) -> Self {
        self.permissions = Some(permissions);
        self
    }
}

/// Sink for usage events. Implementations must never panic and must
/// swallow delivery failures internally.
pub trait UsageTracker: Send + Sync + fmt::Debug {
    fn track(&self, event: UsageEvent);
}

/// Default sink: serializes the event and emits it at debug level.
#[derive(Debug, Default)]
pub struct LogTracker;

impl UsageTracker for LogTracker {
    fn track(&self, event: UsageEvent) {
        match serde_json::to_string(&event) {
            Ok(payload) => debug!(target: "hive_adapter::usage", "{payload}"),
            Err(e) => debug!("failed to serialize usage event: {e}"),
        }
    }
}

/// Sink used when the profile opts out of usage tracking.
#[derive(Debug, Default)]
pub struct NoopTracker;

impl UsageTracker for NoopTracker {
    fn track(&self, _event: UsageEvent) {}
}

/// Pick the tracker for a profile's opt-out flag.
pub fn tracker_for(usage_tracking: bool) -> Arc<dyn UsageTracker> {
    if usage_tracking {
        Arc::new(LogTracker)
    } else {
        Arc::new(NoopTracker)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Records events for assertions.
    #[derive(Debug, Default)]
    struct RecordingTracker {
        events: Mutex<Vec<UsageEvent>>,
    }

    impl UsageTracker for RecordingTracker {
        fn track(&self, event: UsageEvent) {
            self.events.lock().unwrap().push(event);
        }
    }

    #[test]
    fn test_elapsed_rounds_to_two_decimals() {
        let event =
            UsageEvent::new(TrackingEventType::EndQuery).elapsed(Duration::from_millis(1234));
        assert_eq!(event.elapsed_time, Some(1.23));
    }

    #[test]
    fn test_event_serialization_skips_empty_fields() {
        let event = UsageEvent::new(TrackingEventType::Open).auth("LDAP");
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["event_type"], "open");
        assert_eq!(json["auth"], "LDAP");
        assert!(json.get("sql").is_none());
    }

    #[test]
    fn test_recording_tracker_preserves_order() {
        let tracker = RecordingTracker::default();
        tracker.track(UsageEvent::new(TrackingEventType::StartQuery));
        tracker.track(UsageEvent::new(TrackingEventType::EndQuery));
        let events = tracker.events.lock().unwrap();
        assert_eq!(events[0].event_type, TrackingEventType::StartQuery);
        assert_eq!(events[1].event_type, TrackingEventType::EndQuery);
    }
}
