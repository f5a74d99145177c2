//! Lifecycle callbacks registered by `on_start` / `on_complete`.

use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde_json::Value;

use crate::error::ConfigError;

/// A registered lifecycle callback.
///
/// Receives the arguments forwarded by the driver and may hand a value back.
/// Errors are returned to the driver untouched.
pub type Callback = Rc<dyn Fn(&[Value]) -> anyhow::Result<Option<Value>>>;

/// Wrap a closure as a [`Callback`].
pub fn callback<F>(f: F) -> Callback
where
    F: Fn(&[Value]) -> anyhow::Result<Option<Value>> + 'static,
{
    Rc::new(f)
}

// ── EventName ─────────────────────────────────────────────────────────────

/// The closed set of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventName {
    /// Fired once before processing begins.
    Start,
    /// Fired once after processing ends, with the driver's result data.
    Complete,
}

impl EventName {
    pub const ALL: [EventName; 2] = [EventName::Start, EventName::Complete];

    pub fn as_str(self) -> &'static str {
        match self {
            EventName::Start => "start",
            EventName::Complete => "complete",
        }
    }

    /// The DSL call that registers this event: `on_start`, `on_complete`.
    pub fn slot(self) -> &'static str {
        match self {
            EventName::Start => "on_start",
            EventName::Complete => "on_complete",
        }
    }
}

impl FromStr for EventName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "start" => Ok(EventName::Start),
            "complete" => Ok(EventName::Complete),
            other => Err(ConfigError::UnknownEvent(other.to_string())),
        }
    }
}

impl fmt::Display for EventName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── EventRegistry ─────────────────────────────────────────────────────────

/// One optional callback slot per [`EventName`].
#[derive(Clone, Default)]
pub struct EventRegistry {
    on_start: Option<Callback>,
    on_complete: Option<Callback>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fill the slot for `event`, replacing any earlier registration.
    pub fn set(&mut self, event: EventName, callback: Callback) {
        log::trace!("registering {} callback", event.slot());
        *self.slot_mut(event) = Some(callback);
    }

    pub fn get(&self, event: EventName) -> Option<&Callback> {
        match event {
            EventName::Start => self.on_start.as_ref(),
            EventName::Complete => self.on_complete.as_ref(),
        }
    }

    pub fn is_registered(&self, event: EventName) -> bool {
        self.get(event).is_some()
    }

    fn slot_mut(&mut self, event: EventName) -> &mut Option<Callback> {
        match event {
            EventName::Start => &mut self.on_start,
            EventName::Complete => &mut self.on_complete,
        }
    }
}

impl fmt::Debug for EventRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventRegistry")
            .field("on_start", &self.on_start.is_some())
            .field("on_complete", &self.on_complete.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn event_names_round_trip() {
        for event in EventName::ALL {
            assert_eq!(event.as_str().parse::<EventName>().unwrap(), event);
        }
        assert_eq!(EventName::Complete.slot(), "on_complete");
    }

    #[test]
    fn unknown_event_name() {
        let err = "bogus".parse::<EventName>().unwrap_err();
        assert!(matches!(err, ConfigError::UnknownEvent(ref n) if n == "bogus"));
        // the slot name is not an event name
        assert!("on_start".parse::<EventName>().is_err());
    }

    #[test]
    fn later_registration_overwrites() {
        let mut reg = EventRegistry::new();
        reg.set(EventName::Start, callback(|_| Ok(Some(json!(1)))));
        reg.set(EventName::Start, callback(|_| Ok(Some(json!(2)))));

        let cb = reg.get(EventName::Start).unwrap();
        assert_eq!(cb(&[]).unwrap(), Some(json!(2)));
        assert!(!reg.is_registered(EventName::Complete));
    }

    #[test]
    fn debug_shows_registration_only() {
        let mut reg = EventRegistry::new();
        reg.set(EventName::Complete, callback(|_| Ok(None)));
        assert_eq!(
            format!("{:?}", reg),
            "EventRegistry { on_start: false, on_complete: true }"
        );
    }
}
