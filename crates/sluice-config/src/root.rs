use serde_json::Value;

use crate::events::{EventName, EventRegistry};
use crate::value::ConfigNode;

// ── RootConfig ────────────────────────────────────────────────────────────

/// A finished configuration: the whole tree plus its lifecycle callbacks.
///
/// Both halves are fixed at construction; the driver only reads the tree
/// and fires events.
#[derive(Debug, Clone)]
pub struct RootConfig {
    root: ConfigNode,
    events: EventRegistry,
}

impl RootConfig {
    pub fn new(root: ConfigNode, events: EventRegistry) -> Self {
        Self { root, events }
    }

    /// The top-level node.
    pub fn root_element(&self) -> &ConfigNode {
        &self.root
    }

    pub fn events(&self) -> &EventRegistry {
        &self.events
    }

    /// Fire the event called `name` with `args`.
    ///
    /// An unregistered event is a no-op returning `Ok(None)`. A name outside
    /// `start` / `complete` fails with [`ConfigError::UnknownEvent`]
    /// (recover it with `downcast_ref`). Whatever the callback returns,
    /// error included, is handed back as is.
    ///
    /// [`ConfigError::UnknownEvent`]: crate::ConfigError::UnknownEvent
    pub fn dispatch_event(&self, name: &str, args: &[Value]) -> anyhow::Result<Option<Value>> {
        let event: EventName = name.parse()?;
        self.dispatch(event, args)
    }

    pub fn dispatch(&self, event: EventName, args: &[Value]) -> anyhow::Result<Option<Value>> {
        match self.events.get(event) {
            Some(cb) => {
                log::debug!("dispatching `{}` with {} argument(s)", event, args.len());
                cb(args)
            }
            None => {
                log::debug!("no `{}` callback registered", event.slot());
                Ok(None)
            }
        }
    }

    pub fn into_parts(self) -> (ConfigNode, EventRegistry) {
        (self.root, self.events)
    }
}
