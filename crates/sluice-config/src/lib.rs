//! Turns sluice DSL source into a configuration tree plus lifecycle hooks.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`value`] | `ConfigNode`, `ConfigValue` |
//! | [`builder`] | `ElementBuilder`, one scope per nesting level |
//! | [`events`] | `EventName`, `EventRegistry`, `Callback` |
//! | [`root`] | `RootConfig`, the tree paired with its events |
//! | [`interp`] | `parse`, evaluating DSL calls against builders |
//! | [`loader`] | `ConfigLoader` (DSL, JSON, YAML, properties), `ExecConfig`, `ExecEvent` |
//! | [`logging`] | `init_logging` for drivers |
//!
//! # Reserved calls
//!
//! | Call | Effect |
//! |------|--------|
//! | `input(type) { ... }` | block stored under `in`, stamped with `type` |
//! | `output(type) { ... }` | block stored under `out`, stamped with `type` |
//! | `on_start { ... }` | callback fired by `dispatch_event("start")` |
//! | `on_complete { ... }` | callback fired by `dispatch_event("complete", diff)` |
//!
//! Every other name follows the generic rule: a block when a body is given
//! (its argument becoming the block's `type`), a sequence or mapping stored
//! as written, or a scalar stored as a string.
//!
//! # Quick start
//!
//! ```rust
//! use sluice_config::parse;
//!
//! let config = parse(r#"
//!     input("file") {
//!         path_prefix "data_"
//!         parser("csv") { charset "UTF-8" }
//!     }
//!     output("stdout") {}
//! "#).unwrap();
//!
//! let input = config.root_element().get_node("in").unwrap();
//! assert_eq!(input.get_str("type"), Some("file"));
//! assert_eq!(input.get_node("parser").unwrap().get_str("type"), Some("csv"));
//!
//! // nothing registered for `start`: a no-op
//! assert_eq!(config.dispatch_event("start", &[]).unwrap(), None);
//! ```

pub mod builder;
pub mod error;
pub mod events;
pub mod interp;
pub mod loader;
pub mod logging;
pub mod root;
pub mod value;

pub use builder::{ElementBuilder, NoBody};
pub use error::{ConfigError, ConfigResult};
pub use events::{callback, Callback, EventName, EventRegistry};
pub use interp::parse;
pub use loader::{ConfigLoader, ExecConfig, ExecEvent, SourceFormat};
pub use root::RootConfig;
pub use value::{ConfigNode, ConfigValue};
