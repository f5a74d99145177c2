use std::cell::RefCell;
use std::rc::Rc;

use serde_json::Value;

use crate::error::{ConfigError, ConfigResult};
use crate::events::{callback, Callback, EventName, EventRegistry};
use crate::root::RootConfig;
use crate::value::{ConfigNode, ConfigValue};

/// Body type to name when a block-taking call is made without a body:
/// `builder.define_block("parser", None, None::<NoBody>)`.
pub type NoBody = fn(&mut ElementBuilder) -> ConfigResult<()>;

// ── ElementBuilder ────────────────────────────────────────────────────────

/// Accumulates the entries of one nesting level.
///
/// Nested bodies are built by child builders that share this builder's
/// event registry; each child is consumed as soon as its body has run and
/// only the resulting [`ConfigNode`] is kept.
///
/// ```rust
/// use serde_json::json;
/// use sluice_config::ElementBuilder;
///
/// let mut root = ElementBuilder::new();
/// root.define_input(vec![json!("file")], Some(|b: &mut ElementBuilder| {
///     b.set_scalar("path_prefix", &json!("data_"));
///     Ok(())
/// }))
/// .unwrap();
///
/// let tree = root.finalize();
/// assert_eq!(tree.get_node("in").unwrap().get_str("type"), Some("file"));
/// ```
pub struct ElementBuilder {
    element: ConfigNode,
    /// Shared with every child scope, so `on_start` registers at the root
    /// from any depth.
    events: Rc<RefCell<EventRegistry>>,
}

impl ElementBuilder {
    pub fn new() -> Self {
        Self {
            element: ConfigNode::new(),
            events: Rc::new(RefCell::new(EventRegistry::new())),
        }
    }

    fn child(&self) -> Self {
        Self { element: ConfigNode::new(), events: Rc::clone(&self.events) }
    }

    /// The entries written so far.
    pub fn element(&self) -> &ConfigNode {
        &self.element
    }

    // ── plain values ──────────────────────────────────────────────────────

    /// Store the string form of `value` under `name`.
    pub fn set_scalar(&mut self, name: impl Into<String>, value: &Value) -> &mut Self {
        self.element.insert(name, ConfigValue::Scalar(crate::value::stringify(value)));
        self
    }

    /// Store a sequence or mapping under `name` exactly as given.
    pub fn set_structured(&mut self, name: impl Into<String>, value: Value) -> &mut Self {
        self.element.insert(name, ConfigValue::Structured(value));
        self
    }

    // ── blocks ────────────────────────────────────────────────────────────

    /// Run `body` against a fresh child scope and store the result under
    /// `name`. A non-null `type_arg` is then written into the stored node as
    /// its `type` entry, replacing any `type` the body set.
    pub fn define_block<F>(
        &mut self,
        name: impl Into<String>,
        type_arg: Option<Value>,
        body: Option<F>,
    ) -> ConfigResult<&mut Self>
    where
        F: FnOnce(&mut ElementBuilder) -> ConfigResult<()>,
    {
        let name = name.into();
        let Some(body) = body else {
            return Err(ConfigError::missing_block(name));
        };

        let mut child = self.child();
        body(&mut child)?;
        let mut node = child.finalize();

        if let Some(type_arg) = type_arg.filter(|v| !v.is_null()) {
            node.insert("type", ConfigValue::from_argument(type_arg));
        }
        log::debug!("block `{}` built with {} entries", name, node.len());
        self.element.insert(name, node);
        Ok(self)
    }

    /// `input("type") { ... }`: a block stored under `in`.
    pub fn define_input<F>(&mut self, args: Vec<Value>, body: Option<F>) -> ConfigResult<&mut Self>
    where
        F: FnOnce(&mut ElementBuilder) -> ConfigResult<()>,
    {
        self.define_plugin("input", "in", args, body)
    }

    /// `output("type") { ... }`: a block stored under `out`.
    pub fn define_output<F>(&mut self, args: Vec<Value>, body: Option<F>) -> ConfigResult<&mut Self>
    where
        F: FnOnce(&mut ElementBuilder) -> ConfigResult<()>,
    {
        self.define_plugin("output", "out", args, body)
    }

    fn define_plugin<F>(
        &mut self,
        call: &str,
        key: &str,
        mut args: Vec<Value>,
        body: Option<F>,
    ) -> ConfigResult<&mut Self>
    where
        F: FnOnce(&mut ElementBuilder) -> ConfigResult<()>,
    {
        let type_arg = match args.pop() {
            Some(v) if args.is_empty() && !v.is_null() => v,
            _ => {
                return Err(ConfigError::arity(call, format!("{} block requires one argument", call)));
            }
        };
        if body.is_none() {
            return Err(ConfigError::missing_block(call));
        }
        self.define_block(key, Some(type_arg), body)
    }

    // ── events ────────────────────────────────────────────────────────────

    /// Fill the slot for `event` in the shared registry.
    pub fn register(&mut self, event: EventName, cb: Callback) -> &mut Self {
        self.events.borrow_mut().set(event, cb);
        self
    }

    pub fn register_on_start<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Option<Value>> + 'static,
    {
        self.register(EventName::Start, callback(f))
    }

    pub fn register_on_complete<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn(&[Value]) -> anyhow::Result<Option<Value>> + 'static,
    {
        self.register(EventName::Complete, callback(f))
    }

    // ── generic rule ──────────────────────────────────────────────────────

    /// Handle a call whose name is not reserved.
    ///
    /// - with a body: a block, the argument (if any) becomes its `type`
    /// - a sequence or mapping argument: stored as written
    /// - anything else: stored as a string (`""` when there is no argument)
    pub fn dispatch_generic_call<F>(
        &mut self,
        name: &str,
        mut args: Vec<Value>,
        body: Option<F>,
    ) -> ConfigResult<&mut Self>
    where
        F: FnOnce(&mut ElementBuilder) -> ConfigResult<()>,
    {
        if args.len() > 1 {
            return Err(ConfigError::arity(name, "only one argument allowed"));
        }
        let value = args.pop().unwrap_or(Value::Null);

        if body.is_some() {
            return self.define_block(name, Some(value), body);
        }
        match value {
            Value::Array(_) | Value::Object(_) => Ok(self.set_structured(name, value)),
            scalar => Ok(self.set_scalar(name, &scalar)),
        }
    }

    // ── finish ────────────────────────────────────────────────────────────

    /// Consume the scope and return what it built.
    pub fn finalize(self) -> ConfigNode {
        self.element
    }

    /// Consume the top-level scope and pair its tree with the registered
    /// lifecycle callbacks.
    pub fn into_root(self) -> RootConfig {
        let events = self.events.take();
        RootConfig::new(self.element, events)
    }
}

impl Default for ElementBuilder {
    fn default() -> Self {
        Self::new()
    }
}
