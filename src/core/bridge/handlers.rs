//! Registration table for host → app commands.
//!
//! Handlers are looked up by name and invoked against a caller-supplied
//! context (the app state in production, a plain struct in tests).  The
//! table is built once at startup and passed to the event loop.

use std::collections::HashMap;

use serde_json::Value;

use super::error::{BridgeError, Result};
use super::protocol::HostCommand;

pub type Handler<C> = Box<dyn Fn(&mut C, Option<&Value>) -> Result<()> + Send + Sync>;

pub struct HostHandlers<C> {
    handlers: HashMap<String, Handler<C>>,
}

impl<C> Default for HostHandlers<C> {
    fn default() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }
}

impl<C> HostHandlers<C> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` under `name`, replacing any earlier entry.
    pub fn register<F>(&mut self, name: impl Into<String>, handler: F) -> &mut Self
    where
        F: Fn(&mut C, Option<&Value>) -> Result<()> + Send + Sync + 'static,
    {
        let name = name.into();
        if self.handlers.insert(name.clone(), Box::new(handler)).is_some() {
            tracing::warn!(name, "bridge: handler replaced");
        }
        self
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn dispatch(&self, ctx: &mut C, command: &HostCommand) -> Result<()> {
        let handler = self
            .handlers
            .get(&command.command)
            .ok_or_else(|| BridgeError::UnknownCommand(command.command.clone()))?;
        handler(ctx, command.params.as_ref())
    }
}

/// Extract a string parameter or fail with `InvalidParams`.
pub fn str_param<'a>(command: &str, params: Option<&'a Value>) -> Result<&'a str> {
    params
        .and_then(Value::as_str)
        .ok_or_else(|| BridgeError::InvalidParams {
            command: command.to_string(),
            reason: "expected a string".into(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[derive(Default)]
    struct Counter {
        hits: u32,
        last: String,
    }

    fn table() -> HostHandlers<Counter> {
        let mut t = HostHandlers::new();
        t.register("bump", |c: &mut Counter, _| {
            c.hits += 1;
            Ok(())
        })
        .register("say", |c: &mut Counter, params| {
            c.last = str_param("say", params)?.to_string();
            Ok(())
        });
        t
    }

    fn cmd(name: &str, params: Option<Value>) -> HostCommand {
        HostCommand {
            command: name.into(),
            params,
        }
    }

    #[test]
    fn dispatch_runs_registered_handler() {
        let t = table();
        let mut c = Counter::default();
        t.dispatch(&mut c, &cmd("bump", None)).unwrap();
        t.dispatch(&mut c, &cmd("bump", None)).unwrap();
        t.dispatch(&mut c, &cmd("say", Some(json!("hi")))).unwrap();
        assert_eq!(c.hits, 2);
        assert_eq!(c.last, "hi");
    }

    #[test]
    fn unknown_command_is_reported() {
        let t = table();
        let mut c = Counter::default();
        let err = t.dispatch(&mut c, &cmd("nope", None)).unwrap_err();
        assert!(matches!(err, BridgeError::UnknownCommand(ref n) if n == "nope"));
    }

    #[test]
    fn bad_params_are_reported() {
        let t = table();
        let mut c = Counter::default();
        let err = t.dispatch(&mut c, &cmd("say", Some(json!(5)))).unwrap_err();
        assert!(matches!(err, BridgeError::InvalidParams { .. }));
        assert_eq!(c.last, "");
    }

    #[test]
    fn names_are_sorted() {
        assert_eq!(table().names(), vec!["bump", "say"]);
    }
}
