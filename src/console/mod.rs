//! The command interpreter.
//!
//! [`Console::execute`] takes one raw input line, parses it with
//! [`parse_line`], validates it against the registry and the store, runs it,
//! and writes the result (or a single-line error) to the given writer. It
//! never fails: the only signal back to the caller is whether the read loop
//! should stop.
//!
//! Validation runs in a fixed order and stops at the first failure:
//! class name present, class registered, id present, instance exists, then
//! (for `update`) attribute name and value present.

mod command;
mod error;
mod help;
mod literal;

pub use command::{parse_line, Command, SyntaxError, Verb};
pub use error::ConsoleError;
pub use literal::{parse_arguments, Literal, ParseError};

use std::io::Write;

use crate::models::{is_reserved, Value};
use crate::storage::ObjectStore;

/// Prompt shown by the interactive read loop.
pub const PROMPT: &str = "(hbnb) ";

/// ANSI clear screen, cursor home.
pub const CLEAR_SCREEN: &str = "\x1b[2J\x1b[H";

/// What one line writes back.
enum Reply {
    Silent,
    Line(String),
    ClearScreen,
}

pub struct Console<'s> {
    store: &'s mut ObjectStore,
    interactive: bool,
}

impl<'s> Console<'s> {
    pub fn new(store: &'s mut ObjectStore) -> Self {
        Self {
            store,
            interactive: false,
        }
    }

    /// Whether output goes to a terminal. Only then does `cls` clear it.
    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    pub fn store(&self) -> &ObjectStore {
        self.store
    }

    /// Run one input line, writing any output to `out`.
    ///
    /// Returns `true` when the read loop should stop (`quit`, `EOF`).
    pub fn execute<W: Write>(&mut self, line: &str, out: &mut W) -> bool {
        let (stop, reply) = self.run(line);
        let written = match reply {
            Reply::Silent => Ok(()),
            Reply::Line(text) => writeln!(out, "{}", text),
            Reply::ClearScreen => write!(out, "{}", CLEAR_SCREEN).and_then(|()| out.flush()),
        };
        if let Err(e) = written {
            tracing::error!(error = %e, "Failed to write console output");
        }
        stop
    }

    fn run(&mut self, line: &str) -> (bool, Reply) {
        let cmd = match parse_line(line) {
            Ok(Some(cmd)) => cmd,
            Ok(None) => return (false, Reply::Silent),
            Err(e) => {
                tracing::debug!(line, error = %e, "Rejected input");
                let err = ConsoleError::Syntax(line.trim().to_string());
                return (false, Reply::Line(err.to_string()));
            }
        };

        match cmd.verb {
            Verb::Quit | Verb::Eof => (true, Reply::Silent),
            Verb::Clear if self.interactive => (false, Reply::ClearScreen),
            Verb::Clear => (false, Reply::Silent),
            Verb::Help => (false, Reply::Line(self.help(cmd.class_name.as_deref()))),
            _ => match self.dispatch(&cmd) {
                Ok(Some(text)) => (false, Reply::Line(text)),
                Ok(None) => (false, Reply::Silent),
                Err(e) => (false, Reply::Line(e.to_string())),
            },
        }
    }

    fn help(&self, topic: Option<&str>) -> String {
        match topic {
            None => help::overview(),
            Some(name) => help::topic(name)
                .map(String::from)
                .unwrap_or_else(|| ConsoleError::NoHelp(name.to_string()).to_string()),
        }
    }

    fn dispatch(&mut self, cmd: &Command) -> Result<Option<String>, ConsoleError> {
        match cmd.verb {
            Verb::Create => {
                let class_name = self.require_class(cmd)?;
                let obj = self.store.create(class_name)?;
                Ok(Some(obj.id().to_string()))
            }
            Verb::Show => {
                let (class_name, id) = self.require_instance(cmd)?;
                let obj = self
                    .store
                    .get(class_name, id)
                    .ok_or(ConsoleError::InstanceNotFound)?;
                Ok(Some(obj.to_string()))
            }
            Verb::Destroy => {
                let (class_name, id) = self.require_instance(cmd)?;
                self.store.delete(class_name, id)?;
                Ok(None)
            }
            Verb::All => {
                let filter = match cmd.class_name.as_deref() {
                    None => None,
                    Some(_) => Some(self.require_class(cmd)?),
                };
                let forms: Vec<String> = self
                    .store
                    .all(filter)
                    .into_iter()
                    .map(|obj| obj.to_string())
                    .collect();
                Ok(Some(format!("[{}]", forms.join(", "))))
            }
            Verb::Count => {
                let class_name = self.require_class(cmd)?;
                Ok(Some(self.store.count(Some(class_name)).to_string()))
            }
            Verb::Update => {
                let (class_name, id) = self.require_instance(cmd)?;
                let updates = update_pairs(cmd)?;
                self.store.set_attributes(class_name, id, updates)?;
                Ok(None)
            }
            Verb::Help | Verb::Quit | Verb::Eof | Verb::Clear => Ok(None),
        }
    }

    /// Class name present and registered.
    fn require_class<'c>(&self, cmd: &'c Command) -> Result<&'c str, ConsoleError> {
        let class_name = cmd
            .class_name
            .as_deref()
            .ok_or(ConsoleError::MissingClassName)?;
        if !self.store.registry().contains(class_name) {
            return Err(ConsoleError::UnknownClass);
        }
        Ok(class_name)
    }

    /// Class checks, then id present and the instance live in the store.
    fn require_instance<'c>(
        &self,
        cmd: &'c Command,
    ) -> Result<(&'c str, &'c str), ConsoleError> {
        let class_name = self.require_class(cmd)?;
        let id = cmd.id.as_deref().ok_or(ConsoleError::MissingInstanceId)?;
        if self.store.get(class_name, id).is_none() {
            return Err(ConsoleError::InstanceNotFound);
        }
        Ok((class_name, id))
    }
}

/// The attribute writes an `update` performs, in order. Every name is
/// checked before any write happens.
fn update_pairs(cmd: &Command) -> Result<Vec<(String, Value)>, ConsoleError> {
    let pairs = match &cmd.dict_arg {
        Some(pairs) => pairs.clone(),
        None => {
            let key = cmd
                .positional_args
                .first()
                .ok_or(ConsoleError::MissingAttributeName)?;
            let value = cmd
                .positional_args
                .get(1)
                .ok_or(ConsoleError::MissingAttributeValue)?;
            vec![(key.to_text(), value.clone())]
        }
    };

    if let Some((key, _)) = pairs.iter().find(|(key, _)| is_reserved(key)) {
        tracing::warn!(
            class = ?cmd.class_name,
            id = ?cmd.id,
            attribute = %key,
            "Refusing to update reserved attribute"
        );
        return Err(ConsoleError::ReadOnlyAttribute(key.clone()));
    }
    Ok(pairs)
}
