//! # Command Registry
//!
//! Chat/console commands keyed by name in a [`RecordStore`]. Each record's value is
//! the command's help line and its payload is the handler. A command line is split
//! on spaces into a string-kind [`TypedArray`] whose first element selects the
//! handler; the handler receives the whole array, name included.

use log::debug;

use super::auth::Privileges;
use crate::core::array::{split, ArrayError, TypedArray};
use crate::core::RecordStore;

/// Handler signature: shared context plus the split argument vector.
pub type CommandHandler<C> = Box<dyn Fn(&C, &TypedArray) -> Result<String, CommandError> + Send + Sync>;

/// Why a command line could not be run.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    /// The line had no words.
    #[error("empty command")]
    Empty,
    /// No command is registered under this name.
    #[error("unknown command: {0}")]
    Unknown(String),
    /// The caller lacks privileges the command requires.
    #[error("{command} requires privileges: {missing}")]
    Denied {
        /// Command that was refused.
        command: String,
        /// Comma-separated missing privileges.
        missing: String,
    },
    /// The handler rejected its arguments.
    #[error("usage: {0}")]
    Usage(String),
    /// The argument vector could not be built.
    #[error(transparent)]
    Args(#[from] ArrayError),
}

/// A registered command.
pub struct Command<C> {
    privs: Privileges,
    handler: CommandHandler<C>,
}

impl<C> Command<C> {
    /// Privileges needed to run this command.
    pub fn privileges(&self) -> Privileges {
        self.privs
    }
}

/// Name → [`Command`] table.
pub struct CommandRegistry<C> {
    commands: RecordStore<Command<C>>,
}

impl<C> Default for CommandRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> CommandRegistry<C> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            commands: RecordStore::new(),
        }
    }

    /// Registers (or replaces) the command `name`.
    pub fn register<F>(&mut self, name: &str, privs: Privileges, help: &str, handler: F)
    where
        F: Fn(&C, &TypedArray) -> Result<String, CommandError> + Send + Sync + 'static,
    {
        debug!("registering command {name}");
        let command = Command {
            privs,
            handler: Box::new(handler),
        };
        self.commands.set(name, Some(help), Some(command));
    }

    /// Help line of `name`.
    pub fn help(&self, name: &str) -> Option<&str> {
        self.commands.get_str(name)
    }

    /// The command registered as `name`.
    pub fn get(&self, name: &str) -> Option<&Command<C>> {
        self.commands.get_data(name)
    }

    /// Registered command names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.commands.names().collect();
        names.sort_unstable();
        names
    }

    /// Splits `line`, checks `caller` against the command's privileges and runs it.
    pub fn dispatch(&self, ctx: &C, caller: Privileges, line: &str) -> Result<String, CommandError> {
        let args = split(line.trim(), " ", false)?;
        let Some(name) = args.get_string(0) else {
            return Err(CommandError::Empty);
        };
        let command = self
            .commands
            .get_data(&name)
            .ok_or_else(|| CommandError::Unknown(name.to_string()))?;

        if !caller.contains(command.privs) {
            return Err(CommandError::Denied {
                command: name.to_string(),
                missing: (command.privs - caller).to_text(),
            });
        }
        (command.handler)(ctx, &args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn registry() -> CommandRegistry<AtomicU32> {
        let mut registry = CommandRegistry::new();
        registry.register("add", Privileges::empty(), "add <n>", |total: &AtomicU32, args: &TypedArray| {
            if args.len() != 2 {
                return Err(CommandError::Usage("add <n>".into()));
            }
            let n = args.get_int(1);
            Ok((total.fetch_add(n, Ordering::AcqRel) + n).to_string())
        });
        registry.register("reset", Privileges::SERVER, "reset", |total: &AtomicU32, _: &TypedArray| {
            total.store(0, Ordering::Release);
            Ok(String::new())
        });
        registry
    }

    #[test]
    fn dispatches_with_split_arguments() {
        let total = AtomicU32::new(0);
        let registry = registry();
        assert_eq!(registry.dispatch(&total, Privileges::empty(), "add 5").unwrap(), "5");
        assert_eq!(registry.dispatch(&total, Privileges::empty(), "  add   7 ").unwrap(), "12");
        assert_eq!(
            registry.dispatch(&total, Privileges::empty(), "add"),
            Err(CommandError::Usage("add <n>".into()))
        );
    }

    #[test]
    fn errors_for_empty_unknown_and_denied() {
        let total = AtomicU32::new(3);
        let registry = registry();
        assert_eq!(registry.dispatch(&total, Privileges::all(), "   "), Err(CommandError::Empty));
        assert_eq!(
            registry.dispatch(&total, Privileges::all(), "fly"),
            Err(CommandError::Unknown("fly".into()))
        );
        assert_eq!(
            registry.dispatch(&total, Privileges::BUILD, "reset"),
            Err(CommandError::Denied {
                command: "reset".into(),
                missing: "server".into()
            })
        );
        registry.dispatch(&total, Privileges::SERVER, "reset").unwrap();
        assert_eq!(total.load(Ordering::Acquire), 0);
    }

    #[test]
    fn help_and_names() {
        let registry = registry();
        assert_eq!(registry.help("add"), Some("add <n>"));
        assert_eq!(registry.names(), vec!["add", "reset"]);
        assert_eq!(registry.get("reset").map(Command::privileges), Some(Privileges::SERVER));
        assert!(registry.help("nope").is_none());
    }
}
