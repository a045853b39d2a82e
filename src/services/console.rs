//! # Server Console
//!
//! Ties the config table, [`AuthStore`], [`BanList`] and a [`CommandRegistry`]
//! together into the administrative console the binary reads from stdin.
//!
//! ## Commands
//! - `set <name> <value...>` / `get <name>`: config table
//! - `privs <player>`, `grant <player> <privs>`, `revoke <player> <privs>`
//! - `ban <address> <player>`, `unban <address|player>`, `bans`
//! - `help [command]`

use log::{info, warn};

use super::auth::{AuthStore, Privileges};
use super::bans::BanList;
use super::commands::{CommandError, CommandRegistry};
use crate::core::array::TypedArray;
use crate::core::SharedStore;
use crate::settings::Settings;

/// Session-scoped server state plus the commands that operate on it.
pub struct Console {
    /// Free-form configuration table.
    pub config: SharedStore<()>,
    /// Player privileges.
    pub auth: AuthStore,
    /// Address bans.
    pub bans: BanList,
    settings: Settings,
    commands: CommandRegistry<Console>,
}

fn arg(args: &TypedArray, index: usize, usage: &str) -> Result<String, CommandError> {
    args.get_string(index)
        .map(|s| s.into_owned())
        .ok_or_else(|| CommandError::Usage(usage.to_owned()))
}

impl Console {
    /// Creates a console with empty tables and the built-in commands registered.
    pub fn new(settings: Settings) -> Self {
        let mut console = Self {
            config: SharedStore::new(),
            auth: AuthStore::new(),
            bans: BanList::new(),
            settings,
            commands: CommandRegistry::new(),
        };
        console.register_builtins();
        console
    }

    /// Runs one console line with full privileges.
    pub fn execute(&self, line: &str) -> Result<String, CommandError> {
        self.commands.dispatch(self, Privileges::all(), line)
    }

    /// Runs one line on behalf of `player`, using their stored privileges.
    pub fn execute_as(&self, player: &str, line: &str) -> Result<String, CommandError> {
        let privs = self.auth.get(player).unwrap_or_default();
        self.commands.dispatch(self, privs, line)
    }

    /// Waits for every table to be released, then empties them.
    pub fn shutdown(&self) {
        for (name, store) in [
            ("config", &self.config),
            ("auth", self.auth.store()),
            ("bans", self.bans.store()),
        ] {
            if let Err(err) = store.unlock_complete(&self.settings) {
                warn!("{name} table still locked at shutdown: {err}");
            }
            store.free(true);
        }
        info!("console shut down");
    }

    fn register_builtins(&mut self) {
        let commands = &mut self.commands;

        commands.register("set", Privileges::SERVER, "set <name> <value...>", |c: &Console, args: &TypedArray| {
            let name = arg(args, 1, "set <name> <value...>")?;
            let value = args
                .join(None, 2)
                .ok_or_else(|| CommandError::Usage("set <name> <value...>".into()))?;
            c.config.set(&name, Some(&value), None);
            Ok(format!("{name} = {value}"))
        });

        commands.register("get", Privileges::empty(), "get <name>", |c: &Console, args: &TypedArray| {
            let name = arg(args, 1, "get <name>")?;
            Ok(match c.config.get_str(&name) {
                Some(value) => format!("{name} = {value}"),
                None => format!("{name} is not set"),
            })
        });

        commands.register("privs", Privileges::empty(), "privs <player>", |c: &Console, args: &TypedArray| {
            let player = arg(args, 1, "privs <player>")?;
            Ok(match c.auth.get(&player) {
                Some(privs) => format!("{player}: {}", privs.to_text()),
                None => format!("{player} is unknown"),
            })
        });

        commands.register("grant", Privileges::PRIVS, "grant <player> <priv,...>", |c: &Console, args: &TypedArray| {
            let player = arg(args, 1, "grant <player> <priv,...>")?;
            let privs = Privileges::parse(&arg(args, 2, "grant <player> <priv,...>")?);
            Ok(format!("{player}: {}", c.auth.add(&player, privs).to_text()))
        });

        commands.register("revoke", Privileges::PRIVS, "revoke <player> <priv,...>", |c: &Console, args: &TypedArray| {
            let player = arg(args, 1, "revoke <player> <priv,...>")?;
            let privs = Privileges::parse(&arg(args, 2, "revoke <player> <priv,...>")?);
            Ok(match c.auth.remove(&player, privs) {
                Some(left) => format!("{player}: {}", left.to_text()),
                None => format!("{player} is unknown"),
            })
        });

        commands.register("ban", Privileges::BAN, "ban <address> <player>", |c: &Console, args: &TypedArray| {
            let address = arg(args, 1, "ban <address> <player>")?;
            let player = arg(args, 2, "ban <address> <player>")?;
            c.bans.add(&address, &player);
            Ok(format!("banned {address} ({player})"))
        });

        commands.register("unban", Privileges::BAN, "unban <address|player>", |c: &Console, args: &TypedArray| {
            let target = arg(args, 1, "unban <address|player>")?;
            let lifted = if c.bans.remove_address(&target) {
                1
            } else {
                c.bans.remove_name(&target)
            };
            Ok(format!("lifted {lifted} ban(s)"))
        });

        commands.register("bans", Privileges::BAN, "bans", |c: &Console, _: &TypedArray| {
            Ok(c.bans.list().join("\n"))
        });

        commands.register("help", Privileges::empty(), "help [command]", |c: &Console, args: &TypedArray| {
            match args.get_string(1) {
                Some(name) => c
                    .commands
                    .help(&name)
                    .map(str::to_owned)
                    .ok_or_else(|| CommandError::Unknown(name.into_owned())),
                None => Ok(c.commands.names().join(" ")),
            }
        });
    }
}
