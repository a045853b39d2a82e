//! Player privilege store.
//!
//! Privileges are kept as their comma-separated text form (`"build,shout"`) so the
//! table can be persisted by replaying plain string values.

use bitflags::bitflags;

use crate::core::array::{split, TypedArray};
use crate::core::SharedStore;

bitflags! {
    /// What a player is allowed to do.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Privileges: u32 {
        /// Place and dig nodes.
        const BUILD = 1 << 0;
        /// Teleport self and others.
        const TELEPORT = 1 << 1;
        /// Change the time of day.
        const SETTIME = 1 << 2;
        /// Grant and revoke privileges.
        const PRIVS = 1 << 3;
        /// Change server settings.
        const SERVER = 1 << 4;
        /// Talk in chat.
        const SHOUT = 1 << 5;
        /// Ban and unban players.
        const BAN = 1 << 6;
    }
}

const PRIVILEGE_NAMES: [(&str, Privileges); 7] = [
    ("build", Privileges::BUILD),
    ("teleport", Privileges::TELEPORT),
    ("settime", Privileges::SETTIME),
    ("privs", Privileges::PRIVS),
    ("server", Privileges::SERVER),
    ("shout", Privileges::SHOUT),
    ("ban", Privileges::BAN),
];

impl Privileges {
    /// Privileges new players start with.
    pub const DEFAULT_PLAYER: Privileges = Privileges::BUILD.union(Privileges::SHOUT);

    /// Parses a comma-separated list. Unknown names are ignored.
    ///
    /// ```
    /// use voxel_core::services::Privileges;
    ///
    /// let privs = Privileges::parse("build, shout,flying");
    /// assert_eq!(privs, Privileges::BUILD | Privileges::SHOUT);
    /// ```
    pub fn parse(text: &str) -> Privileges {
        let Ok(tokens) = split(text, ",", false) else {
            return Privileges::empty();
        };
        tokens
            .strings()
            .flatten()
            .filter_map(|token| {
                let token = token.trim();
                PRIVILEGE_NAMES
                    .iter()
                    .find(|(name, _)| name.eq_ignore_ascii_case(token))
                    .map(|(_, flag)| *flag)
            })
            .fold(Privileges::empty(), |acc, flag| acc | flag)
    }

    /// Comma-separated text form, in declaration order. Empty for no privileges.
    pub fn to_text(self) -> String {
        let names = PRIVILEGE_NAMES
            .iter()
            .filter(|(_, flag)| self.contains(*flag))
            .map(|(name, _)| *name);
        TypedArray::from_strings(names)
            .ok()
            .and_then(|array| array.join(Some(","), 0))
            .unwrap_or_default()
    }
}

/// Player name → [`Privileges`].
#[derive(Clone, Default)]
pub struct AuthStore {
    players: SharedStore<()>,
}

impl AuthStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the privileges of `player`, creating the entry if needed.
    pub fn set(&self, player: &str, privs: Privileges) {
        self.players.set(player, Some(&privs.to_text()), None);
    }

    /// Privileges of `player`, or `None` if unknown.
    pub fn get(&self, player: &str) -> Option<Privileges> {
        self.players.get_str(player).map(|text| Privileges::parse(&text))
    }

    /// Grants `privs` to `player` and returns the resulting set.
    pub fn add(&self, player: &str, privs: Privileges) -> Privileges {
        let _held = self.players.hold();
        let updated = self.get(player).unwrap_or_default() | privs;
        self.set(player, updated);
        updated
    }

    /// Revokes `privs` from `player` and returns the resulting set.
    pub fn remove(&self, player: &str, privs: Privileges) -> Option<Privileges> {
        let _held = self.players.hold();
        let updated = self.get(player)? - privs;
        self.set(player, updated);
        Some(updated)
    }

    /// Returns `true` if `player` holds every privilege in `privs`.
    pub fn has(&self, player: &str, privs: Privileges) -> bool {
        self.get(player).is_some_and(|held| held.contains(privs))
    }

    /// Known players, in store order.
    pub fn names(&self) -> Vec<String> {
        self.players.names()
    }

    /// The backing table.
    pub fn store(&self) -> &SharedStore<()> {
        &self.players
    }
}
