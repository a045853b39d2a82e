//! Address ban list.

use log::info;

use crate::core::SharedStore;

/// Banned address → name of the player who was using it.
#[derive(Clone, Default)]
pub struct BanList {
    entries: SharedStore<()>,
}

impl BanList {
    /// Creates an empty ban list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bans `address`, remembering `player` for display.
    pub fn add(&self, address: &str, player: &str) {
        info!("banning {address} ({player})");
        self.entries.set(address, Some(player), None);
    }

    /// Lifts the ban on `address`. Returns `false` if it was not banned.
    pub fn remove_address(&self, address: &str) -> bool {
        self.entries.remove(address).is_some()
    }

    /// Lifts every ban recorded against `player`. Returns how many were lifted.
    pub fn remove_name(&self, player: &str) -> usize {
        let _held = self.entries.hold();
        let addresses: Vec<String> = self
            .entries
            .entries()
            .into_iter()
            .filter(|(_, name)| name.as_deref() == Some(player))
            .map(|(address, _)| address)
            .collect();
        for address in &addresses {
            self.entries.remove(address);
        }
        addresses.len()
    }

    /// Returns `true` if `address` is banned.
    pub fn is_banned(&self, address: &str) -> bool {
        self.entries.contains(address)
    }

    /// Player name recorded with the ban on `address`.
    pub fn name_for(&self, address: &str) -> Option<String> {
        self.entries.get_str(address)
    }

    /// Every ban as `address|player`, sorted by address.
    pub fn list(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .entries
            .entries()
            .into_iter()
            .map(|(address, name)| format!("{address}|{}", name.unwrap_or_default()))
            .collect();
        lines.sort();
        lines
    }

    /// The backing table.
    pub fn store(&self) -> &SharedStore<()> {
        &self.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ban_and_unban() {
        let bans = BanList::new();
        bans.add("10.0.0.2", "mallory");
        bans.add("10.0.0.1", "mallory");
        bans.add("10.0.0.9", "eve");

        assert!(bans.is_banned("10.0.0.1"));
        assert_eq!(bans.name_for("10.0.0.9").as_deref(), Some("eve"));
        assert_eq!(
            bans.list(),
            vec!["10.0.0.1|mallory", "10.0.0.2|mallory", "10.0.0.9|eve"]
        );

        assert_eq!(bans.remove_name("mallory"), 2);
        assert!(!bans.is_banned("10.0.0.1"));
        assert!(bans.remove_address("10.0.0.9"));
        assert!(!bans.remove_address("10.0.0.9"));
        assert!(bans.list().is_empty());
    }
}
