use dashmap::DashMap;

use crate::chat::client::normalize_room;

/// Outcome of a directory change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelChange {
    Applied,
    /// The channel was already in the requested state.
    Unchanged,
    /// The channel was never added.
    Unknown,
}

/// Channels the bot serves, each enabled or disabled.
///
/// Viewers can only join rooms of enabled channels.
#[derive(Debug, Default)]
pub struct ChannelDirectory {
    channels: DashMap<String, bool>,
}

impl ChannelDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a channel, disabled. Existing channels are left alone.
    pub fn add(&self, name: &str) -> ChannelChange {
        let name = normalize_room(name);
        if self.channels.contains_key(&name) {
            return ChannelChange::Unchanged;
        }
        self.channels.insert(name, false);
        ChannelChange::Applied
    }

    pub fn enable(&self, name: &str) -> ChannelChange {
        self.set_enabled(name, true)
    }

    pub fn disable(&self, name: &str) -> ChannelChange {
        self.set_enabled(name, false)
    }

    fn set_enabled(&self, name: &str, enabled: bool) -> ChannelChange {
        match self.channels.get_mut(&normalize_room(name)) {
            None => ChannelChange::Unknown,
            Some(state) if *state == enabled => ChannelChange::Unchanged,
            Some(mut state) => {
                *state = enabled;
                ChannelChange::Applied
            }
        }
    }

    pub fn is_enabled(&self, name: &str) -> bool {
        self.channels
            .get(&normalize_room(name))
            .map(|state| *state)
            .unwrap_or(false)
    }

    /// Enabled channels, sorted.
    pub fn enabled(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .channels
            .iter()
            .filter(|entry| *entry.value())
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }
}
