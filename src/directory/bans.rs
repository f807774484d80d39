use dashmap::DashSet;

/// Users banned from requesting songs, per room.
#[derive(Debug, Default)]
pub struct BanList {
    bans: DashSet<(String, String)>,
}

impl BanList {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(room: &str, user: &str) -> (String, String) {
        (room.to_lowercase(), user.trim_start_matches('@').to_lowercase())
    }

    /// Returns false when the user was already banned.
    pub fn ban(&self, room: &str, user: &str) -> bool {
        self.bans.insert(Self::entry(room, user))
    }

    /// Returns false when the user was not banned.
    pub fn unban(&self, room: &str, user: &str) -> bool {
        self.bans.remove(&Self::entry(room, user)).is_some()
    }

    pub fn is_banned(&self, room: &str, user: &str) -> bool {
        self.bans.contains(&Self::entry(room, user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bans_are_per_room() {
        let bans = BanList::new();
        assert!(bans.ban("room", "@Spammer"));
        assert!(!bans.ban("room", "spammer"));

        assert!(bans.is_banned("room", "SPAMMER"));
        assert!(!bans.is_banned("other", "spammer"));

        assert!(bans.unban("room", "spammer"));
        assert!(!bans.unban("room", "spammer"));
        assert!(!bans.is_banned("room", "spammer"));
    }
}
