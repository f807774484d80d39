//! Identity tags of the user who sent a chat message.

use std::collections::HashMap;

/// Identity of the chatter that invoked a command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatTags {
    /// Display name (may differ in case from the login).
    pub display_name: Option<String>,
    /// Login name.
    pub username: String,
    pub user_id: Option<String>,
    pub room_id: Option<String>,
    pub is_mod: bool,
    /// Badge name → version, e.g. `broadcaster → 1`.
    pub badges: HashMap<String, String>,
}

impl ChatTags {
    /// Build tags from IRCv3 message tags and the sender's login.
    pub fn from_irc(tags: &HashMap<String, String>, login: &str) -> Self {
        let non_empty = |key: &str| tags.get(key).filter(|v| !v.is_empty()).cloned();

        let badges = tags
            .get("badges")
            .map(|raw| {
                raw.split(',')
                    .filter_map(|badge| badge.split_once('/'))
                    .map(|(name, version)| (name.to_string(), version.to_string()))
                    .collect()
            })
            .unwrap_or_default();

        Self {
            display_name: non_empty("display-name"),
            username: login.to_lowercase(),
            user_id: non_empty("user-id"),
            room_id: non_empty("room-id"),
            is_mod: tags.get("mod").map(|v| v == "1").unwrap_or(false),
            badges,
        }
    }

    /// Name used when mentioning the user.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    pub fn is_broadcaster(&self) -> bool {
        self.badges.get("broadcaster").map(|v| v == "1").unwrap_or(false)
    }

    /// Privileges of this user relative to the bot owner.
    pub fn privileges(&self, owner_id: &str) -> Privileges {
        Privileges {
            is_mod: self.is_mod,
            is_broadcaster: self.is_broadcaster(),
            is_owner: !owner_id.is_empty() && self.user_id.as_deref() == Some(owner_id),
        }
    }
}

/// Role flags derived from [`ChatTags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Privileges {
    pub is_mod: bool,
    pub is_broadcaster: bool,
    pub is_owner: bool,
}

impl Privileges {
    /// Owner, broadcaster or moderator.
    pub fn is_elevated(&self) -> bool {
        self.is_owner || self.is_broadcaster || self.is_mod
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_from_irc() {
        let raw = tags(&[
            ("display-name", "SomeUser"),
            ("user-id", "42"),
            ("room-id", "7"),
            ("mod", "1"),
            ("badges", "broadcaster/1,subscriber/12"),
        ]);
        let parsed = ChatTags::from_irc(&raw, "SomeUser");

        assert_eq!(parsed.username, "someuser");
        assert_eq!(parsed.display_name(), "SomeUser");
        assert_eq!(parsed.user_id.as_deref(), Some("42"));
        assert!(parsed.is_mod);
        assert!(parsed.is_broadcaster());
        assert_eq!(parsed.badges.get("subscriber").map(String::as_str), Some("12"));
    }

    #[test]
    fn test_display_name_falls_back_to_login() {
        let parsed = ChatTags::from_irc(&tags(&[("display-name", "")]), "viewer");
        assert_eq!(parsed.display_name(), "viewer");
        assert!(!parsed.is_broadcaster());
    }

    #[test]
    fn test_privileges() {
        let parsed = ChatTags::from_irc(&tags(&[("user-id", "99")]), "owner");
        let privileges = parsed.privileges("99");
        assert!(privileges.is_owner);
        assert!(privileges.is_elevated());

        // An unset owner id never matches
        let anonymous = ChatTags::default();
        assert!(!anonymous.privileges("").is_owner);
        assert!(!anonymous.privileges("").is_elevated());
    }
}
