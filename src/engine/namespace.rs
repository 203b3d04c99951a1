//! Ordered, case-insensitive sets of named entries.
//!
//! Keys are the lower-cased entry names, so a `BTreeMap` range starting at the
//! (lower-cased) token walks every candidate that could share its prefix. The scan
//! is cut off at the first key whose leading character differs from the token's,
//! which works for any UTF-8 name rather than only single-byte ones.
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::ops::Bound;
use std::str::FromStr;

use super::errors::EngineError;
use super::method::MethodEntry;

/// The command namespaces searched by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamespaceKind {
    General,
    Skill,
    Player,
    Staff,
    Social,
}

impl NamespaceKind {
    pub const ALL: [NamespaceKind; 5] = [
        NamespaceKind::General,
        NamespaceKind::Skill,
        NamespaceKind::Player,
        NamespaceKind::Staff,
        NamespaceKind::Social,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            NamespaceKind::General => "general",
            NamespaceKind::Skill => "skill",
            NamespaceKind::Player => "player",
            NamespaceKind::Staff => "staff",
            NamespaceKind::Social => "social",
        }
    }
}

impl fmt::Display for NamespaceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// What to do when a name is registered twice in one namespace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Refuse the second registration with [`EngineError::DuplicateCommand`].
    #[default]
    Reject,
    /// Keep the first entry and log a warning.
    Warn,
    /// Replace the earlier entry with the later one.
    Shadow,
}

impl FromStr for DuplicatePolicy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reject" => Ok(DuplicatePolicy::Reject),
            "warn" => Ok(DuplicatePolicy::Warn),
            "shadow" => Ok(DuplicatePolicy::Shadow),
            other => Err(EngineError::Config(format!("unknown duplicate policy '{}'", other))),
        }
    }
}

/// Fold a name or token into its key form.
pub fn fold_key(name: &str) -> String {
    name.to_lowercase()
}

pub struct Namespace<T> {
    label: &'static str,
    entries: BTreeMap<String, T>,
}

impl<T: MethodEntry> Namespace<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            entries: BTreeMap::new(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    /// Insert an entry under the given duplicate policy.
    ///
    /// Returns `Ok(true)` when the entry is now visible, `Ok(false)` when a warn
    /// policy kept the existing entry instead.
    pub fn insert(&mut self, entry: T, policy: DuplicatePolicy) -> Result<bool, EngineError> {
        if entry.name().is_empty() {
            return Err(EngineError::EmptyName(self.label));
        }
        let key = fold_key(entry.name());
        if self.entries.contains_key(&key) {
            match policy {
                DuplicatePolicy::Reject => {
                    return Err(EngineError::DuplicateCommand {
                        namespace: self.label,
                        name: entry.name().to_string(),
                    });
                }
                DuplicatePolicy::Warn => {
                    warn!(
                        "duplicate command '{}' in {} namespace ignored",
                        entry.name(),
                        self.label
                    );
                    return Ok(false);
                }
                DuplicatePolicy::Shadow => {
                    debug!("command '{}' in {} namespace replaced", entry.name(), self.label);
                }
            }
        }
        self.entries.insert(key, entry);
        Ok(true)
    }

    pub fn get(&self, name: &str) -> Option<&T> {
        self.entries.get(&fold_key(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&fold_key(name))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in key order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.values()
    }

    /// The narrowed candidate range for an already folded token: every key from
    /// the token onwards that still begins with the token's first character.
    /// Entries that match on later words of their name are scanned in full.
    pub fn candidates<'a>(&'a self, folded: &str) -> impl Iterator<Item = (&'a str, &'a T)> + 'a {
        let first = folded.chars().next();
        let start = if T::PREFIX_ONLY {
            Bound::Included(folded)
        } else {
            Bound::Unbounded
        };
        self.entries
            .range::<str, _>((start, Bound::Unbounded))
            .take_while(move |(key, _)| {
                first.is_some() && (!T::PREFIX_ONLY || key.chars().next() == first)
            })
            .map(|(key, entry)| (key.as_str(), entry))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl MethodEntry for Named {
        fn name(&self) -> &str {
            self.0
        }
        fn priority(&self) -> i32 {
            100
        }
    }

    fn names<'a>(ns: &'a Namespace<Named>, token: &'a str) -> Vec<&'a str> {
        ns.candidates(token).map(|(k, _)| k).collect()
    }

    #[test]
    fn candidates_stay_within_first_character() {
        let mut ns = Namespace::new("test");
        for n in ["apple", "Bash", "backstab", "bite", "cast"] {
            ns.insert(Named(n), DuplicatePolicy::Reject).unwrap();
        }
        assert_eq!(names(&ns, "ba"), vec!["backstab", "bash", "bite"]);
        assert_eq!(names(&ns, "c"), vec!["cast"]);
        assert!(names(&ns, "z").is_empty());
        assert!(names(&ns, "").is_empty());
    }

    #[test]
    fn candidates_handle_multibyte_names() {
        let mut ns = Namespace::new("test");
        for n in ["éclair", "Écho", "eat", "fish"] {
            ns.insert(Named(n), DuplicatePolicy::Reject).unwrap();
        }
        assert_eq!(names(&ns, "é"), vec!["écho", "éclair"]);
        assert_eq!(names(&ns, "e"), vec!["eat"]);
    }

    #[test]
    fn duplicate_policies() {
        let mut ns = Namespace::new("test");
        ns.insert(Named("look"), DuplicatePolicy::Reject).unwrap();

        let err = ns.insert(Named("LOOK"), DuplicatePolicy::Reject).unwrap_err();
        assert!(matches!(err, EngineError::DuplicateCommand { .. }));

        assert!(!ns.insert(Named("look"), DuplicatePolicy::Warn).unwrap());
        assert!(ns.insert(Named("Look"), DuplicatePolicy::Shadow).unwrap());
        assert_eq!(ns.len(), 1);
        assert_eq!(ns.get("look").map(|n| n.0), Some("Look"));
    }

    #[test]
    fn empty_names_rejected() {
        let mut ns = Namespace::new("test");
        assert!(matches!(
            ns.insert(Named(""), DuplicatePolicy::Shadow),
            Err(EngineError::EmptyName("test"))
        ));
    }

    #[test]
    fn policy_parsing() {
        assert_eq!("WARN".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::Warn);
        assert_eq!("shadow".parse::<DuplicatePolicy>().unwrap(), DuplicatePolicy::Shadow);
        assert!(matches!("merge".parse::<DuplicatePolicy>(), Err(EngineError::Config(_))));
    }

    struct Spell(&'static str);

    impl MethodEntry for Spell {
        const PREFIX_ONLY: bool = false;

        fn name(&self) -> &str {
            self.0
        }
        fn priority(&self) -> i32 {
            100
        }
    }

    #[test]
    fn word_matched_entries_scan_everything() {
        let mut ns = Namespace::new("spell");
        for n in ["bless", "Magic Missile", "light"] {
            ns.insert(Spell(n), DuplicatePolicy::Reject).unwrap();
        }
        let keys: Vec<&str> = ns.candidates("mis").map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["bless", "light", "magic missile"]);
        assert_eq!(ns.candidates("").count(), 0);
    }
}
