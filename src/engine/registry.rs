//! The command registry: one [`Namespace`] per dispatch namespace plus the song
//! and spell sets.
//!
//! Population is driven by a [`CommandTable`]. `reload` empties every namespace
//! and repopulates from the table; a table that fails part way leaves the registry
//! empty rather than half filled, and the error is returned to the caller.
use log::{info, warn};
use serde::Serialize;
use std::collections::BTreeMap;

use super::errors::EngineError;
use super::matcher::{self, Lookup};
use super::method::{CommandEntry, MethodEntry, MysticKind, MysticMethod};
use super::namespace::{DuplicatePolicy, Namespace, NamespaceKind};

/// Source of registry entries, consulted on every (re)load.
pub trait CommandTable<C> {
    fn populate(&self, registry: &mut Registry<C>) -> Result<(), EngineError>;
}

/// One row of the resolved command table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CatalogEntry {
    pub namespace: String,
    pub name: String,
    pub priority: i32,
    pub description: String,
}

/// Per-namespace entry counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RegistryStats {
    pub namespaces: BTreeMap<String, usize>,
    pub songs: usize,
    pub spells: usize,
}

impl RegistryStats {
    pub fn total(&self) -> usize {
        self.namespaces.values().sum::<usize>() + self.songs + self.spells
    }
}

pub struct Registry<C> {
    general: Namespace<CommandEntry<C>>,
    skill: Namespace<CommandEntry<C>>,
    player: Namespace<CommandEntry<C>>,
    staff: Namespace<CommandEntry<C>>,
    social: Namespace<CommandEntry<C>>,
    songs: Namespace<MysticMethod>,
    spells: Namespace<MysticMethod>,
    policy: DuplicatePolicy,
}

impl<C> Default for Registry<C> {
    fn default() -> Self {
        Self::new(DuplicatePolicy::default())
    }
}

impl<C> Registry<C> {
    pub fn new(policy: DuplicatePolicy) -> Self {
        Self {
            general: Namespace::new(NamespaceKind::General.label()),
            skill: Namespace::new(NamespaceKind::Skill.label()),
            player: Namespace::new(NamespaceKind::Player.label()),
            staff: Namespace::new(NamespaceKind::Staff.label()),
            social: Namespace::new(NamespaceKind::Social.label()),
            songs: Namespace::new("song"),
            spells: Namespace::new("spell"),
            policy,
        }
    }

    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    pub fn namespace(&self, kind: NamespaceKind) -> &Namespace<CommandEntry<C>> {
        match kind {
            NamespaceKind::General => &self.general,
            NamespaceKind::Skill => &self.skill,
            NamespaceKind::Player => &self.player,
            NamespaceKind::Staff => &self.staff,
            NamespaceKind::Social => &self.social,
        }
    }

    fn namespace_mut(&mut self, kind: NamespaceKind) -> &mut Namespace<CommandEntry<C>> {
        match kind {
            NamespaceKind::General => &mut self.general,
            NamespaceKind::Skill => &mut self.skill,
            NamespaceKind::Player => &mut self.player,
            NamespaceKind::Staff => &mut self.staff,
            NamespaceKind::Social => &mut self.social,
        }
    }

    fn mystic_mut(&mut self, kind: MysticKind) -> &mut Namespace<MysticMethod> {
        match kind {
            MysticKind::Song => &mut self.songs,
            MysticKind::Spell => &mut self.spells,
        }
    }

    /// Add an entry; it is visible to the very next lookup.
    pub fn register(&mut self, kind: NamespaceKind, entry: CommandEntry<C>) -> Result<(), EngineError> {
        let policy = self.policy;
        self.namespace_mut(kind).insert(entry, policy).map(|_| ())
    }

    /// Add a song or spell to the set named by its kind.
    pub fn register_mystic(&mut self, method: MysticMethod) -> Result<(), EngineError> {
        let policy = self.policy;
        self.mystic_mut(method.kind).insert(method, policy).map(|_| ())
    }

    pub fn clear(&mut self, kind: NamespaceKind) {
        self.namespace_mut(kind).clear();
    }

    pub fn clear_all(&mut self) {
        for kind in NamespaceKind::ALL {
            self.clear(kind);
        }
        self.songs.clear();
        self.spells.clear();
    }

    /// Empty the registry and repopulate it from `table`.
    pub fn reload(&mut self, table: &dyn CommandTable<C>) -> Result<RegistryStats, EngineError> {
        self.clear_all();
        if let Err(e) = table.populate(self) {
            warn!("command table failed to load, registry left empty: {}", e);
            self.clear_all();
            return Err(e);
        }
        let stats = self.stats();
        info!(
            "command registry loaded: {} entries ({} songs, {} spells)",
            stats.total(),
            stats.songs,
            stats.spells
        );
        Ok(stats)
    }

    pub fn find_song(&self, token: &str) -> Lookup<'_, MysticMethod> {
        matcher::find(&self.songs, token)
    }

    pub fn find_spell(&self, token: &str) -> Lookup<'_, MysticMethod> {
        matcher::find(&self.spells, token)
    }

    pub fn songs(&self) -> impl Iterator<Item = &MysticMethod> {
        self.songs.iter()
    }

    pub fn spells(&self) -> impl Iterator<Item = &MysticMethod> {
        self.spells.iter()
    }

    /// Entries of one namespace in name order.
    pub fn entries(&self, kind: NamespaceKind) -> impl Iterator<Item = &CommandEntry<C>> {
        self.namespace(kind).iter()
    }

    pub fn stats(&self) -> RegistryStats {
        RegistryStats {
            namespaces: NamespaceKind::ALL
                .iter()
                .map(|k| (k.label().to_string(), self.namespace(*k).len()))
                .collect(),
            songs: self.songs.len(),
            spells: self.spells.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.stats().total() == 0
    }

    /// Every command in dispatch order, for listings.
    pub fn catalog(&self) -> Vec<CatalogEntry> {
        NamespaceKind::ALL
            .iter()
            .flat_map(|kind| {
                self.entries(*kind).map(move |e| CatalogEntry {
                    namespace: kind.label().to_string(),
                    name: e.name().to_string(),
                    priority: e.priority(),
                    description: e.description().to_string(),
                })
            })
            .collect()
    }
}
