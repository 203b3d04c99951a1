//! Delayed action scheduler.
//!
//! Actions live in a [`SlotMap`] and are also listed per target so cancellation
//! and status queries never scan the whole queue. Keys are generation checked:
//! a key that outlived its action simply fails to resolve.
//!
//! Firing is two-phase. [`DelayedActionQueue::drain_due`] removes every due
//! action from both structures first, then the caller runs the callbacks. A
//! callback may therefore schedule or cancel freely, and an action can never fire
//! twice. Liveness is checked again right before each callback, since an earlier
//! one in the same batch may have removed the target.
use log::{debug, error, trace};
use slotmap::{new_key_type, SlotMap};
use std::collections::HashMap;
use std::fmt;

use super::actor::{Actor, ActorId};
use super::parser::ParsedCommand;
use crate::metrics;

new_key_type! {
    /// Handle to a scheduled action.
    pub struct ActionKey;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Fish,
    Search,
    Track,
    Study,
    Script,
    Command,
}

impl ActionKind {
    /// Kinds that only players may have pending.
    pub fn player_only(&self) -> bool {
        matches!(
            self,
            ActionKind::Fish | ActionKind::Search | ActionKind::Track | ActionKind::Study
        )
    }

    /// Status line shown while the action is pending, if any.
    pub fn pending_label(&self) -> Option<&'static str> {
        match self {
            ActionKind::Fish => Some("*Fishing*"),
            ActionKind::Search => Some("*Searching*"),
            ActionKind::Track => Some("*Tracking*"),
            ActionKind::Study => Some("*Studying*"),
            ActionKind::Script | ActionKind::Command => None,
        }
    }
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ActionKind::Fish => "fish",
            ActionKind::Search => "search",
            ActionKind::Track => "track",
            ActionKind::Study => "study",
            ActionKind::Script => "script",
            ActionKind::Command => "command",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActionPayload {
    #[default]
    None,
    Command(ParsedCommand),
    Script(String),
}

/// Callback run when an action comes due.
pub type ActionCallback<C> = fn(&DelayedAction<C>, &mut C);

pub struct DelayedAction<C> {
    pub target: ActorId,
    /// Wall-clock second at or after which the action fires.
    pub when_finished: i64,
    pub can_interrupt: bool,
    pub kind: ActionKind,
    pub payload: ActionPayload,
    callback: ActionCallback<C>,
    seq: u64,
}

impl<C> DelayedAction<C> {
    pub fn fire(&self, ctx: &mut C) {
        (self.callback)(self, ctx)
    }

    /// Fire unless the target has left since the action was drained, in which
    /// case it is logged and dropped like any other orphan.
    pub fn fire_if_live(&self, ctx: &mut C) -> bool
    where
        C: ActionTargets,
    {
        if !ctx.is_live(self.target) {
            error!(
                "delayed {} action without a live target ({}) removed",
                self.kind, self.target
            );
            metrics::inc_orphans_purged();
            return false;
        }
        self.fire(ctx);
        metrics::inc_actions_fired();
        true
    }
}

impl<C> fmt::Debug for DelayedAction<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DelayedAction")
            .field("target", &self.target)
            .field("when_finished", &self.when_finished)
            .field("kind", &self.kind)
            .field("can_interrupt", &self.can_interrupt)
            .finish()
    }
}

/// What to schedule; `schedule` stamps the target and finish time.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub kind: ActionKind,
    pub payload: ActionPayload,
    pub delay_secs: i64,
    pub can_interrupt: bool,
}

impl ActionRequest {
    pub fn new(kind: ActionKind, delay_secs: i64) -> Self {
        Self {
            kind,
            payload: ActionPayload::None,
            delay_secs,
            can_interrupt: true,
        }
    }

    pub fn with_payload(mut self, payload: ActionPayload) -> Self {
        self.payload = payload;
        self
    }

    pub fn uninterruptible(mut self) -> Self {
        self.can_interrupt = false;
        self
    }
}

/// Lets [`DelayedActionQueue::tick`] tell live targets from departed ones.
pub trait ActionTargets {
    fn is_live(&self, id: ActorId) -> bool;
}

pub struct DelayedActionQueue<C> {
    actions: SlotMap<ActionKey, DelayedAction<C>>,
    by_target: HashMap<ActorId, Vec<ActionKey>>,
    next_seq: u64,
}

impl<C> Default for DelayedActionQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C> DelayedActionQueue<C> {
    pub fn new() -> Self {
        Self {
            actions: SlotMap::with_key(),
            by_target: HashMap::new(),
            next_seq: 0,
        }
    }

    /// Queue an action against `target`, finishing `request.delay_secs` after
    /// `now`. Player-only kinds requested for anyone else are dropped and `None`
    /// is returned.
    pub fn schedule(
        &mut self,
        target: &dyn Actor,
        request: ActionRequest,
        callback: ActionCallback<C>,
        now: i64,
    ) -> Option<ActionKey> {
        if request.kind.player_only() && !target.is_player() {
            trace!("ignoring {} action for non-player {}", request.kind, target.id());
            return None;
        }

        let seq = self.next_seq;
        self.next_seq += 1;
        let action = DelayedAction {
            target: target.id(),
            when_finished: now.saturating_add(request.delay_secs),
            can_interrupt: request.can_interrupt,
            kind: request.kind,
            payload: request.payload,
            callback,
            seq,
        };
        debug!(
            "scheduled {} action for {} at {}",
            action.kind, action.target, action.when_finished
        );
        let target_id = action.target;
        let key = self.actions.insert(action);
        self.by_target.entry(target_id).or_default().push(key);
        metrics::inc_actions_scheduled();
        Some(key)
    }

    pub fn get(&self, key: ActionKey) -> Option<&DelayedAction<C>> {
        self.actions.get(key)
    }

    fn detach(&mut self, target: ActorId, key: ActionKey) {
        if let Some(keys) = self.by_target.get_mut(&target) {
            keys.retain(|k| *k != key);
            if keys.is_empty() {
                self.by_target.remove(&target);
            }
        }
    }

    /// Remove every action due at `now` and return the ones whose target is still
    /// live, ordered by finish time and then by scheduling order. Due actions with
    /// a departed target are logged and dropped.
    pub fn drain_due(&mut self, now: i64, is_live: impl Fn(ActorId) -> bool) -> Vec<DelayedAction<C>> {
        let due: Vec<ActionKey> = self
            .actions
            .iter()
            .filter(|(_, a)| a.when_finished <= now)
            .map(|(k, _)| k)
            .collect();

        let mut ready = Vec::with_capacity(due.len());
        for key in due {
            let Some(action) = self.actions.remove(key) else {
                continue;
            };
            self.detach(action.target, key);
            if !is_live(action.target) {
                error!(
                    "delayed {} action without a live target ({}) removed",
                    action.kind, action.target
                );
                metrics::inc_orphans_purged();
                continue;
            }
            ready.push(action);
        }
        ready.sort_by_key(|a| (a.when_finished, a.seq));
        ready
    }

    /// Fire everything due at `now`. Returns how many callbacks ran.
    pub fn tick(&mut self, now: i64, ctx: &mut C) -> usize
    where
        C: ActionTargets,
    {
        let ready = self.drain_due(now, |id| ctx.is_live(id));
        let mut fired = 0;
        for action in &ready {
            if action.fire_if_live(ctx) {
                fired += 1;
            }
        }
        fired
    }

    /// Drop every action against `target`. Returns how many were removed.
    pub fn cancel_all(&mut self, target: ActorId) -> usize {
        let keys = self.by_target.remove(&target).unwrap_or_default();
        let removed = keys
            .into_iter()
            .filter(|k| self.actions.remove(*k).is_some())
            .count();
        if removed > 0 {
            debug!("cancelled {} delayed action(s) for {}", removed, target);
            metrics::add_actions_cancelled(removed);
        }
        removed
    }

    /// Drop the interruptible actions against `target`. Returns true when at
    /// least one was removed.
    pub fn cancel_interruptible(&mut self, target: ActorId) -> bool {
        let Some(keys) = self.by_target.get(&target) else {
            return false;
        };
        let doomed: Vec<ActionKey> = keys
            .iter()
            .copied()
            .filter(|k| self.actions.get(*k).is_some_and(|a| a.can_interrupt))
            .collect();
        for key in &doomed {
            self.actions.remove(*key);
            self.detach(target, *key);
        }
        if !doomed.is_empty() {
            metrics::add_actions_cancelled(doomed.len());
        }
        !doomed.is_empty()
    }

    /// Remove queued actions whose target is gone, due or not.
    pub fn purge_orphans(&mut self, is_live: impl Fn(ActorId) -> bool) -> usize {
        let dead: Vec<ActorId> = self
            .by_target
            .keys()
            .copied()
            .filter(|id| !is_live(*id))
            .collect();
        let mut purged = 0;
        for id in dead {
            for key in self.by_target.remove(&id).unwrap_or_default() {
                if self.actions.remove(key).is_some() {
                    error!("delayed action without a live target ({}) removed", id);
                    metrics::inc_orphans_purged();
                    purged += 1;
                }
            }
        }
        purged
    }

    pub fn has_action(&self, target: ActorId, kind: ActionKind) -> bool {
        self.pending(target).any(|a| a.kind == kind)
    }

    /// Status lines for the target's pending actions, in scheduling order.
    pub fn describe_pending(&self, target: ActorId) -> Vec<&'static str> {
        let mut pending: Vec<&DelayedAction<C>> = self.pending(target).collect();
        pending.sort_by_key(|a| a.seq);
        pending.into_iter().filter_map(|a| a.kind.pending_label()).collect()
    }

    fn pending(&self, target: ActorId) -> impl Iterator<Item = &DelayedAction<C>> + '_ {
        self.by_target
            .get(&target)
            .into_iter()
            .flatten()
            .filter_map(|k| self.actions.get(*k))
    }

    pub fn pending_count(&self, target: ActorId) -> usize {
        self.pending(target).count()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::actor::tests_support::StubActor;
    use crate::engine::roles::LEVEL_PLAYER;
    use std::collections::HashSet;

    #[derive(Default)]
    struct Ctx {
        live: HashSet<ActorId>,
        fired: Vec<(ActorId, ActionKind, i64)>,
    }

    impl ActionTargets for Ctx {
        fn is_live(&self, id: ActorId) -> bool {
            self.live.contains(&id)
        }
    }

    fn record(action: &DelayedAction<Ctx>, ctx: &mut Ctx) {
        ctx.fired.push((action.target, action.kind, action.when_finished));
    }

    fn ply(id: u64) -> StubActor {
        StubActor::player(id, LEVEL_PLAYER)
    }

    fn ctx_with(ids: &[u64]) -> Ctx {
        Ctx {
            live: ids.iter().map(|i| ActorId(*i)).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn fires_once_at_deadline() {
        let mut q: DelayedActionQueue<Ctx> = DelayedActionQueue::new();
        let mut ctx = ctx_with(&[1]);
        q.schedule(&ply(1), ActionRequest::new(ActionKind::Fish, 5), record, 100);

        assert_eq!(q.tick(104, &mut ctx), 0);
        assert!(q.has_action(ActorId(1), ActionKind::Fish));
        assert_eq!(q.tick(105, &mut ctx), 1);
        assert_eq!(q.tick(106, &mut ctx), 0);
        assert_eq!(ctx.fired, vec![(ActorId(1), ActionKind::Fish, 105)]);
        assert!(q.is_empty());
        assert_eq!(q.pending_count(ActorId(1)), 0);
    }

    #[test]
    fn player_only_kinds_ignored_for_monsters() {
        let mut q: DelayedActionQueue<Ctx> = DelayedActionQueue::new();
        let mob = StubActor::monster(7, LEVEL_PLAYER);
        for kind in [ActionKind::Fish, ActionKind::Search, ActionKind::Track, ActionKind::Study] {
            assert!(q.schedule(&mob, ActionRequest::new(kind, 1), record, 0).is_none());
        }
        assert!(q.is_empty());
        assert!(q
            .schedule(&mob, ActionRequest::new(ActionKind::Script, 1), record, 0)
            .is_some());
    }

    #[test]
    fn due_actions_fire_in_deadline_order() {
        let mut q: DelayedActionQueue<Ctx> = DelayedActionQueue::new();
        let mut ctx = ctx_with(&[1, 2]);
        q.schedule(&ply(1), ActionRequest::new(ActionKind::Search, 3), record, 10);
        q.schedule(&ply(2), ActionRequest::new(ActionKind::Track, 1), record, 10);
        q.schedule(&ply(1), ActionRequest::new(ActionKind::Study, 1), record, 10);
        assert_eq!(q.tick(20, &mut ctx), 3);
        let kinds: Vec<_> = ctx.fired.iter().map(|f| f.1).collect();
        assert_eq!(kinds, vec![ActionKind::Track, ActionKind::Study, ActionKind::Search]);
    }

    #[test]
    fn cancel_all_and_interruptible() {
        let mut q: DelayedActionQueue<Ctx> = DelayedActionQueue::new();
        let mut ctx = ctx_with(&[1]);
        q.schedule(&ply(1), ActionRequest::new(ActionKind::Fish, 5), record, 0);
        q.schedule(
            &ply(1),
            ActionRequest::new(ActionKind::Study, 5).uninterruptible(),
            record,
            0,
        );

        assert!(q.cancel_interruptible(ActorId(1)));
        assert!(!q.has_action(ActorId(1), ActionKind::Fish));
        assert!(q.has_action(ActorId(1), ActionKind::Study));
        assert!(!q.cancel_interruptible(ActorId(1)));

        assert_eq!(q.cancel_all(ActorId(1)), 1);
        assert_eq!(q.cancel_all(ActorId(1)), 0);
        assert_eq!(q.tick(10, &mut ctx), 0);
        assert!(ctx.fired.is_empty());
    }

    #[test]
    fn orphaned_actions_are_purged_not_fired() {
        let mut q: DelayedActionQueue<Ctx> = DelayedActionQueue::new();
        let mut ctx = ctx_with(&[1]);
        q.schedule(&ply(1), ActionRequest::new(ActionKind::Fish, 1), record, 0);
        q.schedule(&ply(2), ActionRequest::new(ActionKind::Fish, 1), record, 0);
        assert_eq!(q.tick(1, &mut ctx), 1);
        assert_eq!(ctx.fired.len(), 1);
        assert!(q.is_empty());

        q.schedule(&ply(3), ActionRequest::new(ActionKind::Track, 50), record, 0);
        assert_eq!(q.purge_orphans(|id| ctx.is_live(id)), 1);
        assert!(q.is_empty());
    }

    #[test]
    fn describe_pending_in_scheduling_order() {
        let mut q: DelayedActionQueue<Ctx> = DelayedActionQueue::new();
        q.schedule(&ply(1), ActionRequest::new(ActionKind::Track, 9), record, 0);
        q.schedule(&ply(1), ActionRequest::new(ActionKind::Command, 1), record, 0);
        q.schedule(&ply(1), ActionRequest::new(ActionKind::Fish, 2), record, 0);
        assert_eq!(q.describe_pending(ActorId(1)), vec!["*Tracking*", "*Fishing*"]);
        assert!(q.describe_pending(ActorId(2)).is_empty());
    }

    #[test]
    fn stale_keys_resolve_to_nothing() {
        let mut q: DelayedActionQueue<Ctx> = DelayedActionQueue::new();
        let key = q
            .schedule(&ply(1), ActionRequest::new(ActionKind::Fish, 1), record, 0)
            .unwrap();
        q.cancel_all(ActorId(1));
        q.schedule(&ply(1), ActionRequest::new(ActionKind::Fish, 1), record, 0);
        assert!(q.get(key).is_none());
    }

    fn reschedule(action: &DelayedAction<Requeue>, ctx: &mut Requeue) {
        ctx.fired += 1;
        let id = action.target;
        ctx.pending.push(id);
    }

    #[derive(Default)]
    struct Requeue {
        fired: usize,
        pending: Vec<ActorId>,
    }

    impl ActionTargets for Requeue {
        fn is_live(&self, _id: ActorId) -> bool {
            true
        }
    }

    #[test]
    fn drained_actions_do_not_refire() {
        let mut q: DelayedActionQueue<Requeue> = DelayedActionQueue::new();
        let mut ctx = Requeue::default();
        q.schedule(&ply(1), ActionRequest::new(ActionKind::Command, 0), reschedule, 5);
        let ready = q.drain_due(5, |_| true);
        assert!(q.is_empty());
        for a in &ready {
            a.fire(&mut ctx);
        }
        for id in ctx.pending.clone() {
            q.schedule(&ply(id.0), ActionRequest::new(ActionKind::Command, 0), reschedule, 5);
        }
        assert_eq!(q.tick(5, &mut ctx), 1);
        assert_eq!(ctx.fired, 2);
    }
}
