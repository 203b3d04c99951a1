//! Prefix matcher shared by every namespace lookup.
//!
//! A [`MatchState`] is threaded through successive [`examine`] calls so a search
//! can span several namespaces. Within the narrowed candidate range:
//!
//! * an exact name match wins outright, sets `found` and stops the scan;
//! * the first prefix match is adopted (songs and spells match a prefix of any
//!   word in their name);
//! * a later prefix match replaces the best when its priority number is lower;
//! * at equal priority a shorter name replaces the best, a name of equal length
//!   makes the match ambiguous (`count` grows) and a longer one is ignored.
use super::method::MethodEntry;
use super::namespace::{fold_key, Namespace};

#[derive(Debug)]
pub struct MatchState<'a, T, K = ()> {
    pub count: usize,
    pub found: bool,
    pub best: Option<(K, &'a T)>,
}

impl<'a, T, K> Default for MatchState<'a, T, K> {
    fn default() -> Self {
        Self {
            count: 0,
            found: false,
            best: None,
        }
    }
}

/// Classified result of a finished search.
#[derive(Debug, PartialEq, Eq)]
pub enum Lookup<'a, T> {
    Found(&'a T),
    NotFound,
    NotUnique,
}

impl<'a, T, K: Copy> MatchState<'a, T, K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn best_entry(&self) -> Option<&'a T> {
        self.best.as_ref().map(|(_, entry)| *entry)
    }

    pub fn best_tag(&self) -> Option<K> {
        self.best.as_ref().map(|(tag, _)| *tag)
    }

    pub fn classify(&self) -> Lookup<'a, T> {
        match (self.count, self.best_entry()) {
            (0, _) | (_, None) => Lookup::NotFound,
            (1, Some(entry)) => Lookup::Found(entry),
            _ => Lookup::NotUnique,
        }
    }
}

fn name_len(name: &str) -> usize {
    name.chars().count()
}

/// Scan one namespace for `token`, updating `state`. `tag` is recorded alongside
/// the entry whenever this namespace supplies the best candidate.
pub fn examine<'a, T: MethodEntry, K: Copy>(
    namespace: &'a Namespace<T>,
    tag: K,
    token: &str,
    state: &mut MatchState<'a, T, K>,
) {
    let folded = fold_key(token);
    if folded.is_empty() {
        return;
    }

    for (key, entry) in namespace.candidates(&folded) {
        if key == folded {
            state.best = Some((tag, entry));
            state.found = true;
            state.count = 1;
            break;
        }
        if !entry.partial_match(key, &folded) {
            continue;
        }

        let Some((_, best)) = state.best else {
            state.best = Some((tag, entry));
            state.count = 1;
            continue;
        };

        if entry.priority() < best.priority() {
            state.best = Some((tag, entry));
            state.count = 1;
        } else if entry.priority() == best.priority() {
            let (candidate, current) = (name_len(entry.name()), name_len(best.name()));
            if candidate < current {
                state.best = Some((tag, entry));
                state.count = 1;
            } else if candidate == current {
                state.count += 1;
            }
        }
    }
}

/// Search a single namespace and classify the result.
pub fn find<'a, T: MethodEntry>(namespace: &'a Namespace<T>, token: &str) -> Lookup<'a, T> {
    let mut state: MatchState<'a, T> = MatchState::new();
    examine(namespace, (), token, &mut state);
    state.classify()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::namespace::DuplicatePolicy;

    #[derive(Debug, PartialEq, Eq)]
    struct Entry {
        name: &'static str,
        priority: i32,
    }

    impl MethodEntry for Entry {
        fn name(&self) -> &str {
            self.name
        }
        fn priority(&self) -> i32 {
            self.priority
        }
    }

    fn ns(entries: &[(&'static str, i32)]) -> Namespace<Entry> {
        let mut ns = Namespace::new("test");
        for &(name, priority) in entries {
            ns.insert(Entry { name, priority }, DuplicatePolicy::Reject).unwrap();
        }
        ns
    }

    fn found_name<'a>(lookup: Lookup<'a, Entry>) -> Option<&'a str> {
        match lookup {
            Lookup::Found(e) => Some(e.name),
            _ => None,
        }
    }

    #[test]
    fn exact_match_beats_prefix_matches() {
        let ns = ns(&[("look", 100), ("lo", 200), ("lock", 10)]);
        assert_eq!(found_name(find(&ns, "lo")), Some("lo"));
    }

    #[test]
    fn lower_priority_number_wins() {
        let ns = ns(&[("look", 100), ("lock", 50)]);
        assert_eq!(found_name(find(&ns, "lo")), Some("lock"));
    }

    #[test]
    fn shorter_name_wins_at_equal_priority() {
        let ns = ns(&[("look", 100), ("lookout", 100)]);
        assert_eq!(found_name(find(&ns, "lo")), Some("look"));
    }

    #[test]
    fn equal_length_and_priority_is_ambiguous() {
        let ns = ns(&[("look", 100), ("lock", 100)]);
        assert_eq!(find(&ns, "lo"), Lookup::NotUnique);
    }

    #[test]
    fn better_candidate_resets_ambiguity() {
        let ns = ns(&[("lack", 100), ("lick", 100), ("lo", 100)]);
        assert_eq!(found_name(find(&ns, "l")), Some("lo"));
    }

    #[test]
    fn no_candidates() {
        let ns = ns(&[("look", 100)]);
        assert_eq!(find(&ns, "x"), Lookup::NotFound);
        assert_eq!(find(&ns, "lx"), Lookup::NotFound);
        assert_eq!(find(&ns, ""), Lookup::NotFound);
    }

    #[test]
    fn case_is_ignored() {
        let ns = ns(&[("Look", 100)]);
        assert_eq!(found_name(find(&ns, "LOOK")), Some("Look"));
    }

    #[test]
    fn state_spans_namespaces() {
        let first = ns(&[("lock", 100)]);
        let second = ns(&[("look", 100)]);
        let mut state = MatchState::new();
        examine(&first, 1u8, "lo", &mut state);
        examine(&second, 2u8, "lo", &mut state);
        assert_eq!(state.count, 2);
        assert!(!state.found);

        let exact = ns(&[("lo", 500)]);
        let mut state = MatchState::new();
        examine(&first, 1u8, "lo", &mut state);
        examine(&exact, 3u8, "lo", &mut state);
        assert!(state.found);
        assert_eq!(state.best_tag(), Some(3));
        assert_eq!(state.count, 1);
    }
}
