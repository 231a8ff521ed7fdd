//! Recomputation gate
//!
//! Single-slot memoization of [`derive`] keyed on the fields that can change
//! its output. Edits to anything else (scroll position, theme, versions)
//! reuse the cached derivation.

use tracing::{debug, trace};

use super::derive::{derive, Derivation, EvaluationMode, InputState};
use super::engine::RegexProvider;

/// The subset of [`InputState`] a derivation depends on
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ReducedKey {
    pub engine_available: bool,
    pub mode: Option<EvaluationMode>,
    pub pattern: String,
    pub replacement: String,
    pub subject: String,
}

impl From<&InputState> for ReducedKey {
    fn from(state: &InputState) -> Self {
        Self {
            engine_available: state.engine_available,
            mode: state.mode,
            pattern: state.pattern.clone(),
            replacement: state.replacement.clone(),
            subject: state.subject.clone(),
        }
    }
}

/// Reservation for a derivation that will be committed later
///
/// Only the most recently issued ticket can commit, so a pass started on
/// stale input never replaces the result of a fresher one.
#[derive(Debug)]
pub struct Ticket {
    key: ReducedKey,
    generation: u64,
}

impl Ticket {
    #[allow(dead_code)]
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug)]
struct Slot {
    key: ReducedKey,
    derivation: Derivation,
    generation: u64,
}

impl Slot {
    fn filled(ticket: Ticket, derivation: Derivation) -> Self {
        Self {
            key: ticket.key,
            derivation,
            generation: ticket.generation,
        }
    }
}

/// What [`Gate::get`] hands back
#[derive(Debug)]
pub struct Evaluation<'a> {
    pub derivation: &'a Derivation,
    /// False when the cached derivation was reused
    pub recomputed: bool,
    /// Generation that produced `derivation`
    pub generation: u64,
}

pub struct Gate<P> {
    provider: P,
    slot: Option<Slot>,
    generation: u64,
    derivations: u64,
}

impl<P: RegexProvider> Gate<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            slot: None,
            generation: 0,
            derivations: 0,
        }
    }

    /// Derivation for `state`, recomputed only when its reduced key changed
    pub fn get(&mut self, state: &InputState) -> Evaluation<'_> {
        let key = ReducedKey::from(state);

        let (slot, recomputed) = match self.slot.take() {
            Some(slot) if slot.key == key => {
                trace!(generation = slot.generation, "reusing cached derivation");
                (slot, false)
            }
            _ => {
                let ticket = self.begin_key(key);
                let derivation = self.evaluate(state);
                debug!(
                    generation = ticket.generation,
                    error = derivation.is_error(),
                    "derived new result"
                );
                (Slot::filled(ticket, derivation), true)
            }
        };

        let slot = self.slot.insert(slot);
        Evaluation {
            derivation: &slot.derivation,
            recomputed,
            generation: slot.generation,
        }
    }

    fn begin_key(&mut self, key: ReducedKey) -> Ticket {
        self.generation += 1;
        Ticket {
            key,
            generation: self.generation,
        }
    }

    /// Run a derivation pass without touching the cache
    pub fn evaluate(&mut self, state: &InputState) -> Derivation {
        self.derivations += 1;
        derive(&self.provider, state)
    }
}

/// Split-phase access for hosts that derive off the input thread
#[allow(dead_code)]
impl<P: RegexProvider> Gate<P> {
    /// Reserve a new generation for `state`; older tickets become stale
    pub fn begin(&mut self, state: &InputState) -> Ticket {
        self.begin_key(ReducedKey::from(state))
    }

    /// Store `derivation` unless a newer ticket has been issued since
    pub fn commit(&mut self, ticket: Ticket, derivation: Derivation) -> bool {
        if ticket.generation != self.generation {
            debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding stale derivation"
            );
            return false;
        }

        self.slot = Some(Slot::filled(ticket, derivation));
        true
    }

    /// Cached derivation, if any
    pub fn cached(&self) -> Option<&Derivation> {
        self.slot.as_ref().map(|slot| &slot.derivation)
    }

    /// Drop the cached derivation
    pub fn invalidate(&mut self) {
        self.slot = None;
    }

    /// Number of derivation passes actually run
    pub fn derivations(&self) -> u64 {
        self.derivations
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::{CompiledPattern, PatternError, RustRegexProvider};
    use crate::core::template::ReplacementError;
    use crate::output::{Match, SyntaxTree};
    use std::cell::Cell;

    /// Counts compile calls so tests can see when the engine actually ran
    #[derive(Default)]
    struct CountingProvider {
        inner: RustRegexProvider,
        compiles: Cell<usize>,
    }

    impl RegexProvider for CountingProvider {
        type Compiled = CompiledPattern;

        fn compile(&self, pattern: &str) -> Result<CompiledPattern, PatternError> {
            self.compiles.set(self.compiles.get() + 1);
            self.inner.compile(pattern)
        }

        fn syntax_tree(&self, compiled: &CompiledPattern) -> SyntaxTree {
            self.inner.syntax_tree(compiled)
        }

        fn find_all(&self, compiled: &CompiledPattern, subject: &str) -> Vec<Match> {
            self.inner.find_all(compiled, subject)
        }

        fn replace_all(
            &self,
            compiled: &CompiledPattern,
            subject: &str,
            template: &str,
        ) -> Result<String, ReplacementError> {
            self.inner.replace_all(compiled, subject, template)
        }
    }

    #[test]
    fn test_equal_keys_derive_once() {
        let mut gate = Gate::new(CountingProvider::default());
        let state = InputState::new("a+", "baaab");

        let first = gate.get(&state);
        assert!(first.recomputed);
        let first = first.derivation.clone();

        let second = gate.get(&state.clone());
        assert!(!second.recomputed);
        assert_eq!(*second.derivation, first);

        assert_eq!(gate.derivations(), 1);
        assert_eq!(gate.provider.compiles.get(), 1);
    }

    #[test]
    fn test_load_error_is_not_part_of_key() {
        let mut gate = Gate::new(RustRegexProvider::new());
        let state = InputState::new("a", "a").unavailable(None);
        gate.get(&state);
        gate.get(&state.clone().unavailable(Some("still loading".to_string())));
        assert_eq!(gate.derivations(), 1);
    }

    #[test]
    fn test_mode_switch_rederives() {
        let mut gate = Gate::new(RustRegexProvider::new());
        let state = InputState::new("a", "banana");

        for mode in [
            EvaluationMode::Syntax,
            EvaluationMode::Find,
            EvaluationMode::Replace,
        ] {
            let evaluation = gate.get(&state.clone().with_mode(mode));
            assert!(evaluation.recomputed);
            assert!(!evaluation.derivation.is_error());
        }
        assert_eq!(gate.derivations(), 3);
        assert_eq!(gate.generation(), 3);
    }

    #[test]
    fn test_any_key_field_change_rederives() {
        let mut gate = Gate::new(RustRegexProvider::new());
        let base = InputState::new("a", "banana").with_mode(EvaluationMode::Replace);
        gate.get(&base);

        gate.get(&base.clone().with_replacement("X"));
        let mut other = base.clone();
        other.subject = "apple".to_string();
        gate.get(&other);
        other.pattern = "p".to_string();
        gate.get(&other);
        other.engine_available = false;
        assert_eq!(*gate.get(&other).derivation, Derivation::Empty);

        assert_eq!(gate.derivations(), 5);
    }

    #[test]
    fn test_stale_ticket_cannot_commit() {
        let mut gate = Gate::new(RustRegexProvider::new());
        let old_state = InputState::new("a", "aa");
        let new_state = InputState::new("b", "bb");

        let old_ticket = gate.begin(&old_state);
        let new_ticket = gate.begin(&new_state);
        assert!(new_ticket.generation() > old_ticket.generation());

        let fresh = gate.evaluate(&new_state);
        assert!(gate.commit(new_ticket, fresh.clone()));

        let stale = gate.evaluate(&old_state);
        assert!(!gate.commit(old_ticket, stale));
        assert_eq!(gate.cached(), Some(&fresh));

        // The committed key is the fresh one, so it is served from cache.
        assert!(!gate.get(&new_state).recomputed);
    }

    #[test]
    fn test_invalidate_forces_recompute() {
        let mut gate = Gate::new(RustRegexProvider::new());
        let state = InputState::new("a", "a");
        gate.get(&state);
        gate.invalidate();
        assert!(gate.cached().is_none());
        assert!(gate.get(&state).recomputed);
    }
}
