//! Generic finite-state-machine engine
//!
//! A machine owns exactly one current state, a model whose fields mirror
//! physical effect, and a transition table resolved at construction time.
//! Enter/exit hooks are plain closures attached to each declared state -
//! there is no name-based dispatch at runtime.
//!
//! Concurrency contract:
//! - All transitions on one machine are serialized behind a single mutex;
//!   hooks run under it and observers never see a mid-transition model.
//! - A hook may fire a *different* machine (the cascade case) - that takes
//!   only the other machine's lock. A hook must never fire its own
//!   machine; use a timeout self-loop for periodic self-advancement.
//! - A state's timeout delivers its trigger at most once per arming, and
//!   only while that state is still current. Re-entering the state (or a
//!   self-loop transition) rearms it; leaving the state disarms it.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// State enter/exit hook. Runs under the machine lock; must not block and
/// must not fire its own machine.
pub type Hook<M> = Box<dyn Fn(&mut M) + Send + Sync>;

/// Source pattern of a declared transition.
#[derive(Debug, Clone, Copy)]
pub enum Source<S> {
    /// Matches one specific current state; wins over [`Source::Any`].
    Exact(S),
    /// Matches any current state (global reset transitions).
    Any,
}

/// One declared state: identifier, optional hooks, optional auto-timeout.
pub struct StateDef<S, T, M> {
    id: S,
    on_enter: Option<Hook<M>>,
    on_exit: Option<Hook<M>>,
    timeout: Option<(Duration, T)>,
}

impl<S, T, M> StateDef<S, T, M> {
    pub fn new(id: S) -> Self {
        Self {
            id,
            on_enter: None,
            on_exit: None,
            timeout: None,
        }
    }

    pub fn on_enter(mut self, hook: impl Fn(&mut M) + Send + Sync + 'static) -> Self {
        self.on_enter = Some(Box::new(hook));
        self
    }

    pub fn on_exit(mut self, hook: impl Fn(&mut M) + Send + Sync + 'static) -> Self {
        self.on_exit = Some(Box::new(hook));
        self
    }

    /// Fire `trigger` on this machine after `after` elapses with the state
    /// still current.
    pub fn timeout(mut self, after: Duration, trigger: T) -> Self {
        self.timeout = Some((after, trigger));
        self
    }
}

/// Builder for a [`StateMachine`]. Declares states and transitions, then
/// seals them into an immutable table.
pub struct MachineBuilder<S, T, M> {
    states: Vec<StateDef<S, T, M>>,
    exact: HashMap<(T, S), S>,
    wildcard: HashMap<T, S>,
}

impl<S, T, M> MachineBuilder<S, T, M>
where
    S: Copy + Eq + Hash + Debug + Send + Sync + 'static,
    T: Copy + Eq + Hash + Debug + Send + Sync + 'static,
    M: Send + 'static,
{
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            exact: HashMap::new(),
            wildcard: HashMap::new(),
        }
    }

    pub fn state(mut self, def: StateDef<S, T, M>) -> Self {
        self.states.push(def);
        self
    }

    pub fn transition(mut self, trigger: T, from: Source<S>, to: S) -> Self {
        match from {
            Source::Exact(state) => {
                let replaced = self.exact.insert((trigger, state), to);
                assert!(
                    replaced.is_none(),
                    "duplicate transition for {trigger:?} from {state:?}"
                );
            }
            Source::Any => {
                let replaced = self.wildcard.insert(trigger, to);
                assert!(replaced.is_none(), "duplicate wildcard for {trigger:?}");
            }
        }
        self
    }

    /// Seal the tables and create the machine in `initial` state. The
    /// initial state's enter hook is *not* run and its timeout is not
    /// armed - machines are born quiescent.
    ///
    /// Must be called from within a tokio runtime (timeouts are spawned
    /// onto the current runtime). Panics on a transition referencing an
    /// undeclared state; that is a wiring bug and startup is the only
    /// place allowed to die.
    pub fn build(self, name: &'static str, model: M, initial: S) -> StateMachine<S, T, M> {
        let states: HashMap<S, StateDef<S, T, M>> =
            self.states.into_iter().map(|def| (def.id, def)).collect();

        for ((trigger, from), to) in &self.exact {
            assert!(
                states.contains_key(from) && states.contains_key(to),
                "transition {trigger:?}: {from:?} -> {to:?} references an undeclared state"
            );
        }
        for (trigger, to) in &self.wildcard {
            assert!(
                states.contains_key(to),
                "wildcard {trigger:?} -> {to:?} references an undeclared state"
            );
        }
        assert!(
            states.contains_key(&initial),
            "initial state {initial:?} is not declared"
        );

        StateMachine(Arc::new(Inner {
            name,
            states,
            exact: self.exact,
            wildcard: self.wildcard,
            runtime: tokio::runtime::Handle::current(),
            core: Mutex::new(Core {
                current: initial,
                model,
                timeout_epoch: 0,
                timeout_task: None,
            }),
        }))
    }
}

impl<S, T, M> Default for MachineBuilder<S, T, M>
where
    S: Copy + Eq + Hash + Debug + Send + Sync + 'static,
    T: Copy + Eq + Hash + Debug + Send + Sync + 'static,
    M: Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

struct Core<S, M> {
    current: S,
    model: M,
    /// Bumped on every transition; a timeout task only fires if its
    /// captured epoch is still current, so stale timers are inert even if
    /// abort raced with their wakeup.
    timeout_epoch: u64,
    timeout_task: Option<JoinHandle<()>>,
}

struct Inner<S, T, M> {
    name: &'static str,
    states: HashMap<S, StateDef<S, T, M>>,
    exact: HashMap<(T, S), S>,
    wildcard: HashMap<T, S>,
    runtime: tokio::runtime::Handle,
    core: Mutex<Core<S, M>>,
}

/// Cheaply clonable handle to a machine. Clones share the same state,
/// model, and serialization lock.
pub struct StateMachine<S, T, M>(Arc<Inner<S, T, M>>);

impl<S, T, M> Clone for StateMachine<S, T, M> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<S, T, M> StateMachine<S, T, M>
where
    S: Copy + Eq + Hash + Debug + Send + Sync + 'static,
    T: Copy + Eq + Hash + Debug + Send + Sync + 'static,
    M: Send + 'static,
{
    /// Fire a trigger. A trigger with no matching transition from the
    /// current state is a logged no-op, never an error.
    pub fn fire(&self, trigger: T) {
        let mut core = self.0.core.lock();
        self.fire_locked(&mut core, trigger);
    }

    fn fire_locked(&self, core: &mut Core<S, M>, trigger: T) {
        let dest = self
            .0
            .exact
            .get(&(trigger, core.current))
            .or_else(|| self.0.wildcard.get(&trigger))
            .copied();

        let Some(dest) = dest else {
            trace!(
                machine = self.0.name,
                ?trigger,
                state = ?core.current,
                "no transition for trigger, ignoring"
            );
            return;
        };

        debug!(
            machine = self.0.name,
            ?trigger,
            from = ?core.current,
            to = ?dest,
            "transition"
        );

        if let Some(hook) = self.0.states[&core.current].on_exit.as_ref() {
            hook(&mut core.model);
        }
        core.current = dest;
        if let Some(hook) = self.0.states[&dest].on_enter.as_ref() {
            hook(&mut core.model);
        }

        self.rearm_timeout(core, self.0.states[&dest].timeout);
    }

    fn rearm_timeout(&self, core: &mut Core<S, M>, timeout: Option<(Duration, T)>) {
        core.timeout_epoch += 1;
        if let Some(task) = core.timeout_task.take() {
            task.abort();
        }
        if let Some((after, trigger)) = timeout {
            let epoch = core.timeout_epoch;
            let machine = self.clone();
            core.timeout_task = Some(self.0.runtime.spawn(async move {
                tokio::time::sleep(after).await;
                machine.fire_timed_out(trigger, epoch);
            }));
        }
    }

    fn fire_timed_out(&self, trigger: T, epoch: u64) {
        let mut core = self.0.core.lock();
        if core.timeout_epoch != epoch {
            // Disarmed or rearmed since this timer was started.
            return;
        }
        self.fire_locked(&mut core, trigger);
    }

    pub fn name(&self) -> &'static str {
        self.0.name
    }

    pub fn current_state(&self) -> S {
        self.0.core.lock().current
    }

    /// Observe the model under the machine lock.
    pub fn model<R>(&self, f: impl FnOnce(&M) -> R) -> R {
        f(&self.0.core.lock().model)
    }
}
