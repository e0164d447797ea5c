//! Bounded polymorphic inline caches for dynamically supplied code.
//!
//! `eval(expr)` and forcing a promise both execute code that is only known
//! at run time. A call site that keeps seeing the same few code objects
//! turns each of them into an executable node once and reuses it. Entries
//! are guarded by identity of the code object.
//!
//! A cache holds at most `max_depth` entries. The first miss with a full
//! cache saturates it: from then on the site always takes the generic path
//! and never specializes again.

use smallvec::SmallVec;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::closure::Closure;
use crate::engine::{Engine, EVAL_WRAPPER, PROMISE_WRAPPER};
use crate::environment::Env;
use crate::errors::{EvalError, EvalResult};
use crate::frame::Frame;
use crate::node::Node;
use crate::value::Language;

/// Receives a notification each time a cache inserts a new executable node.
pub trait InsertionListener {
    fn node_inserted(&self);

    /// Number of notifications received so far.
    fn inserted_nodes(&self) -> usize;
}

/// What a cache specializes on and how.
pub trait Specializer {
    /// Runtime code object seen at the site.
    type Operand;
    /// Guard stored in an entry. Holds the guarded object alive so its
    /// identity cannot be reused.
    type Key;

    /// Name of the wrapper frame specialized code runs in.
    const WRAPPER: &'static str;

    fn key(operand: &Self::Operand) -> Self::Key;

    /// Whether `operand` is the object `key` was made from.
    fn guard(key: &Self::Key, operand: &Self::Operand) -> bool;

    /// Build the executable node for `operand`.
    fn reify(engine: &Engine, operand: &Self::Operand) -> Result<Rc<Node>, EvalError>;

    /// Execute `operand` without caching.
    fn generic(
        engine: &Engine,
        operand: &Self::Operand,
        env: &Env,
        frame: &Rc<Frame>,
    ) -> EvalResult;
}

struct CacheEntry<K> {
    key: K,
    node: Rc<Node>,
}

enum CacheState<K> {
    Cold,
    Cached(SmallVec<[CacheEntry<K>; 4]>),
    /// Terminal: the cache overflowed once and is now generic.
    Saturated { cached: usize },
}

/// Observable cache state.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum CacheStateKind {
    Cold,
    Cached(usize),
    Saturated,
}

enum Dispatch {
    Hit(Rc<Node>),
    Miss,
    Generic,
}

pub struct InlineCache<S: Specializer> {
    max_depth: usize,
    state: RefCell<CacheState<S::Key>>,
    _specializer: PhantomData<S>,
}

impl<S: Specializer> InlineCache<S> {
    pub fn new(max_depth: usize) -> Self {
        InlineCache {
            max_depth,
            state: RefCell::new(CacheState::Cold),
            _specializer: PhantomData,
        }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn state_kind(&self) -> CacheStateKind {
        match &*self.state.borrow() {
            CacheState::Cold => CacheStateKind::Cold,
            CacheState::Cached(entries) => CacheStateKind::Cached(entries.len()),
            CacheState::Saturated { .. } => CacheStateKind::Saturated,
        }
    }

    /// Number of specialized entries; frozen once saturated.
    pub fn cached_entries(&self) -> usize {
        match &*self.state.borrow() {
            CacheState::Cold => 0,
            CacheState::Cached(entries) => entries.len(),
            CacheState::Saturated { cached } => *cached,
        }
    }

    pub fn is_generic(&self) -> bool {
        matches!(*self.state.borrow(), CacheState::Saturated { .. })
    }

    /// Execute `operand` in `env`, specializing on it if the cache has room.
    pub fn execute(
        &self,
        engine: &Engine,
        listener: &dyn InsertionListener,
        operand: &S::Operand,
        env: &Env,
        frame: &Rc<Frame>,
    ) -> EvalResult {
        // No borrow of `state` may be held while evaluating: the code being
        // run can reach this same cache again.
        match self.dispatch(operand) {
            Dispatch::Hit(node) => engine.eval_specialized(&node, S::WRAPPER, env, frame),
            Dispatch::Miss => {
                let node = S::reify(engine, operand)?;
                if self.insert(S::key(operand), Rc::clone(&node)) {
                    listener.node_inserted();
                    tracing::debug!(entries = self.cached_entries(), "inline cache specialized");
                    engine.eval_specialized(&node, S::WRAPPER, env, frame)
                } else {
                    S::generic(engine, operand, env, frame)
                }
            }
            Dispatch::Generic => S::generic(engine, operand, env, frame),
        }
    }

    fn dispatch(&self, operand: &S::Operand) -> Dispatch {
        let mut state = self.state.borrow_mut();
        let len = match &*state {
            CacheState::Saturated { .. } => return Dispatch::Generic,
            CacheState::Cold => 0,
            CacheState::Cached(entries) => {
                if let Some(entry) = entries.iter().find(|e| S::guard(&e.key, operand)) {
                    return Dispatch::Hit(Rc::clone(&entry.node));
                }
                entries.len()
            }
        };
        if len >= self.max_depth {
            *state = CacheState::Saturated { cached: len };
            tracing::debug!(
                max_depth = self.max_depth,
                "inline cache saturated, switching to generic path"
            );
            Dispatch::Generic
        } else {
            Dispatch::Miss
        }
    }

    fn insert(&self, key: S::Key, node: Rc<Node>) -> bool {
        let mut state = self.state.borrow_mut();
        if matches!(*state, CacheState::Cold) {
            *state = CacheState::Cached(SmallVec::new());
        }
        match &mut *state {
            CacheState::Cached(entries) if entries.len() < self.max_depth => {
                entries.push(CacheEntry { key, node });
                true
            }
            _ => false,
        }
    }
}

/// Specializes `eval` on the language object it is given.
pub struct ExpressionSpecializer;

/// Guard of an expression-cache entry.
pub enum ExpressionKey {
    /// Quoted code: identity of the underlying node.
    Node(Rc<Node>),
    /// Assembled call: identity of the language object.
    Call(Rc<Language>),
}

impl Specializer for ExpressionSpecializer {
    type Operand = Rc<Language>;
    type Key = ExpressionKey;

    const WRAPPER: &'static str = EVAL_WRAPPER;

    fn key(operand: &Rc<Language>) -> ExpressionKey {
        match &**operand {
            Language::Node(node) => ExpressionKey::Node(Rc::clone(node)),
            Language::Call(_) => ExpressionKey::Call(Rc::clone(operand)),
        }
    }

    fn guard(key: &ExpressionKey, operand: &Rc<Language>) -> bool {
        match (key, &**operand) {
            (ExpressionKey::Node(cached), Language::Node(node)) => Rc::ptr_eq(cached, node),
            (ExpressionKey::Call(cached), Language::Call(_)) => Rc::ptr_eq(cached, operand),
            _ => false,
        }
    }

    fn reify(engine: &Engine, operand: &Rc<Language>) -> Result<Rc<Node>, EvalError> {
        engine.make_call_node(operand)
    }

    fn generic(
        engine: &Engine,
        operand: &Rc<Language>,
        env: &Env,
        frame: &Rc<Frame>,
    ) -> EvalResult {
        engine.eval_language_from(operand, env, frame)
    }
}

/// Specializes promise forcing on the promise's code.
pub struct PromiseSpecializer;

impl Specializer for PromiseSpecializer {
    type Operand = Closure;
    type Key = Rc<Node>;

    const WRAPPER: &'static str = PROMISE_WRAPPER;

    fn key(operand: &Closure) -> Rc<Node> {
        Rc::clone(operand.code())
    }

    fn guard(key: &Rc<Node>, operand: &Closure) -> bool {
        Rc::ptr_eq(key, operand.code())
    }

    fn reify(_engine: &Engine, operand: &Closure) -> Result<Rc<Node>, EvalError> {
        Ok(Rc::clone(operand.code()))
    }

    fn generic(engine: &Engine, operand: &Closure, _env: &Env, frame: &Rc<Frame>) -> EvalResult {
        operand.eval(engine, frame)
    }
}

pub type ExpressionCache = InlineCache<ExpressionSpecializer>;
pub type PromiseCache = InlineCache<PromiseSpecializer>;

#[cfg(test)]
mod tests;
