#![allow(clippy::unwrap_used, reason = "tests use unwrap for brevity")]

use super::*;
use crate::console::silent_console;
use crate::value::{LangCall, Value};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rill_ir::Span;
use std::cell::Cell;

/// Specializes on constant nodes; the generic path is recognizable.
struct ConstantSpecializer;

impl Specializer for ConstantSpecializer {
    type Operand = Rc<Node>;
    type Key = Rc<Node>;

    const WRAPPER: &'static str = EVAL_WRAPPER;

    fn key(operand: &Rc<Node>) -> Rc<Node> {
        Rc::clone(operand)
    }

    fn guard(key: &Rc<Node>, operand: &Rc<Node>) -> bool {
        Rc::ptr_eq(key, operand)
    }

    fn reify(_engine: &Engine, operand: &Rc<Node>) -> Result<Rc<Node>, EvalError> {
        Ok(Rc::clone(operand))
    }

    fn generic(
        _engine: &Engine,
        _operand: &Rc<Node>,
        _env: &Env,
        _frame: &Rc<Frame>,
    ) -> EvalResult {
        Ok(Value::string("generic"))
    }
}

#[derive(Default)]
struct Listener {
    inserted: Cell<usize>,
}

impl InsertionListener for Listener {
    fn node_inserted(&self) {
        self.inserted.set(self.inserted.get() + 1);
    }

    fn inserted_nodes(&self) -> usize {
        self.inserted.get()
    }
}

fn engine() -> Engine {
    Engine::builder().console(silent_console()).build()
}

fn constant(n: i64) -> Rc<Node> {
    Rc::new(Node::constant(Value::Int(n), Span::DUMMY))
}

fn execute(
    cache: &InlineCache<ConstantSpecializer>,
    engine: &Engine,
    listener: &Listener,
    operand: &Rc<Node>,
) -> Value {
    let env = engine.global_env().clone();
    let frame = Rc::clone(engine.global_frame());
    cache.execute(engine, listener, operand, &env, &frame).unwrap()
}

#[test]
fn first_operand_is_specialized() {
    let engine = engine();
    let listener = Listener::default();
    let cache = InlineCache::<ConstantSpecializer>::new(2);
    assert_eq!(cache.state_kind(), CacheStateKind::Cold);

    let one = constant(1);
    assert_eq!(execute(&cache, &engine, &listener, &one), Value::Int(1));
    assert_eq!(cache.state_kind(), CacheStateKind::Cached(1));
    assert_eq!(listener.inserted_nodes(), 1);
}

#[test]
fn hits_do_not_notify_again() {
    let engine = engine();
    let listener = Listener::default();
    let cache = InlineCache::<ConstantSpecializer>::new(2);
    let one = constant(1);
    for _ in 0..5 {
        assert_eq!(execute(&cache, &engine, &listener, &one), Value::Int(1));
    }
    assert_eq!(cache.cached_entries(), 1);
    assert_eq!(listener.inserted_nodes(), 1);
}

#[test]
fn equal_but_distinct_operands_are_separate_entries() {
    let engine = engine();
    let listener = Listener::default();
    let cache = InlineCache::<ConstantSpecializer>::new(4);
    execute(&cache, &engine, &listener, &constant(7));
    execute(&cache, &engine, &listener, &constant(7));
    assert_eq!(cache.state_kind(), CacheStateKind::Cached(2));
}

#[test]
fn overflow_switches_to_generic_for_good() {
    let engine = engine();
    let listener = Listener::default();
    let cache = InlineCache::<ConstantSpecializer>::new(2);
    let operands: Vec<_> = (1..=4).map(constant).collect();

    assert_eq!(execute(&cache, &engine, &listener, &operands[0]), Value::Int(1));
    assert_eq!(execute(&cache, &engine, &listener, &operands[1]), Value::Int(2));
    assert_eq!(
        execute(&cache, &engine, &listener, &operands[2]),
        Value::string("generic")
    );
    assert_eq!(
        execute(&cache, &engine, &listener, &operands[3]),
        Value::string("generic")
    );
    // Even operands that were cached now take the generic path.
    assert_eq!(
        execute(&cache, &engine, &listener, &operands[0]),
        Value::string("generic")
    );

    assert!(cache.is_generic());
    assert_eq!(cache.cached_entries(), 2);
    assert_eq!(listener.inserted_nodes(), 2);
}

#[test]
fn zero_depth_is_generic_on_first_use() {
    let engine = engine();
    let listener = Listener::default();
    let cache = InlineCache::<ConstantSpecializer>::new(0);
    assert_eq!(
        execute(&cache, &engine, &listener, &constant(1)),
        Value::string("generic")
    );
    assert_eq!(cache.state_kind(), CacheStateKind::Saturated);
    assert_eq!(listener.inserted_nodes(), 0);
}

#[test]
fn expression_keys_use_language_identity() {
    let engine = engine();
    let listener = Listener::default();
    let cache = ExpressionCache::new(4);
    let identity = Value::Symbol(engine.interner().intern("identity"));
    let make = || {
        Rc::new(Language::Call(LangCall::new(vec![
            identity.clone(),
            Value::Int(3),
        ])))
    };
    let first = make();
    let env = engine.global_env().clone();
    let frame = Rc::clone(engine.global_frame());
    for lang in [&first, &first, &make()] {
        let value = cache.execute(&engine, &listener, lang, &env, &frame).unwrap();
        assert_eq!(value, Value::Int(3));
    }
    assert_eq!(cache.state_kind(), CacheStateKind::Cached(2));
}

proptest! {
    #[test]
    fn cache_never_exceeds_its_bound(
        max_depth in 0usize..5,
        picks in prop::collection::vec(0usize..8, 1..40),
    ) {
        let engine = engine();
        let listener = Listener::default();
        let cache = InlineCache::<ConstantSpecializer>::new(max_depth);
        let operands: Vec<_> = (0..8).map(constant).collect();
        let mut went_generic = false;
        for pick in picks {
            execute(&cache, &engine, &listener, &operands[pick]);
            prop_assert!(cache.cached_entries() <= max_depth);
            if went_generic {
                prop_assert!(cache.is_generic());
            }
            went_generic = cache.is_generic();
        }
        prop_assert_eq!(listener.inserted_nodes(), cache.cached_entries());
    }
}
