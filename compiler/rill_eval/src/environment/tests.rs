use super::*;
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use rill_ir::StringInterner;

#[test]
fn lookup_walks_to_parent() {
    let interner = StringInterner::new();
    let x = interner.intern("x");

    let parent = Env::empty();
    parent.bind(x, Value::Int(1));
    let child = parent.child();

    assert_eq!(child.lookup(x), Lookup::Found(Value::Int(1)));
    assert_eq!(child.get_local(x), None);
}

#[test]
fn child_binding_shadows_parent() {
    let interner = StringInterner::new();
    let x = interner.intern("x");

    let parent = Env::empty();
    parent.bind(x, Value::Int(1));
    let child = parent.child();
    child.bind(x, Value::Int(2));

    assert_eq!(child.lookup(x), Lookup::Found(Value::Int(2)));
    assert_eq!(parent.lookup(x), Lookup::Found(Value::Int(1)));
}

#[test]
fn missing_marker_is_reported_separately() {
    let interner = StringInterner::new();
    let x = interner.intern("x");
    let y = interner.intern("y");

    let env = Env::empty();
    env.bind(x, Value::Missing);

    assert_eq!(env.lookup(x), Lookup::Missing);
    assert_eq!(env.lookup(y), Lookup::NotFound);
}

#[test]
fn superassignment_updates_nearest_enclosing_binding() {
    let interner = StringInterner::new();
    let n = interner.intern("n");

    let global = Env::empty();
    let outer = global.child();
    outer.bind(n, Value::Int(0));
    let inner = outer.child();
    inner.bind(n, Value::Int(100));

    inner.assign_enclosing(n, Value::Int(1), &global);

    assert_eq!(outer.get_local(n), Some(Value::Int(1)));
    assert_eq!(inner.get_local(n), Some(Value::Int(100)));
    assert_eq!(global.get_local(n), None);
}

#[test]
fn superassignment_falls_back_to_global() {
    let interner = StringInterner::new();
    let n = interner.intern("n");

    let empty = Env::empty();
    let global = empty.child();
    let inner = global.child();

    inner.assign_enclosing(n, Value::Int(7), &global);
    assert_eq!(global.get_local(n), Some(Value::Int(7)));
}

#[test]
fn function_lookup_skips_non_functions() {
    let interner = StringInterner::new();
    let f = interner.intern("f");

    let outer = Env::empty();
    let builtin = crate::builtins::BuiltinTable::new()
        .lookup("identity")
        .map(Value::Builtin)
        .unwrap_or(Value::Null);
    outer.bind(f, builtin.clone());
    let inner = outer.child();
    inner.bind(f, Value::Int(1));

    let found = inner.lookup_function(f, |_| Ok(Value::Null)).ok().flatten();
    assert_eq!(found, Some(builtin));
}

#[test]
fn ancestors_end_at_root() {
    let root = Env::empty();
    let leaf = root.child().child();
    let chain: Vec<Env> = leaf.ancestors().collect();
    assert_eq!(chain.len(), 3);
    assert!(chain[2].ptr_eq(&root));
    assert!(chain[0].ptr_eq(&leaf));
}

proptest! {
    /// The innermost binding always wins, however deep the chain.
    #[test]
    fn innermost_binding_wins(depth in 1usize..20, bound_at in proptest::collection::vec(any::<bool>(), 1..20)) {
        let interner = StringInterner::new();
        let x = interner.intern("x");

        let mut envs = vec![Env::empty()];
        for _ in 1..depth {
            let next = envs[envs.len() - 1].child();
            envs.push(next);
        }
        let mut expected = Lookup::NotFound;
        for (level, env) in envs.iter().enumerate() {
            if bound_at.get(level).copied().unwrap_or(false) {
                let value = Value::Int(i64::try_from(level).unwrap_or(i64::MAX));
                env.bind(x, value.clone());
                expected = Lookup::Found(value);
            }
        }
        prop_assert_eq!(envs[envs.len() - 1].lookup(x), expected);
    }
}
