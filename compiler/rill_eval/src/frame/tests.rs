use super::*;
use pretty_assertions::assert_eq;

#[test]
fn slow_path_flag_is_one_way() {
    let access = CallerFrameAccess::new();
    assert_eq!(access.state(), CallerAccessState::Uninitialized);
    assert!(access.enter_slow_path());
    assert!(!access.enter_slow_path());
    assert_eq!(access.state(), CallerAccessState::SlowPathSeen);
}

#[test]
fn call_site_upgrade_is_one_way() {
    let site = CallSite::new();
    assert!(!site.needs_caller_frame());
    assert!(site.set_needs_caller_frame());
    assert!(!site.set_needs_caller_frame());
    assert!(site.needs_caller_frame());
}

#[test]
fn top_level_frame_has_no_caller() {
    let frame = Frame::top_level(Env::empty());
    assert!(matches!(frame.caller(), CallerLink::TopLevel));
    assert_eq!(frame.depth(), 0);
    assert!(frame.function().is_none());
}

#[test]
fn wrapper_frame_keeps_materialized_caller() {
    let env = Env::empty();
    let top = Rc::new(Frame::top_level(env.clone()));
    let wrapper = Frame::wrapper(
        Rc::from("<eval wrapper>"),
        env,
        CallerLink::Materialized(Rc::clone(&top)),
        1,
    );
    let CallerLink::Materialized(caller) = wrapper.caller() else {
        panic!("expected materialized caller");
    };
    assert!(Rc::ptr_eq(caller, &top));
    assert_eq!(wrapper.name(), "<eval wrapper>");
}

#[test]
fn activation_follows_inherited_links() {
    let env = Env::empty();
    let top = Rc::new(Frame::top_level(env.clone()));
    let eval_wrapper = Rc::new(Frame::wrapper(
        Rc::from("<eval wrapper>"),
        env.clone(),
        CallerLink::Inherited(Rc::clone(&top)),
        1,
    ));
    let promise_wrapper = Rc::new(Frame::wrapper(
        Rc::from("<promise wrapper>"),
        env,
        CallerLink::Inherited(Rc::clone(&eval_wrapper)),
        2,
    ));
    assert!(Rc::ptr_eq(&promise_wrapper.activation(), &top));
    assert!(Rc::ptr_eq(&top.activation(), &top));
}
