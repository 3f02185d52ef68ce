//! Environment and call-depth tests

use dynval::*;

// ═══════════════════════════════════════════════════════════════════════
// Basic Operations
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_environment_new_is_empty() {
    let env = Environment::new();
    assert!(env.is_empty());
    assert_eq!(env.len(), 0);
}

#[test]
fn test_environment_define_and_get() {
    let mut env = Environment::new();
    env.define("x", 42i64);

    assert_eq!(env.get("x"), Some(DynValue::Int(42)));
    assert_eq!(env.get("y"), None);
    assert!(env.contains("x"));
    assert!(!env.contains("y"));
}

#[test]
fn test_assign_undefined_fails() {
    let env = Environment::new();
    let err = env.assign("ghost", 1i64).unwrap_err();
    assert_eq!(
        err,
        EnvironmentError::UndefinedVariable {
            name: "ghost".to_string()
        }
    );
    assert_eq!(err.to_string(), "undefined variable $ghost");
}

#[test]
fn test_clear_drops_everything() {
    let mut env = Environment::new();
    env.define("a", 1i64);
    env.define("b", 2i64);
    env.clear();

    assert!(env.is_empty());
    assert!(!env.contains("a"));
}

#[test]
fn test_iter_in_definition_order() {
    let mut env = Environment::new();
    env.define("first", 1i64);
    env.define("second", 2i64);
    let names: Vec<&str> = env.iter().map(|(name, _)| name).collect();
    assert_eq!(names, vec!["first", "second"]);
}

// ═══════════════════════════════════════════════════════════════════════
// Reference Cells
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_define_ref_aliases_locals() {
    let mut env = Environment::new();
    env.define("a", "one");
    let cell = env.get_ref("a").unwrap();
    env.define_ref("b", &cell);

    env.assign("b", "two").unwrap();
    assert_eq!(env.get("a"), Some(DynValue::from("two")));
}

#[test]
fn test_redefine_detaches_aliases() {
    let mut env = Environment::new();
    env.define("a", 1i64);
    let old = env.get_ref("a").unwrap();

    env.define("a", 2i64);
    old.set(100i64);
    assert_eq!(env.get("a"), Some(DynValue::Int(2)));
}

#[test]
fn test_get_returns_snapshot() {
    let mut env = Environment::new();
    env.define("arr", DynArray::new());

    let mut snapshot = env.get("arr").unwrap();
    if let Some(a) = snapshot.as_array_mut() {
        a.append(1i64);
    }
    let count = env.get("arr").unwrap().as_array().map(DynArray::count);
    assert_eq!(count, Some(0));
}

// ═══════════════════════════════════════════════════════════════════════
// Call Depth
// ═══════════════════════════════════════════════════════════════════════

#[test]
fn test_call_depth_returns_to_zero_after_errors() {
    let ctx = ExecutionContext::with_config(ContextConfig::new().with_max_call_depth(2));
    let mut ext = Extension::new("failing");
    ext.function("fn fail()", |_| anyhow::bail!("always"))
        .unwrap();
    ctx.load(ext).unwrap();

    assert!(ctx.call("fail", vec![]).is_err());
    assert!(ctx.call("fail", vec![1i64.into()]).is_err());
    assert_eq!(ctx.call_depth(), 0);
}

#[test]
fn test_zero_depth_limit_refuses_every_call() {
    let ctx = ExecutionContext::with_config(ContextConfig::new().with_max_call_depth(0));
    ctx.load(Extension::standard().unwrap()).unwrap();

    let err = ctx.call("strlen", vec!["abc".into()]).unwrap_err();
    assert!(matches!(
        err,
        BridgeError::Binding(BindingError::CallDepthExceeded { max: 0 })
    ));
}

#[test]
fn test_local_passed_inline_while_env_borrowed() {
    let ctx = ExecutionContext::new();
    ctx.load(Extension::standard().unwrap()).unwrap();
    ctx.env_mut().define("n", "12 apples");

    ctx.call("settype_int", vec![CallArg::local(&ctx.env(), "n").unwrap()])
        .unwrap();
    assert_eq!(ctx.env().get("n"), Some(DynValue::Int(12)));
}
