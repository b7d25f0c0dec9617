//! End-to-end mocking through the fixture classes.
//!
//! Every test builds its own environment and ends with `assert_clean`, which
//! checks that the scoped guards removed every mock.

use interpose::{MockError, ObjectRef, Result, Scoped, Value};
use interpose_fixtures::assertions::{assert_calls, assert_clean};
use interpose_fixtures::functions::{return_input, return_inputs};
use interpose_fixtures::{
    AnotherClass, ChildClass, FixtureEnv, TestClass, RETURN_INPUT, RETURN_INPUTS,
};
use serde_json::json;

fn one(_: Option<&ObjectRef>, _: &[Value]) -> Result<Value> {
    Ok(json!(1))
}

fn two(_: Option<&ObjectRef>, _: &[Value]) -> Result<Value> {
    Ok(json!(2))
}

fn square(_: Option<&ObjectRef>, args: &[Value]) -> Result<Value> {
    let n = args[0].as_i64().unwrap_or_default();
    Ok(json!(n * n))
}

fn cube(_: Option<&ObjectRef>, args: &[Value]) -> Result<Value> {
    let n = args[0].as_i64().unwrap_or_default();
    Ok(json!(n * n * n))
}

#[test]
fn test_class_mock() {
    let env = FixtureEnv::new();
    let state = env.state();
    let first_object = TestClass::new(&env);

    assert_eq!(first_object.return_input(json!(0)).unwrap(), json!(0));
    {
        let class_mock = Scoped::new(state.mock_class("TestClass"));
        let method_mock = class_mock.mock_method("returnInput", one).unwrap();
        let second_object = TestClass::new(&env);

        assert_eq!(first_object.return_input(json!(0)).unwrap(), json!(1));
        assert_eq!(second_object.return_input(json!(2)).unwrap(), json!(1));
        assert_calls(&method_mock, &[vec![json!(0)], vec![json!(2)]]);
    }
    assert_eq!(first_object.return_input(json!(0)).unwrap(), json!(0));

    assert_clean(&env);
}

#[test]
fn test_object_mock() {
    let env = FixtureEnv::new();
    let state = env.state();
    let first_object = TestClass::new(&env);
    let second_object = TestClass::new(&env);
    let third_object = TestClass::new(&env);
    {
        let second_mock = Scoped::new(state.mock_object(second_object.object()));
        let third_mock = Scoped::new(state.mock_object(third_object.object()));
        let second_method = second_mock.mock_method("returnInput", square).unwrap();
        let third_method = third_mock.mock_method("returnInput", cube).unwrap();

        assert_eq!(first_object.return_input(json!(2)).unwrap(), json!(2));
        assert_eq!(second_object.return_input(json!(2)).unwrap(), json!(4));
        assert_eq!(third_object.return_input(json!(2)).unwrap(), json!(8));
        assert_calls(&second_method, &[vec![json!(2)]]);
        assert_calls(&third_method, &[vec![json!(2)]]);
    }
    assert_eq!(first_object.return_input(json!(2)).unwrap(), json!(2));
    assert_eq!(second_object.return_input(json!(2)).unwrap(), json!(2));
    assert_eq!(third_object.return_input(json!(2)).unwrap(), json!(2));

    assert_clean(&env);
}

#[test]
fn test_class_method_mock() {
    let env = FixtureEnv::new();
    {
        let method_mock =
            Scoped::new(env.state().mock_class_method("TestClass", "returnInput", one).unwrap());
        let first_object = TestClass::new(&env);
        let second_object = TestClass::new(&env);

        assert_eq!(first_object.return_input(json!(0)).unwrap(), json!(1));
        assert_eq!(second_object.return_input(json!(2)).unwrap(), json!(1));
        assert_calls(&method_mock, &[vec![json!(0)], vec![json!(2)]]);

        let calls = method_mock.calls().unwrap();
        assert_eq!(calls[0].target, Some(first_object.object().id()));
        assert_eq!(calls[1].target, Some(second_object.object().id()));
    }
    assert_clean(&env);
}

#[test]
fn test_static_method_mock_then_restore() {
    let env = FixtureEnv::new();
    let method_mock = env
        .state()
        .mock_class_method("TestClass", "staticReturnInput", one)
        .unwrap();

    assert_eq!(TestClass::static_return_input(&env, json!(0)).unwrap(), json!(1));
    assert_calls(&method_mock, &[vec![json!(0)]]);
    assert_eq!(method_mock.calls().unwrap()[0].target, None);

    env.state().deactivate_all().unwrap();
    assert_eq!(TestClass::static_return_input(&env, json!(0)).unwrap(), json!(0));
    assert_eq!(
        method_mock.num_calls().unwrap_err(),
        MockError::UseAfterDeactivation
    );

    assert_clean(&env);
}

#[test]
fn test_object_method_mock() {
    let env = FixtureEnv::new();
    let first_object = TestClass::new(&env);
    let second_object = TestClass::new(&env);
    {
        let method_mock = Scoped::new(
            env.state()
                .mock_object_method(second_object.object(), "returnInput", square)
                .unwrap(),
        );

        assert_eq!(first_object.return_input(json!(2)).unwrap(), json!(2));
        assert_eq!(second_object.return_input(json!(2)).unwrap(), json!(4));
        assert_calls(&method_mock, &[vec![json!(2)]]);
    }
    assert_clean(&env);
}

#[test]
fn test_global_function_mock() {
    let env = FixtureEnv::new();
    assert_eq!(return_input(&env, json!(0)).unwrap(), json!(0));
    {
        let function_mock =
            Scoped::new(env.state().mock_global_function(RETURN_INPUT, one).unwrap());
        assert_eq!(return_input(&env, json!(0)).unwrap(), json!(1));
        assert_calls(&function_mock, &[vec![json!(0)]]);
    }
    assert_eq!(return_input(&env, json!(0)).unwrap(), json!(0));

    assert_clean(&env);
}

#[test]
fn test_spies_run_original() {
    let env = FixtureEnv::new();
    let state = env.state();
    let object = TestClass::new(&env);
    {
        let class_spy = Scoped::new(state.spy_class_method("TestClass", "returnInput").unwrap());
        let function_spy = Scoped::new(state.spy_global_function(RETURN_INPUT).unwrap());

        assert_eq!(object.return_input(json!(0)).unwrap(), json!(0));
        assert_eq!(TestClass::new(&env).return_input(json!(1)).unwrap(), json!(1));
        assert_eq!(return_input(&env, json!(3)).unwrap(), json!(3));

        assert_calls(&class_spy, &[vec![json!(0)], vec![json!(1)]]);
        assert_calls(&function_spy, &[vec![json!(3)]]);
    }
    {
        let other = TestClass::new(&env);
        let object_spy = Scoped::new(state.spy_object_method(object.object(), "returnInput").unwrap());

        assert_eq!(object.return_input(json!(5)).unwrap(), json!(5));
        assert_eq!(other.return_input(json!(6)).unwrap(), json!(6));
        assert_calls(&object_spy, &[vec![json!(5)]]);
    }
    assert_clean(&env);
}

#[test]
fn test_mock_protected_method_short_circuits_private() {
    let env = FixtureEnv::new();
    let state = env.state();
    let object = TestClass::new(&env);
    {
        let protected_mock = Scoped::new(
            state
                .mock_object_method(object.object(), "protectedReturnInput", one)
                .unwrap(),
        );
        let private_spy = Scoped::new(
            state
                .spy_object_method(object.object(), "privateReturnInput")
                .unwrap(),
        );

        assert_eq!(object.public_return_input(json!(0)).unwrap(), json!(1));
        assert_eq!(protected_mock.num_calls().unwrap(), 1);
        assert_eq!(private_spy.num_calls().unwrap(), 0);
    }
    {
        let private_mock = Scoped::new(
            state
                .mock_object_method(object.object(), "privateReturnInput", one)
                .unwrap(),
        );
        assert_eq!(object.public_return_input(json!(0)).unwrap(), json!(1));
        assert_eq!(private_mock.num_calls().unwrap(), 1);
    }
    assert_clean(&env);
}

#[test]
fn test_mock_static_method_skips_inner_calls() {
    let env = FixtureEnv::new();
    let state = env.state();
    {
        let static_mock =
            Scoped::new(state.mock_class_method("TestClass", "staticReturnInput", one).unwrap());
        let public_spy =
            Scoped::new(state.spy_class_method("TestClass", "publicReturnInput").unwrap());

        assert_eq!(TestClass::static_return_input(&env, json!(0)).unwrap(), json!(1));
        assert_eq!(static_mock.num_calls().unwrap(), 1);
        assert_eq!(public_spy.num_calls().unwrap(), 0);
    }
    assert_clean(&env);
}

#[test]
fn test_mock_parent_class_method() {
    let env = FixtureEnv::new();
    let state = env.state();
    let object = TestClass::new(&env);
    let child = ChildClass::new(&env);
    {
        let _return_input = Scoped::new(state.mock_class_method("TestClass", "returnInput", one).unwrap());
        assert_eq!(object.return_input(json!(0)).unwrap(), json!(1));
        assert_eq!(child.return_input(json!(0)).unwrap(), json!(1));

        let _overridden = Scoped::new(
            state
                .mock_class_method("TestClass", "overriddenReturnInput", one)
                .unwrap(),
        );
        assert_eq!(object.overridden_return_input(json!(0)).unwrap(), json!(1));
        assert_eq!(child.overridden_return_input(json!(0)).unwrap(), json!(0));
    }
    assert_clean(&env);
}

#[test]
fn test_mock_parent_class_static_method() {
    let env = FixtureEnv::new();
    let state = env.state();
    {
        let _static = Scoped::new(state.mock_class_method("TestClass", "staticReturnInput", one).unwrap());
        assert_eq!(TestClass::static_return_input(&env, json!(0)).unwrap(), json!(1));
        assert_eq!(ChildClass::static_return_input(&env, json!(0)).unwrap(), json!(1));

        let _parent = Scoped::new(
            state
                .mock_class_method("TestClass", "overriddenStaticReturnInput", one)
                .unwrap(),
        );
        assert_eq!(
            TestClass::overridden_static_return_input(&env, json!(0)).unwrap(),
            json!(1)
        );
        assert_eq!(
            ChildClass::overridden_static_return_input(&env, json!(0)).unwrap(),
            json!(0)
        );

        let _child = Scoped::new(
            state
                .mock_class_method("ChildClass", "overriddenStaticReturnInput", two)
                .unwrap(),
        );
        assert_eq!(
            TestClass::overridden_static_return_input(&env, json!(0)).unwrap(),
            json!(1)
        );
        assert_eq!(
            ChildClass::overridden_static_return_input(&env, json!(0)).unwrap(),
            json!(2)
        );
    }
    assert_clean(&env);
}

#[test]
fn test_mock_parent_object_method_blocks_class_mock() {
    let env = FixtureEnv::new();
    let state = env.state();
    let child = ChildClass::new(&env);
    {
        let _object_mock =
            Scoped::new(state.mock_object_method(child.object(), "returnInput", one).unwrap());
        assert_eq!(child.return_input(json!(0)).unwrap(), json!(1));

        let err = state
            .mock_class_method("TestClass", "returnInput", one)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "The method `TestClass::returnInput` has already been mocked."
        );
    }
    assert_clean(&env);
}

#[test]
fn test_mock_trait_method() {
    let env = FixtureEnv::new();
    assert_eq!(
        TestClass::trait_static_return_input(&env, json!(0)).unwrap(),
        json!(0)
    );
    {
        let _mock = Scoped::new(
            env.state()
                .mock_class_method("TestClass", "traitStaticReturnInput", one)
                .unwrap(),
        );
        assert_eq!(
            TestClass::trait_static_return_input(&env, json!(0)).unwrap(),
            json!(1)
        );
    }
    assert_clean(&env);
}

#[test]
fn test_mock_multiple_classes_and_objects() {
    let env = FixtureEnv::new();
    let state = env.state();
    let object = TestClass::new(&env);
    let another = AnotherClass::new(&env);
    {
        let _a = Scoped::new(state.mock_class_method("TestClass", "staticReturnInput", one).unwrap());
        let _b = Scoped::new(
            state
                .mock_class_method("AnotherClass", "anotherStaticReturnInput", two)
                .unwrap(),
        );
        assert_eq!(TestClass::static_return_input(&env, json!(0)).unwrap(), json!(1));
        assert_eq!(
            AnotherClass::another_static_return_input(&env, json!(0)).unwrap(),
            json!(2)
        );
    }
    {
        let _a = Scoped::new(state.mock_object_method(object.object(), "returnInput", one).unwrap());
        let _b = Scoped::new(
            state
                .mock_object_method(another.object(), "anotherReturnInput", two)
                .unwrap(),
        );
        assert_eq!(object.return_input(json!(0)).unwrap(), json!(1));
        assert_eq!(another.another_return_input(json!(0)).unwrap(), json!(2));
    }
    assert_clean(&env);
}

#[test]
fn test_mock_function_with_multiple_args() {
    let env = FixtureEnv::new();
    assert_eq!(
        return_inputs(&env, json!(1), json!(2), json!(3)).unwrap(),
        json!([1, 2, 3])
    );
    {
        let function_mock = Scoped::new(
            env.state()
                .mock_global_function(RETURN_INPUTS, |_, args| {
                    let n: Vec<i64> = args.iter().map(|a| a.as_i64().unwrap_or_default()).collect();
                    Ok(json!([n[0], n[1] * n[1], n[2] * n[2] * n[2]]))
                })
                .unwrap(),
        );
        assert_eq!(
            return_inputs(&env, json!(1), json!(2), json!(3)).unwrap(),
            json!([1, 4, 27])
        );
        assert_eq!(
            function_mock.args_for_call(0).unwrap(),
            vec![json!(1), json!(2), json!(3)]
        );
    }
    assert_clean(&env);
}

#[test]
fn test_noops_return_null() {
    let env = FixtureEnv::new();
    let state = env.state();
    let object = TestClass::new(&env);
    {
        let class_mock = Scoped::new(state.mock_class("TestClass"));
        let method_noop = class_mock.noop_method("staticReturnInput").unwrap();
        assert_eq!(TestClass::static_return_input(&env, json!(0)).unwrap(), Value::Null);
        assert_eq!(method_noop.num_calls().unwrap(), 1);
    }
    assert_eq!(TestClass::static_return_input(&env, json!(0)).unwrap(), json!(0));
    {
        let method_noop =
            Scoped::new(state.noop_class_method("TestClass", "staticReturnInput").unwrap());
        assert_eq!(TestClass::static_return_input(&env, json!(0)).unwrap(), Value::Null);
        assert_eq!(method_noop.num_calls().unwrap(), 1);
    }
    {
        let object_mock = Scoped::new(state.mock_object(object.object()));
        let method_noop = object_mock.noop_method("returnInput").unwrap();
        assert_eq!(object.return_input(json!(0)).unwrap(), Value::Null);
        assert_eq!(method_noop.num_calls().unwrap(), 1);
    }
    {
        let method_noop =
            Scoped::new(state.noop_object_method(object.object(), "returnInput").unwrap());
        assert_eq!(object.return_input(json!(0)).unwrap(), Value::Null);
        assert_eq!(method_noop.num_calls().unwrap(), 1);
    }
    {
        let function_noop = Scoped::new(state.noop_global_function(RETURN_INPUT).unwrap());
        assert_eq!(return_input(&env, json!(0)).unwrap(), Value::Null);
        assert_eq!(function_noop.num_calls().unwrap(), 1);
    }
    assert_clean(&env);
}

#[test]
fn test_callback_error_propagates() {
    let env = FixtureEnv::new();
    {
        let _mock = Scoped::new(
            env.state()
                .mock_global_function(RETURN_INPUT, |_, _| {
                    Err(MockError::CallbackFailed("boom".to_string()))
                })
                .unwrap(),
        );
        let err = return_input(&env, json!(0)).unwrap_err();
        assert_eq!(err, MockError::CallbackFailed("boom".to_string()));
        assert_eq!(env.state().router().context_depth(), 0);
    }
    assert_clean(&env);
}
