use crate::FixtureEnv;
use interpose::{FunctionMock, MockError, Value};

/// Check that `mock` saw exactly `expected` argument lists, in order
pub fn assert_calls(mock: &FunctionMock, expected: &[Vec<Value>]) {
    let num_calls = mock.num_calls().unwrap();
    assert_eq!(num_calls, expected.len(), "unexpected number of calls to {}", mock.key());
    for (i, args) in expected.iter().enumerate() {
        assert_eq!(&mock.args_for_call(i).unwrap(), args, "call {} to {}", i, mock.key());
    }
}

/// Suite boundary check: no mock left behind and no context leaked
pub fn assert_clean(env: &FixtureEnv) {
    let state = env.state();
    assert_eq!(
        state.current_object().unwrap_err(),
        MockError::NoCurrentContext
    );
    assert_eq!(state.router().context_depth(), 0);
    assert_eq!(state.num_mock_keys(), 0);
    assert!(env.table().is_empty());
}
