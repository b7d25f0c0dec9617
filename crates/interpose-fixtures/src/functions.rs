//! Fixture free functions.

use crate::{FixtureEnv, RETURN_INPUT, RETURN_INPUTS};
use interpose::{Result, Value};

pub fn return_input(env: &FixtureEnv, input: Value) -> Result<Value> {
    env.call_function(RETURN_INPUT, &[input], |args| {
        Ok(args.first().cloned().unwrap_or(Value::Null))
    })
}

/// Returns its three inputs as an array
pub fn return_inputs(env: &FixtureEnv, first: Value, second: Value, third: Value) -> Result<Value> {
    env.call_function(RETURN_INPUTS, &[first, second, third], |args| {
        Ok(Value::Array(args.to_vec()))
    })
}
