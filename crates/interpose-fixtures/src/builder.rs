use crate::fixture_symbols;
use interpose::config::Config;
use interpose::runtime::resolve_declaring_type;
use interpose::{
    InterceptTable, InterceptionState, MockError, ObjectRef, Result, SymbolKey, SymbolTable,
    TypeDef, Value,
};
use serde_json::json;
use std::cell::RefCell;
use std::rc::Rc;

type FixtureCallback = Rc<dyn Fn() -> Result<Value>>;

pub struct FixtureEnvBuilder {
    symbols: SymbolTable,
    config: Config,
}

impl Default for FixtureEnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FixtureEnvBuilder {
    pub fn new() -> Self {
        Self {
            symbols: fixture_symbols(),
            config: Config::load_or_default(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Add a type on top of the fixture hierarchy
    pub fn with_type(mut self, def: TypeDef) -> Self {
        self.symbols.add_type(def);
        self
    }

    pub fn with_function(mut self, name: &str) -> Self {
        self.symbols.add_function(name);
        self
    }

    pub fn build(self) -> FixtureEnv {
        let table = InterceptTable::new();
        let state = InterceptionState::with_config(self.symbols, table.provider(), &self.config);
        FixtureEnv {
            table,
            state,
            callbacks: Rc::new(RefCell::new(Vec::new())),
        }
    }
}

/// Interception state wired to an in-process provider.
///
/// Fixture methods call through [`FixtureEnv::call_method`] and friends, which
/// is where an instrumented runtime would hook the call.
#[derive(Clone)]
pub struct FixtureEnv {
    table: InterceptTable,
    state: InterceptionState,
    callbacks: Rc<RefCell<Vec<FixtureCallback>>>,
}

impl Default for FixtureEnv {
    fn default() -> Self {
        FixtureEnvBuilder::new().build()
    }
}

impl FixtureEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &InterceptionState {
        &self.state
    }

    pub fn table(&self) -> &InterceptTable {
        &self.table
    }

    /// Invoke `method` on `object`, dispatching on its runtime type
    pub fn call_method<F>(
        &self,
        object: &ObjectRef,
        method: &str,
        args: &[Value],
        original: F,
    ) -> Result<Value>
    where
        F: FnOnce(&[Value]) -> Result<Value>,
    {
        let key = self.method_key(object.class(), method)?;
        self.table.invoke(&key, Some(object), args, original)
    }

    /// Invoke the static `class::method`
    pub fn call_static<F>(&self, class: &str, method: &str, args: &[Value], original: F) -> Result<Value>
    where
        F: FnOnce(&[Value]) -> Result<Value>,
    {
        let key = self.method_key(class, method)?;
        self.table.invoke(&key, None, args, original)
    }

    pub fn call_function<F>(&self, name: &str, args: &[Value], original: F) -> Result<Value>
    where
        F: FnOnce(&[Value]) -> Result<Value>,
    {
        self.table
            .invoke(&SymbolKey::function(name), None, args, original)
    }

    /// Stash `callback` and return the value standing for it in call arguments
    pub fn store_callback(&self, callback: impl Fn() -> Result<Value> + 'static) -> Value {
        let mut callbacks = self.callbacks.borrow_mut();
        callbacks.push(Rc::new(callback));
        json!({ "callback": callbacks.len() - 1 })
    }

    /// Run a callback previously stored with [`store_callback`](Self::store_callback)
    pub fn run_callback(&self, handle: &Value) -> Result<Value> {
        let callback = handle
            .get("callback")
            .and_then(Value::as_u64)
            .and_then(|index| self.callbacks.borrow().get(index as usize).cloned())
            .ok_or_else(|| MockError::CallbackFailed(format!("{} is not a callback", handle)))?;
        callback()
    }

    fn method_key(&self, class: &str, method: &str) -> Result<SymbolKey> {
        let declaring = resolve_declaring_type(self.state.router().symbols(), class, method)?;
        Ok(SymbolKey::method(declaring, method))
    }
}
