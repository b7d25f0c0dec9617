use crate::{MockError, Result, SymbolKind};
use std::collections::{HashMap, HashSet};
use std::fmt;

/// Identity of an interceptable symbol
#[derive(Clone, Debug, Eq, Hash, PartialEq, PartialOrd, Ord)]
pub enum SymbolKey {
    /// `Class::method`, where `Class` is the declaring type
    Method { class: String, method: String },
    /// Fully qualified free function name
    Function(String),
}

impl SymbolKey {
    pub fn method(class: &str, method: &str) -> Self {
        SymbolKey::Method {
            class: class.to_string(),
            method: method.to_string(),
        }
    }

    pub fn function(name: &str) -> Self {
        SymbolKey::Function(name.to_string())
    }

    pub fn is_function(&self) -> bool {
        matches!(self, SymbolKey::Function(_))
    }
}

impl fmt::Display for SymbolKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SymbolKey::Method { class, method } => write!(f, "{}::{}", class, method),
            SymbolKey::Function(name) => write!(f, "{}", name),
        }
    }
}

/// Description of one type: its parent and the methods it defines itself.
///
/// Overrides count as definitions. Methods mixed in from traits should be
/// listed on the type that uses the trait.
#[derive(Clone, Debug, Default)]
pub struct TypeDef {
    name: String,
    parent: Option<String>,
    methods: HashSet<String>,
}

impl TypeDef {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Self::default()
        }
    }

    pub fn extends(mut self, parent: &str) -> Self {
        self.parent = Some(parent.to_string());
        self
    }

    pub fn method(mut self, method: &str) -> Self {
        self.methods.insert(method.to_string());
        self
    }

    pub fn methods<'a>(mut self, methods: impl IntoIterator<Item = &'a str>) -> Self {
        self.methods
            .extend(methods.into_iter().map(|m| m.to_string()));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    pub fn defines(&self, method: &str) -> bool {
        self.methods.contains(method)
    }
}

/// Explicit type hierarchy and free function catalog
#[derive(Clone, Debug, Default)]
pub struct SymbolTable {
    types: HashMap<String, TypeDef>,
    functions: HashSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, def: TypeDef) -> Self {
        self.add_type(def);
        self
    }

    pub fn with_function(mut self, name: &str) -> Self {
        self.add_function(name);
        self
    }

    pub fn add_type(&mut self, def: TypeDef) {
        self.types.insert(def.name.clone(), def);
    }

    pub fn add_function(&mut self, name: &str) {
        self.functions.insert(name.to_string());
    }

    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.contains(name)
    }

    /// Ancestor chain of `name`, starting with `name` itself.
    ///
    /// Unknown parents end the chain, and so does a cycle.
    pub fn ancestors(&self, name: &str) -> Vec<&TypeDef> {
        let mut chain: Vec<&TypeDef> = Vec::new();
        let mut current = self.types.get(name);
        while let Some(def) = current {
            if chain.iter().any(|seen| seen.name == def.name) {
                break;
            }
            chain.push(def);
            current = def.parent.as_deref().and_then(|p| self.types.get(p));
        }
        chain
    }

    /// Key for a class-level mock.
    ///
    /// With `strict` set, `class` must itself be the declaring type of `method`.
    pub fn class_method_key(&self, class: &str, method: &str, strict: bool) -> Result<SymbolKey> {
        let declaring = resolve_declaring_type(self, class, method)?;
        if strict && declaring != class {
            return Err(MockError::DeclaringClassMismatch {
                requested: class.to_string(),
                declaring: declaring.to_string(),
                method: method.to_string(),
            });
        }
        Ok(SymbolKey::method(declaring, method))
    }

    /// Key for a free function mock
    pub fn function_key(&self, name: &str) -> Result<SymbolKey> {
        if !self.has_function(name) {
            return Err(MockError::SymbolNotFound {
                symbol: name.to_string(),
                kind: SymbolKind::Function,
            });
        }
        Ok(SymbolKey::function(name))
    }
}

/// Find the closest type in `ty`'s ancestry (including `ty`) that defines `method`.
pub fn resolve_declaring_type<'a>(table: &'a SymbolTable, ty: &str, method: &str) -> Result<&'a str> {
    table
        .ancestors(ty)
        .into_iter()
        .find(|def| def.defines(method))
        .map(|def| def.name.as_str())
        .ok_or_else(|| MockError::SymbolNotFound {
            symbol: format!("{}::{}", ty, method),
            kind: SymbolKind::Method,
        })
}
