use std::collections::HashMap;

use crate::{
    error::{Error, Result},
    token::Token,
    value::Value,
};

/// Index of a scope inside an `Environment`'s arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeId(usize);

#[derive(Clone, Debug, PartialEq)]
struct Scope {
    enclosing: Option<ScopeId>,
    values: HashMap<String, Value>,
}

/// Every live scope, from the global scope at index 0 to the innermost one.
///
/// Scopes are only ever created and discarded in nested order, so the arena
/// grows and shrinks like a stack while each scope still refers to its
/// parent by index.
#[derive(Clone, Debug, PartialEq)]
pub struct Environment {
    scopes: Vec<Scope>,
    current: ScopeId,
}

const GLOBAL: ScopeId = ScopeId(0);

impl Environment {
    pub fn new() -> Self {
        let global = Scope { enclosing: None, values: HashMap::new() };
        Self { scopes: vec![global], current: GLOBAL }
    }

    pub fn current(&self) -> ScopeId {
        self.current
    }

    pub fn depth(&self) -> usize {
        self.scopes.len()
    }

    /// Opens a scope nested inside the current one and makes it current.
    pub fn push_child_env(&mut self) -> ScopeId {
        let id = ScopeId(self.scopes.len());
        self.scopes.push(Scope { enclosing: Some(self.current), values: HashMap::new() });
        self.current = id;
        id
    }

    /// Discards the current scope and returns to its parent. The global
    /// scope is never discarded.
    pub fn pop_child_env(&mut self) {
        if let Some(parent) = self.scopes[self.current.0].enclosing {
            self.scopes.truncate(self.current.0);
            self.current = parent;
        }
    }

    pub fn get(&self, name: &Token) -> Result<Value> {
        self.resolve(&name.lexeme)
            .and_then(|id| self.scopes[id.0].values.get(&name.lexeme))
            .cloned()
            .ok_or_else(|| undefined_var_error(name))
    }

    pub fn assign(&mut self, name: &Token, value: Value) -> Result<()> {
        let id = self.resolve(&name.lexeme).ok_or_else(|| undefined_var_error(name))?;
        self.scopes[id.0].values.insert(name.lexeme.clone(), value);
        Ok(())
    }

    /// Binds `name` in the current scope, shadowing any outer binding and
    /// overwriting a previous one in the same scope.
    pub fn define<S: Into<String>>(&mut self, name: S, value: Value) {
        self.scopes[self.current.0].values.insert(name.into(), value);
    }

    pub fn get_global(&self, name: &str) -> Option<Value> {
        self.scopes[GLOBAL.0].values.get(name).cloned()
    }

    /// Walks outward from the current scope to the first one binding `name`.
    fn resolve(&self, name: &str) -> Option<ScopeId> {
        let mut cursor = Some(self.current);
        while let Some(id) = cursor {
            let scope = &self.scopes[id.0];
            if scope.values.contains_key(name) {
                return Some(id);
            }
            cursor = scope.enclosing;
        }
        None
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

fn undefined_var_error(name: &Token) -> Error {
    Error::runtime(
        name.clone(),
        format!("Undefined variable '{}'.", name.lexeme)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::TokenKind;

    fn name(s: &str) -> Token {
        Token::new(TokenKind::Identifier, s, 1, 1)
    }

    #[test]
    fn lookup_of_unbound_name_fails() {
        let env = Environment::new();
        let e = env.get(&name("missing")).unwrap_err();
        assert!(e.is_runtime_error());
        assert_eq!("Undefined variable 'missing'.", e.message());
    }

    #[test]
    fn redeclaration_overwrites() {
        let mut env = Environment::new();
        env.define("a", Value::Number(1.0));
        env.define("a", Value::from("two"));
        assert_eq!(Value::from("two"), env.get(&name("a")).unwrap());
    }

    #[test]
    fn assign_never_creates_a_binding() {
        let mut env = Environment::new();
        assert!(env.assign(&name("x"), Value::Number(1.0)).unwrap_err().is_runtime_error());
        assert_eq!(None, env.get_global("x"));
    }

    #[test]
    fn inner_declaration_shadows_without_erasing() {
        let mut env = Environment::new();
        env.define("a", Value::Number(1.0));
        env.push_child_env();
        env.define("a", Value::Number(2.0));
        assert_eq!(Value::Number(2.0), env.get(&name("a")).unwrap());
        env.pop_child_env();
        assert_eq!(Value::Number(1.0), env.get(&name("a")).unwrap());
    }

    #[test]
    fn assign_updates_nearest_enclosing_binding() {
        let mut env = Environment::new();
        env.define("a", Value::Number(1.0));
        env.push_child_env();
        env.push_child_env();
        env.assign(&name("a"), Value::Number(3.0)).unwrap();
        assert_eq!(Value::Number(3.0), env.get(&name("a")).unwrap());
        env.pop_child_env();
        env.pop_child_env();
        assert_eq!(Some(Value::Number(3.0)), env.get_global("a"));
    }

    #[test]
    fn popping_discards_inner_bindings() {
        let mut env = Environment::new();
        let inner = env.push_child_env();
        assert_eq!(2, env.depth());
        assert_eq!(inner, env.current());
        env.define("b", Value::Nil);
        env.pop_child_env();
        assert_eq!(1, env.depth());
        assert!(env.get(&name("b")).is_err());
    }

    #[test]
    fn global_scope_survives_extra_pops() {
        let mut env = Environment::new();
        env.define("a", Value::Bool(true));
        env.pop_child_env();
        assert_eq!(Some(Value::Bool(true)), env.get_global("a"));
    }
}
