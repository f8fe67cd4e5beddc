//! Symbol table builder.
//!
//! A single forward pass over top-level declarations assigns every global
//! and local variable a slot index, following textual declaration order —
//! see `SPEC_FULL.md` §4.3 for why that order must survive into the
//! generated code unchanged (global slots are absolute `SS` indices, so the
//! prologue's push order has to match the slots this builder hands out).
//!
//! Semantic conditions this language does not check (redeclaration,
//! use-before-declaration, arity mismatches, a missing `main`) are not
//! rejected here; they are logged as warnings so a user running with
//! `RUST_LOG=warn` can see them without the compiler refusing to build.

#[cfg(test)]
mod tests;

use indexmap::IndexMap;

use crate::parser::ast::{Decl, FuncDecl, Program, VarDecl};

pub const GLOBAL_SCOPE: &str = "__GLOBAL__";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VarSlot {
    pub slot: i32,
    /// `0` means scalar; `N` means an array of `N` elements.
    pub array_len: i32,
}

impl VarSlot {
    pub fn is_array(&self) -> bool {
        self.array_len > 0
    }
}

#[derive(Debug, Clone, Default)]
pub struct FunctionScope {
    vars: IndexMap<String, VarSlot>,
}

impl FunctionScope {
    pub fn get(&self, name: &str) -> Option<&VarSlot> {
        self.vars.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &VarSlot)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v))
    }
}

#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    scopes: IndexMap<String, FunctionScope>,
}

impl SymbolTable {
    pub fn globals(&self) -> &FunctionScope {
        self.scopes
            .get(GLOBAL_SCOPE)
            .expect("__GLOBAL__ scope is always created by build()")
    }

    pub fn function(&self, name: &str) -> Option<&FunctionScope> {
        self.scopes.get(name)
    }

    /// Look up `name` in `func`'s own scope first, falling back to the
    /// global scope — a local shadows a global of the same name.
    pub fn resolve(&self, func: &str, name: &str) -> Option<(&VarSlot, bool)> {
        if let Some(scope) = self.scopes.get(func) {
            if let Some(slot) = scope.get(name) {
                return Some((slot, false));
            }
        }
        self.globals().get(name).map(|slot| (slot, true))
    }

    /// Debug rendering of every scope's variable layout; wired to a
    /// verbose-logging affordance in `main.rs`, never to stdout directly —
    /// the VM's stdout must stay exactly the program's own output.
    pub fn fmt_table(&self) -> String {
        let mut out = String::new();
        for (func, scope) in &self.scopes {
            out.push_str(func);
            out.push('\n');
            for (name, slot) in scope.iter() {
                out.push_str(&format!(
                    "    {name}: slot={} array_len={}\n",
                    slot.slot, slot.array_len
                ));
            }
        }
        out
    }
}

pub fn build(program: &Program) -> SymbolTable {
    let mut table = SymbolTable::default();
    let mut globals = FunctionScope::default();
    let mut global_idx = 0i32;

    for decl in &program.decls {
        if let Decl::Var(var) = decl {
            insert_var(&mut globals, var, &mut global_idx, GLOBAL_SCOPE);
        }
    }
    table.scopes.insert(GLOBAL_SCOPE.to_string(), globals);

    for decl in &program.decls {
        if let Decl::Func(func) = decl {
            let scope = build_function_scope(func);
            if table.scopes.contains_key(&func.name) {
                log::warn!("function '{}' redeclared (line {})", func.name, func.line);
            }
            table.scopes.insert(func.name.clone(), scope);
        }
    }

    table
}

fn build_function_scope(func: &FuncDecl) -> FunctionScope {
    let mut scope = FunctionScope::default();
    let mut var_idx = 0i32;

    for param in &func.params {
        insert_slot(&mut scope, &param.name, var_idx, 0, &func.name);
        var_idx += 1;
    }

    for local in &func.locals {
        insert_var(&mut scope, local, &mut var_idx, &func.name);
    }

    scope
}

fn insert_var(scope: &mut FunctionScope, var: &VarDecl, idx: &mut i32, owner: &str) {
    let array_len = var.array_len.unwrap_or(0);
    insert_slot(scope, &var.name, *idx, array_len, owner);
    *idx += array_len + 1;
}

fn insert_slot(scope: &mut FunctionScope, name: &str, slot: i32, array_len: i32, owner: &str) {
    if scope.vars.contains_key(name) {
        log::warn!("'{name}' redeclared in '{owner}'");
    }
    scope.vars.insert(name.to_string(), VarSlot { slot, array_len });
}
