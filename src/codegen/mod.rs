//! Code generator: syntax tree + symbol table → linear stack-machine
//! instruction list.
//!
//! Each function (plus a synthetic `__GLOBAL__` prologue) is generated as
//! an independent block; `CALL` targets are left as placeholders (`operand
//! = 0`, tracked alongside the callee's name) until every block's start
//! offset in the final concatenated list is known, exactly per the ordering
//! contract in `SPEC_FULL.md` §5: no `CALL` is resolved until all blocks
//! are laid out.

#[cfg(test)]
mod tests;

use std::collections::HashMap;

use crate::isa::{Instruction, Opcode};
use crate::parser::ast::*;
use crate::symtab::{FunctionScope, SymbolTable, GLOBAL_SCOPE};

/// One function's generated code, plus the `CALL` sites inside it still
/// waiting on their callee's final position (`local index`, `callee name`).
struct Block {
    code: Vec<Instruction>,
    calls: Vec<(usize, String)>,
}

impl Block {
    fn new() -> Self {
        Block { code: Vec::new(), calls: Vec::new() }
    }

    fn push(&mut self, instr: Instruction) {
        self.code.push(instr);
    }

    fn push_bare(&mut self, op: Opcode) {
        self.code.push(Instruction::bare(op));
    }

    fn push_call(&mut self, callee: &str) {
        self.calls.push((self.code.len(), callee.to_string()));
        self.code.push(Instruction::new(Opcode::Call, 0));
    }

    fn extend(&mut self, other: Block) {
        let base = self.code.len();
        self.code.extend(other.code);
        self.calls
            .extend(other.calls.into_iter().map(|(i, n)| (i + base, n)));
    }

    fn len(&self) -> usize {
        self.code.len()
    }
}

pub fn generate(program: &Program, symtab: &SymbolTable) -> Vec<Instruction> {
    let funcs: HashMap<&str, &FuncDecl> = program
        .decls
        .iter()
        .filter_map(|d| match d {
            Decl::Func(f) => Some((f.name.as_str(), f)),
            _ => None,
        })
        .collect();

    let gen = Codegen { symtab, funcs: &funcs };

    let global_block = gen.gen_global_prologue(program);
    let mut non_main_blocks: Vec<(&str, Block)> = Vec::new();
    let mut main_block: Option<Block> = None;

    for decl in &program.decls {
        let Decl::Func(f) = decl else { continue };
        let block = gen.gen_function_body(f);
        if f.name == "main" {
            main_block = Some(block);
        } else {
            non_main_blocks.push((f.name.as_str(), block));
        }
    }

    // Layout: __GLOBAL__ prologue, every non-main function (stable,
    // declaration order), then main last.
    let mut starts: HashMap<&str, usize> = HashMap::new();
    let mut offset = global_block.len();
    for (name, block) in &non_main_blocks {
        starts.insert(name, offset);
        offset += block.len();
    }
    starts.insert("main", offset);

    let mut whole = global_block;
    for (_, block) in non_main_blocks {
        whole.extend(block);
    }
    if let Some(block) = main_block {
        whole.extend(block);
    } else {
        log::warn!("program has no 'main' function; generated code has no entry point");
    }

    let mut code = whole.code;
    for (idx, callee) in whole.calls {
        let target = *starts.get(callee.as_str()).unwrap_or_else(|| {
            log::warn!("call to undeclared function '{callee}'; leaving CALL target unresolved");
            &0
        });
        let relative = target as i32 - idx as i32;
        code[idx] = Instruction::new(Opcode::Call, relative);
    }
    code
}

struct Codegen<'a> {
    symtab: &'a SymbolTable,
    funcs: &'a HashMap<&'a str, &'a FuncDecl>,
}

impl<'a> Codegen<'a> {
    fn gen_global_prologue(&self, program: &Program) -> Block {
        let mut block = Block::new();
        let globals = self.symtab.globals();

        for decl in &program.decls {
            let Decl::Var(var) = decl else { continue };
            let slot = globals.get(&var.name).expect("global was registered by build()");
            self.push_global_allocation(&mut block, *slot);
        }

        if let Some(main) = self.funcs.get("main") {
            self.push_callee_locals(&mut block, main);
            block.push_call("main");
        }

        block
    }

    /// Globals sit at a compile-time-known absolute position from program
    /// start, unlike a function's locals (whose stack depth depends on the
    /// caller). So the array pointer slot can be initialized with a literal
    /// constant instead of a runtime `ADDR` computation.
    fn push_global_allocation(&self, block: &mut Block, slot: crate::symtab::VarSlot) {
        if slot.is_array() {
            block.push(Instruction::new(Opcode::Ldc, slot.slot + 1));
            block.push_bare(Opcode::Push);
            for _ in 0..slot.array_len {
                block.push(Instruction::new(Opcode::Ldc, 0));
                block.push_bare(Opcode::Push);
            }
        } else {
            block.push(Instruction::new(Opcode::Ldc, 0));
            block.push_bare(Opcode::Push);
        }
    }

    fn gen_function_body(&self, func: &FuncDecl) -> Block {
        let mut block = self.gen_stmt_list(&func.name, &func.body);
        if func.name != "main" {
            block.push_bare(Opcode::Ret);
        }
        block
    }

    fn gen_stmt_list(&self, func_name: &str, stmts: &[Stmt]) -> Block {
        let mut block = Block::new();
        for stmt in stmts {
            block.extend(self.gen_stmt(func_name, stmt));
        }
        block
    }

    fn gen_stmt(&self, func_name: &str, stmt: &Stmt) -> Block {
        match stmt {
            Stmt::Expr(None) => Block::new(),
            Stmt::Expr(Some(expr)) => self.gen_expr(func_name, expr),
            Stmt::Return(None) => Block::new(),
            Stmt::Return(Some(expr)) => self.gen_expr(func_name, expr),
            Stmt::If { cond, then_branch, else_branch } => {
                self.gen_if(func_name, cond, then_branch, else_branch.as_deref())
            }
            Stmt::While { cond, body } => self.gen_while(func_name, cond, body),
        }
    }

    fn gen_if(
        &self,
        func_name: &str,
        cond: &Expr,
        then_branch: &[Stmt],
        else_branch: Option<&[Stmt]>,
    ) -> Block {
        let mut block = self.gen_expr(func_name, cond);
        let then_code = self.gen_stmt_list(func_name, then_branch);

        match else_branch {
            None => {
                block.push(Instruction::new(Opcode::Jz, then_code.len() as i32 + 1));
                block.extend(then_code);
            }
            Some(else_branch) => {
                let else_code = self.gen_stmt_list(func_name, else_branch);
                block.push(Instruction::new(Opcode::Jz, then_code.len() as i32 + 2));
                block.extend(then_code);
                block.push(Instruction::new(Opcode::Jmp, else_code.len() as i32 + 1));
                block.extend(else_code);
            }
        }
        block
    }

    fn gen_while(&self, func_name: &str, cond: &Expr, body: &[Stmt]) -> Block {
        let cond_code = self.gen_expr(func_name, cond);
        let body_code = self.gen_stmt_list(func_name, body);
        let cond_len = cond_code.len() as i32;
        let body_len = body_code.len() as i32;

        let mut block = cond_code;
        block.push(Instruction::new(Opcode::Jz, body_len + 2));
        block.extend(body_code);
        block.push(Instruction::new(Opcode::Jmp, -(cond_len + body_len + 1)));
        block
    }

    fn gen_expr(&self, func_name: &str, expr: &Expr) -> Block {
        match expr {
            Expr::Assign { target, value } => self.gen_assign(func_name, target, value),
            Expr::Simple(se) => self.gen_simple_expr(func_name, se),
        }
    }

    /// `Var = Expr`: evaluate the RHS, push it, compute the target address
    /// (which internally pushes/pops in a self-contained way and leaves the
    /// value untouched beneath it), store, then pop the saved value.
    fn gen_assign(&self, func_name: &str, target: &Var, value: &Expr) -> Block {
        let mut block = self.gen_expr(func_name, value);
        block.push_bare(Opcode::Push);
        block.extend(self.gen_store_address(func_name, target));
        block.push_bare(Opcode::Pop);
        block
    }

    fn gen_simple_expr(&self, func_name: &str, se: &SimpleExpr) -> Block {
        let mut block = self.gen_add_expr(func_name, &se.left);
        if let Some((op, right)) = &se.rel {
            block.push_bare(Opcode::Push);
            block.extend(self.gen_add_expr(func_name, right));
            block.push_bare(relop_opcode(*op));
            block.push_bare(Opcode::Pop);
        }
        block
    }

    fn gen_add_expr(&self, func_name: &str, add: &AddExpr) -> Block {
        let mut block = self.gen_term(func_name, &add.first);
        for (op, term) in &add.rest {
            block.push_bare(Opcode::Push);
            block.extend(self.gen_term(func_name, term));
            block.push_bare(match op {
                AddOp::Add => Opcode::Add,
                AddOp::Sub => Opcode::Sub,
            });
            block.push_bare(Opcode::Pop);
        }
        block
    }

    fn gen_term(&self, func_name: &str, term: &Term) -> Block {
        let mut block = self.gen_factor(func_name, &term.first);
        for (op, factor) in &term.rest {
            block.push_bare(Opcode::Push);
            block.extend(self.gen_factor(func_name, factor));
            block.push_bare(match op {
                MulOp::Mul => Opcode::Mul,
                MulOp::Div => Opcode::Div,
            });
            block.push_bare(Opcode::Pop);
        }
        block
    }

    fn gen_factor(&self, func_name: &str, factor: &Factor) -> Block {
        match factor {
            Factor::Paren(expr) => self.gen_expr(func_name, expr),
            Factor::Number(n) => {
                let mut block = Block::new();
                block.push(Instruction::new(Opcode::Ldc, *n));
                block
            }
            Factor::Call(call) => self.gen_call(func_name, call),
            Factor::Var(var) => self.gen_load_var(func_name, var),
        }
    }

    /// Load context: leaves the variable's value in `AX`.
    fn gen_load_var(&self, func_name: &str, var: &Var) -> Block {
        let (slot, is_global) = self.resolve(func_name, &var.name);
        let mut block = Block::new();

        match &var.index {
            None => {
                block.push(Instruction::new(Opcode::Ldc, slot.slot));
                block.push_bare(if is_global { Opcode::Ald } else { Opcode::Ld });
            }
            Some(index) => {
                block.extend(self.gen_expr(func_name, index));
                block.push_bare(Opcode::Push);
                block.push(Instruction::new(Opcode::Ldc, slot.slot));
                block.push_bare(if is_global { Opcode::Ald } else { Opcode::Ld });
                block.push_bare(Opcode::Add);
                block.push_bare(Opcode::Pop);
                block.push_bare(Opcode::Ald);
            }
        }
        block
    }

    /// Store context: leaves the target absolute address/slot in `AX` and
    /// emits the final `ST`/`AST`. Internal pushes are always matched by a
    /// pop before this returns, so it can be inserted between a caller's
    /// `PUSH` (of the value to store) and the matching final `POP` without
    /// disturbing what's underneath.
    fn gen_store_address(&self, func_name: &str, var: &Var) -> Block {
        let (slot, is_global) = self.resolve(func_name, &var.name);
        let mut block = Block::new();

        match &var.index {
            None => {
                block.push(Instruction::new(Opcode::Ldc, slot.slot));
                block.push_bare(if is_global { Opcode::Ast } else { Opcode::St });
            }
            Some(index) => {
                block.extend(self.gen_expr(func_name, index));
                block.push_bare(Opcode::Push);
                block.push(Instruction::new(Opcode::Ldc, slot.slot));
                block.push_bare(if is_global { Opcode::Ald } else { Opcode::Ld });
                block.push_bare(Opcode::Add);
                block.push_bare(Opcode::Pop);
                block.push_bare(Opcode::Ast);
            }
        }
        block
    }

    fn resolve(&self, func_name: &str, name: &str) -> (crate::symtab::VarSlot, bool) {
        let (slot, is_global) = self
            .symtab
            .resolve(func_name, name)
            .unwrap_or_else(|| panic!("'{name}' referenced in '{func_name}' has no symbol table entry"));
        (*slot, is_global)
    }

    fn gen_call(&self, func_name: &str, call: &Call) -> Block {
        match call.name.as_str() {
            "input" => {
                let mut block = Block::new();
                block.push_bare(Opcode::In);
                block
            }
            "output" => {
                let mut block = match call.args.first() {
                    Some(arg) => self.gen_expr(func_name, arg),
                    None => {
                        log::warn!("output() called with no argument (line {})", call.line);
                        let mut b = Block::new();
                        b.push(Instruction::new(Opcode::Ldc, 0));
                        b
                    }
                };
                block.push_bare(Opcode::Out);
                block
            }
            _ => self.gen_user_call(func_name, call),
        }
    }

    fn gen_user_call(&self, func_name: &str, call: &Call) -> Block {
        let mut block = Block::new();
        let Some(callee) = self.funcs.get(call.name.as_str()) else {
            log::warn!("call to undeclared function '{}' (line {})", call.name, call.line);
            // Arity is not checked (§4.3); just run each argument for effect.
            // `gen_expr` never leaves anything on `SS`, so no cleanup is needed.
            for arg in &call.args {
                block.extend(self.gen_expr(func_name, arg));
            }
            return block;
        };

        self.push_callee_locals(&mut block, callee);

        let param_count = callee.params.len();
        if call.args.len() != param_count {
            log::warn!(
                "call to '{}' supplies {} argument(s) but it takes {} (line {})",
                call.name,
                call.args.len(),
                param_count,
                call.line
            );
        }

        // Arguments beyond the callee's arity are still evaluated for their
        // side effects, then discarded, so the frame below stays aligned
        // with the callee's compiled parameter count.
        for arg in call.args.iter().skip(param_count) {
            block.extend(self.gen_expr(func_name, arg));
        }

        // Push exactly `param_count` slots, most-recently-declared param
        // first; a call short on arguments pads the missing trailing ones
        // with zero instead of leaving the frame one slot short.
        for i in (0..param_count).rev() {
            match call.args.get(i) {
                Some(arg) => block.extend(self.gen_expr(func_name, arg)),
                None => block.push(Instruction::new(Opcode::Ldc, 0)),
            }
            block.push_bare(Opcode::Push);
        }

        block.push_call(&callee.name);

        let slot_count: i32 = callee
            .locals
            .iter()
            .map(|l| 1 + l.array_len.unwrap_or(0))
            .sum::<i32>()
            + param_count as i32;
        for _ in 0..slot_count {
            block.push_bare(Opcode::Pop);
        }

        block
    }

    /// Push placeholder slots for every local the callee will address via
    /// `BP`, in reverse declaration order so the last-declared local ends
    /// up deepest (highest slot number ⇒ lowest `SS` index). Array locals
    /// get their element payload pushed first, then their pointer slot via
    /// a runtime `ADDR` (the callee's frame depth isn't known until now).
    fn push_callee_locals(&self, block: &mut Block, callee: &FuncDecl) {
        for local in callee.locals.iter().rev() {
            let len = local.array_len.unwrap_or(0);
            if len > 0 {
                for _ in 0..len {
                    block.push(Instruction::new(Opcode::Ldc, 0));
                    block.push_bare(Opcode::Push);
                }
                block.push(Instruction::new(Opcode::Addr, len));
                block.push_bare(Opcode::Push);
            } else {
                block.push(Instruction::new(Opcode::Ldc, 0));
                block.push_bare(Opcode::Push);
            }
        }
    }
}

fn relop_opcode(op: RelOp) -> Opcode {
    match op {
        RelOp::Lt => Opcode::Lt,
        RelOp::Le => Opcode::Le,
        RelOp::Gt => Opcode::Gt,
        RelOp::Ge => Opcode::Ge,
        RelOp::Eq => Opcode::Eq,
        RelOp::Ne => Opcode::Ne,
    }
}
