//! # cmmc
//!
//! A toolchain for CMM, a small C-like teaching language: lexer, recursive-
//! descent parser, symbol-table builder, stack-machine code generator, a
//! textual instruction serializer, and the virtual machine that executes
//! the result.
//!
//! ## Pipeline
//!
//! 1. **Lexer** ([`lexer`]) — source text → tokens
//! 2. **Parser** ([`parser`]) — tokens → a typed syntax tree
//! 3. **Symbol table builder** ([`symtab`]) — tree → per-function variable layout
//! 4. **Code generator** ([`codegen`]) — tree + layout → an instruction list
//! 5. **Instruction serializer** ([`isa`]) — instruction list ↔ text
//! 6. **Virtual machine** ([`vm`]) — instruction list → stdout, exit
//!
//! ## Example
//!
//! ```rust,no_run
//! use cmmc::{lexer, parser, symtab, codegen, isa, vm::Vm};
//!
//! let source = std::fs::read_to_string("program.cmm").unwrap();
//! let tokens = lexer::tokenize(&source).unwrap();
//! let program = parser::parse(&tokens).unwrap();
//! let table = symtab::build(&program);
//! let code = codegen::generate(&program, &table);
//!
//! let mut stdin = std::io::stdin().lock();
//! let mut stdout = std::io::stdout().lock();
//! Vm::new().run(&code, &mut stdin, &mut stdout);
//! ```

pub mod codegen;
pub mod error;
pub mod isa;
pub mod lexer;
pub mod parser;
pub mod symtab;
pub mod vm;
