//! Standalone executor for a serialized CMM instruction file.
//!
//! A thin wrapper around [`cmmc::vm::Vm`] for callers who only want to run
//! an already-compiled instruction stream without linking the rest of the
//! toolchain's CLI surface.

use std::env;
use std::fs;
use std::io;

use cmmc::{isa, vm::Vm};

fn main() {
    env_logger::init();

    let path = match env::args().nth(1) {
        Some(path) => path,
        None => {
            eprintln!("usage: cmm-vm <instructions-file>");
            std::process::exit(1);
        }
    };

    let text = fs::read_to_string(&path).unwrap_or_else(|err| {
        eprintln!("failed to read {path}: {err}");
        std::process::exit(1);
    });

    let code = isa::deserialize(&text).unwrap_or_else(|err| {
        eprintln!("malformed instruction file: {err}");
        std::process::exit(1);
    });
    log::debug!("loaded {} instructions from {path}", code.len());

    let stdin = io::stdin();
    let mut stdin = stdin.lock();
    let mut stdout = io::stdout().lock();
    Vm::new().run(&code, &mut stdin, &mut stdout);
}
