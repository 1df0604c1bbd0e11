//! A Tiny Machine: a small register machine that runs textual assembly.
//!
//! Programs are lines of `MNEMONIC r,s,t` or `MNEMONIC r,s(t)`, with `*`
//! starting a whole-line comment:
//!
//! ```
//! use tiny::console::Script;
//! use tiny::vm::{CpuState, Vm};
//!
//! let mut vm = Vm::new();
//! vm.load_program("* add two numbers\nIN 1,0,0\nIN 2,0,0\nADD 3,1,2\nOUT 3,0,0\n")
//!   .unwrap();
//! let mut console = Script::new([2, 40]);
//! assert_eq!(vm.run(&mut console), CpuState::Halted);
//! assert_eq!(console.lines(), ["42", "Program halted."]);
//! ```

pub mod config;
pub mod console;
pub mod instruction;
pub mod opcode;
pub mod program;
pub mod vm;
