use std::ops::RangeInclusive;

use crate::config::{Config, PC_REGISTER, REGISTER_COUNT};
use crate::console::Console;
use crate::instruction::Instruction;
use crate::opcode::Opcode;
use crate::program::{LoadError, Program};

/// The type of a single register, and of a data memory word
pub type Word = i32;

/// Whether the machine may keep executing, and if not, why.
///
/// Every state other than [`CpuState::Ok`] is sticky until the machine is
/// reset or reinitialized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CpuState {
  Ok,
  Halted,
  DivideByZero,
  /// The program counter left instruction memory.
  InstructionFault,
  /// A load or store addressed a word outside data memory.
  DataFault,
}

impl CpuState {
  pub fn is_ok(self) -> bool {
    self == Self::Ok
  }

  /// The notice shown to the user while the machine is in this state.
  pub fn message(self) -> Option<&'static str> {
    match self {
      Self::Ok => None,
      Self::Halted => Some("Program halted."),
      Self::DivideByZero => Some("Divide by zero error. Program halted."),
      Self::InstructionFault => Some("Instruction memory access violation. Program halted."),
      Self::DataFault => Some("Data memory access violation. Program halted."),
    }
  }
}

/// A Tiny Machine: eight registers, the last of which is the program counter,
/// and equally sized data and instruction memories.
///
/// Data slot 0 always starts out holding the highest data address, so a
/// program can find out how much memory it has.
#[derive(Debug, Clone)]
pub struct Vm {
  config: Config,
  registers: [Word; REGISTER_COUNT],
  memory: Vec<Word>,
  instructions: Vec<Instruction>,
  state: CpuState,
  trace: bool,
}

impl Vm {
  /// Create a machine with the default memory capacity and an all-`HALT`
  /// program
  pub fn new() -> Self {
    Self::with_config(Config::default())
  }

  pub fn with_config(config: Config) -> Self {
    let mut vm = Self {
      config,
      registers: [0; REGISTER_COUNT],
      memory: Vec::new(),
      instructions: Vec::new(),
      state: CpuState::Ok,
      trace: false,
    };
    vm.initialize(true);
    vm
  }

  /// Zero the registers and data memory and clear any fault. The program is
  /// replaced with `HALT`s only when `clear_program` is set.
  pub fn initialize(&mut self, clear_program: bool) {
    let capacity = self.config.memory_capacity();
    self.registers = [0; REGISTER_COUNT];
    self.memory.clear();
    self.memory.resize(capacity, 0);
    // capacity fits in a word, see `Config::new`
    self.memory[0] = (capacity - 1) as Word;
    if clear_program {
      self.instructions.clear();
      self.instructions.resize(capacity, Instruction::HALT);
    }
    self.state = CpuState::Ok;
    tracing::debug!(capacity, clear_program, "machine initialized");
  }

  /// Reinitialize everything except the loaded program
  pub fn reset(&mut self) {
    self.initialize(false);
  }

  /// Reinitialize the machine and load program text into instruction memory.
  ///
  /// On failure nothing of the new program is kept and instruction memory is
  /// left all `HALT`.
  pub fn load_program(&mut self, source: &str) -> Result<usize, LoadError> {
    self.initialize(true);
    let program = Program::parse(source)?;
    self.load(&program)
  }

  /// Reinitialize the machine and copy an already decoded program into
  /// instruction memory, returning the number of instructions loaded.
  pub fn load(&mut self, program: &Program) -> Result<usize, LoadError> {
    self.initialize(true);
    let capacity = self.capacity();
    if program.len() > capacity {
      return Err(LoadError::TooLarge {
        length: program.len(),
        capacity,
      });
    }
    self.instructions[..program.len()].copy_from_slice(program.instructions());
    tracing::info!(instructions = program.len(), "program loaded");
    Ok(program.len())
  }

  /// Execute a single instruction, returning the resulting state.
  ///
  /// A machine that is not [`CpuState::Ok`] does nothing but repeat its
  /// state's notice.
  pub fn step<C>(&mut self, console: &mut C) -> CpuState
  where
    C: Console,
  {
    if self.state.is_ok() {
      let mut task = Task::new(self, console);
      task.run();
    }
    if let Some(message) = self.state.message() {
      console.report_line(message);
    }
    self.state
  }

  /// Step until the machine halts or faults
  pub fn run<C>(&mut self, console: &mut C) -> CpuState
  where
    C: Console,
  {
    loop {
      let state = self.step(console);
      if !state.is_ok() {
        return state;
      }
    }
  }

  pub fn state(&self) -> CpuState {
    self.state
  }

  pub fn capacity(&self) -> usize {
    self.config.memory_capacity()
  }

  pub fn registers(&self) -> &[Word; REGISTER_COUNT] {
    &self.registers
  }

  pub fn register(&self, index: usize) -> Option<Word> {
    self.registers.get(index).copied()
  }

  pub fn pc(&self) -> Word {
    self.registers[PC_REGISTER]
  }

  /// Data memory words `start..=end`, or `None` unless
  /// `start <= end < capacity`.
  pub fn data_memory(&self, range: RangeInclusive<usize>) -> Option<&[Word]> {
    if range.start() > range.end() {
      return None;
    }
    self.memory.get(range)
  }

  /// Instruction memory slots `start..=end`, or `None` unless
  /// `start <= end < capacity`.
  pub fn instruction_memory(&self, range: RangeInclusive<usize>) -> Option<&[Instruction]> {
    if range.start() > range.end() {
      return None;
    }
    self.instructions.get(range)
  }

  pub fn trace(&self) -> bool {
    self.trace
  }

  /// When set, every executed instruction is reported to the console before
  /// it runs.
  pub fn set_trace(&mut self, trace: bool) {
    self.trace = trace;
  }

  pub fn toggle_trace(&mut self) -> bool {
    self.trace = !self.trace;
    self.trace
  }

  fn data_address(&self, address: Word) -> Option<usize> {
    usize::try_from(address)
      .ok()
      .filter(|&address| address < self.memory.len())
  }
}

impl Default for Vm {
  fn default() -> Self {
    Self::new()
  }
}

/// One fetch-decode-execute cycle
struct Task<'vm, 'console, C> {
  vm: &'vm mut Vm,
  console: &'console mut C,
}

impl<'vm, 'console, C> Task<'vm, 'console, C>
where
  C: Console,
{
  fn new(vm: &'vm mut Vm, console: &'console mut C) -> Self {
    Self { vm, console }
  }

  // register operands were range checked when the instruction was built
  #[inline]
  fn reg(&self, index: Word) -> Word {
    self.vm.registers[index as usize]
  }

  #[inline]
  fn set_reg(&mut self, index: Word, value: Word) {
    self.vm.registers[index as usize] = value;
  }

  fn fault(&mut self, state: CpuState) {
    tracing::warn!(?state, pc = self.vm.pc(), "machine faulted");
    self.vm.state = state;
  }

  fn run(&mut self) {
    let pc = self.vm.pc();
    let fetched = usize::try_from(pc)
      .ok()
      .and_then(|slot| self.vm.instructions.get(slot))
      .copied();
    let Some(instruction) = fetched else {
      self.fault(CpuState::InstructionFault);
      return;
    };

    // pc < capacity <= i32::MAX
    self.vm.registers[PC_REGISTER] = pc + 1;

    if self.vm.trace {
      self.console.report_line(&format!("Executing: {instruction}"));
    }
    tracing::debug!(pc, %instruction, "executing");

    let [r, s, t] = instruction.operands();
    let a = s.wrapping_add(self.reg(t));

    match instruction.opcode() {
      Opcode::Halt => halt(self),
      Opcode::In => input(self, r),
      Opcode::Out => output(self, r),
      Opcode::Add => self.set_reg(r, self.reg(s).wrapping_add(self.reg(t))),
      Opcode::Sub => self.set_reg(r, self.reg(s).wrapping_sub(self.reg(t))),
      Opcode::Mul => self.set_reg(r, self.reg(s).wrapping_mul(self.reg(t))),
      Opcode::Div => divide(self, r, s, t),
      Opcode::Lda => self.set_reg(r, a),
      Opcode::Ldc => self.set_reg(r, s),
      Opcode::Ld => load(self, r, a),
      Opcode::St => store(self, r, a),
      Opcode::Jlt => jump_if(self, r, a, |v| v < 0),
      Opcode::Jle => jump_if(self, r, a, |v| v <= 0),
      Opcode::Jgt => jump_if(self, r, a, |v| v > 0),
      Opcode::Jge => jump_if(self, r, a, |v| v >= 0),
      Opcode::Jeq => jump_if(self, r, a, |v| v == 0),
      Opcode::Jne => jump_if(self, r, a, |v| v != 0),
    }
  }
}

// (stop execution)
fn halt<C>(task: &mut Task<'_, '_, C>)
where
  C: Console,
{
  tracing::info!(pc = task.vm.pc(), "machine halted");
  task.vm.state = CpuState::Halted;
}

// r[r] ← in
fn input<C>(task: &mut Task<'_, '_, C>, r: Word)
where
  C: Console,
{
  let prompt = format!("Enter number to store in register {r}");
  let value = task.console.read_integer(&prompt, 0);
  task.set_reg(r, value);
}

// out ← r[r]
fn output<C>(task: &mut Task<'_, '_, C>, r: Word)
where
  C: Console,
{
  let value = task.reg(r);
  task.console.report_line(&value.to_string());
}

// r[r] ← r[s] / r[t]
fn divide<C>(task: &mut Task<'_, '_, C>, r: Word, s: Word, t: Word)
where
  C: Console,
{
  let divisor = task.reg(t);
  if divisor == 0 {
    task.fault(CpuState::DivideByZero);
    return;
  }
  // i32::MIN / -1 wraps like the other arithmetic
  task.set_reg(r, task.reg(s).wrapping_div(divisor));
}

// r[r] ← m[a]
fn load<C>(task: &mut Task<'_, '_, C>, r: Word, a: Word)
where
  C: Console,
{
  let Some(address) = task.vm.data_address(a) else {
    task.fault(CpuState::DataFault);
    return;
  };
  task.set_reg(r, task.vm.memory[address]);
}

// m[a] ← r[r]
fn store<C>(task: &mut Task<'_, '_, C>, r: Word, a: Word)
where
  C: Console,
{
  let Some(address) = task.vm.data_address(a) else {
    task.fault(CpuState::DataFault);
    return;
  };
  task.vm.memory[address] = task.reg(r);
}

// if cond(r[r]) : pc ← a
fn jump_if<C>(task: &mut Task<'_, '_, C>, r: Word, a: Word, condition: fn(Word) -> bool)
where
  C: Console,
{
  if condition(task.reg(r)) {
    task.vm.registers[PC_REGISTER] = a;
  }
}
