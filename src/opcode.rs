use strum_macros::{Display, EnumIter, EnumString, IntoStaticStr};

/// How the three operands of an instruction are written and interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
  /// `r,s,t`, all three operands are register indices.
  RegisterOnly,
  /// `r,s(t)`, `r` and `t` are register indices and `s` is a signed offset
  /// into data memory.
  RegisterMemory,
  /// `r,s(t)`, same shape as [`Format::RegisterMemory`] but `s(t)` names an
  /// address or constant rather than a memory cell.
  RegisterAddress,
}

/// The closed set of Tiny Machine operations.
///
/// In the tables below `a` is the effective address `s + r[t]`.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, IntoStaticStr,
)]
#[strum(serialize_all = "UPPERCASE")]
pub enum Opcode {
  /// | Operation | Semantics/RTL      | Assembly     |
  /// |-----------|--------------------|--------------|
  /// | Halt      | `(stop execution)` | `HALT r,s,t` |
  Halt,

  /// Reads an integer from the console.
  ///
  /// | Operation | Semantics/RTL | Assembly   |
  /// |-----------|---------------|------------|
  /// | Input     | `r[r] ← in`   | `IN r,s,t` |
  In,

  /// Writes a register to the console.
  ///
  /// | Operation | Semantics/RTL | Assembly    |
  /// |-----------|---------------|-------------|
  /// | Output    | `out ← r[r]`  | `OUT r,s,t` |
  Out,

  /// | Operation | Semantics/RTL         | Assembly    |
  /// |-----------|-----------------------|-------------|
  /// | Add       | `r[r] ← r[s] + r[t]`  | `ADD r,s,t` |
  Add,

  /// | Operation | Semantics/RTL         | Assembly    |
  /// |-----------|-----------------------|-------------|
  /// | Subtract  | `r[r] ← r[s] - r[t]`  | `SUB r,s,t` |
  Sub,

  /// | Operation | Semantics/RTL         | Assembly    |
  /// |-----------|-----------------------|-------------|
  /// | Multiply  | `r[r] ← r[s] × r[t]`  | `MUL r,s,t` |
  Mul,

  /// Truncating division, faults when `r[t]` is zero.
  ///
  /// | Operation | Semantics/RTL         | Assembly    |
  /// |-----------|-----------------------|-------------|
  /// | Divide    | `r[r] ← r[s] / r[t]`  | `DIV r,s,t` |
  Div,

  /// | Operation | Semantics/RTL | Assembly    |
  /// |-----------|---------------|-------------|
  /// | Load      | `r[r] ← m[a]` | `LD r,s(t)` |
  Ld,

  /// | Operation | Semantics/RTL | Assembly    |
  /// |-----------|---------------|-------------|
  /// | Store     | `m[a] ← r[r]` | `ST r,s(t)` |
  St,

  /// | Operation    | Semantics/RTL | Assembly     |
  /// |--------------|---------------|--------------|
  /// | Load Address | `r[r] ← a`    | `LDA r,s(t)` |
  Lda,

  /// `t` is accepted but ignored.
  ///
  /// | Operation     | Semantics/RTL | Assembly     |
  /// |---------------|---------------|--------------|
  /// | Load Constant | `r[r] ← s`    | `LDC r,s(t)` |
  Ldc,

  /// | Operation          | Semantics/RTL           | Assembly     |
  /// |--------------------|-------------------------|--------------|
  /// | Jump If Less       | `if r[r] < 0 : pc ← a`  | `JLT r,s(t)` |
  Jlt,

  /// | Operation          | Semantics/RTL           | Assembly     |
  /// |--------------------|-------------------------|--------------|
  /// | Jump If Less/Equal | `if r[r] ≤ 0 : pc ← a`  | `JLE r,s(t)` |
  Jle,

  /// | Operation          | Semantics/RTL           | Assembly     |
  /// |--------------------|-------------------------|--------------|
  /// | Jump If Greater    | `if r[r] > 0 : pc ← a`  | `JGT r,s(t)` |
  Jgt,

  /// | Operation             | Semantics/RTL          | Assembly     |
  /// |-----------------------|------------------------|--------------|
  /// | Jump If Greater/Equal | `if r[r] ≥ 0 : pc ← a` | `JGE r,s(t)` |
  Jge,

  /// | Operation     | Semantics/RTL           | Assembly     |
  /// |---------------|-------------------------|--------------|
  /// | Jump If Equal | `if r[r] = 0 : pc ← a`  | `JEQ r,s(t)` |
  Jeq,

  /// | Operation         | Semantics/RTL           | Assembly     |
  /// |-------------------|-------------------------|--------------|
  /// | Jump If Not Equal | `if r[r] ≠ 0 : pc ← a`  | `JNE r,s(t)` |
  Jne,
}

impl Opcode {
  /// The operand format this opcode is written in.
  pub fn format(self) -> Format {
    match self {
      Self::Halt | Self::In | Self::Out | Self::Add | Self::Sub | Self::Mul | Self::Div => {
        Format::RegisterOnly
      }
      Self::Ld | Self::St => Format::RegisterMemory,
      Self::Lda
      | Self::Ldc
      | Self::Jlt
      | Self::Jle
      | Self::Jgt
      | Self::Jge
      | Self::Jeq
      | Self::Jne => Format::RegisterAddress,
    }
  }

  /// The assembly mnemonic, e.g. `"LDA"`.
  pub fn mnemonic(self) -> &'static str {
    self.into()
  }
}
