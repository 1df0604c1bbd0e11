//! Decoding of single assembly lines into [`Instruction`]s.
//!
//! A line is a mnemonic followed by one operand string, separated by
//! whitespace:
//!
//! ```text
//! ADD  1,2,3      register-only:      r,s,t
//! LD   1,-4(6)    register-memory:    r,s(t)
//! JEQ  0,2(7)     register-address:   r,s(t)
//! ```

use std::fmt;
use std::str::FromStr;

use crate::config::REGISTER_COUNT;
use crate::opcode::{Format, Opcode};

/// Why an operand string was rejected.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OperandError {
  #[error("expected `{expected}`")]
  Malformed { expected: &'static str },

  #[error("`{0}` is not an integer")]
  NotAnInteger(String),

  #[error("bad register: {0}")]
  BadRegister(i32),
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
  #[error("invalid instruction: '{0}'")]
  InvalidInstruction(String),

  #[error("invalid opcode: '{0}'")]
  InvalidOpcode(String),

  #[error("invalid arguments for opcode {opcode}: '{operands}'")]
  InvalidArguments {
    opcode: Opcode,
    operands: String,
    #[source]
    reason: OperandError,
  },
}

/// A decoded instruction: an opcode and its three positional operands.
///
/// Instructions are immutable once decoded; the register operands have been
/// range checked against [`REGISTER_COUNT`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
  opcode: Opcode,
  operands: [i32; 3],
}

impl Instruction {
  /// The instruction every empty instruction slot holds.
  pub const HALT: Self = Self {
    opcode: Opcode::Halt,
    operands: [0, 0, 0],
  };

  /// Builds an instruction, checking its register operands.
  pub fn new(opcode: Opcode, operands: [i32; 3]) -> Result<Self, DecodeError> {
    let register_slots: &[usize] = match opcode.format() {
      Format::RegisterOnly => &[0, 1, 2],
      Format::RegisterMemory | Format::RegisterAddress => &[0, 2],
    };
    for &slot in register_slots {
      check_register(operands[slot]).map_err(|reason| DecodeError::InvalidArguments {
        opcode,
        operands: format_operands(opcode.format(), operands),
        reason,
      })?;
    }
    Ok(Self { opcode, operands })
  }

  /// Decodes one line of program text.
  ///
  /// The line must be a mnemonic and an operand string separated by
  /// whitespace; surrounding and repeated whitespace is ignored.
  pub fn decode(line: &str) -> Result<Self, DecodeError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    let [mnemonic, operands] = tokens[..] else {
      return Err(DecodeError::InvalidInstruction(tokens.join(" ")));
    };

    let opcode = Opcode::from_str(mnemonic)
      .map_err(|_| DecodeError::InvalidOpcode(mnemonic.to_string()))?;

    let parsed = match opcode.format() {
      Format::RegisterOnly => parse_register_only(operands),
      Format::RegisterMemory | Format::RegisterAddress => parse_register_offset(operands),
    };

    let operands = parsed.map_err(|reason| DecodeError::InvalidArguments {
      opcode,
      operands: operands.to_string(),
      reason,
    })?;

    Ok(Self { opcode, operands })
  }

  pub fn opcode(&self) -> Opcode {
    self.opcode
  }

  pub fn format(&self) -> Format {
    self.opcode.format()
  }

  pub fn operands(&self) -> [i32; 3] {
    self.operands
  }
}

impl Default for Instruction {
  fn default() -> Self {
    Self::HALT
  }
}

impl FromStr for Instruction {
  type Err = DecodeError;

  fn from_str(line: &str) -> Result<Self, Self::Err> {
    Self::decode(line)
  }
}

/// Renders the instruction back into assembly, e.g. `LDA  1,-2(7)`.
impl fmt::Display for Instruction {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{:<4} {}",
      self.opcode.mnemonic(),
      format_operands(self.format(), self.operands)
    )
  }
}

fn format_operands(format: Format, [r, s, t]: [i32; 3]) -> String {
  match format {
    Format::RegisterOnly => format!("{r},{s},{t}"),
    Format::RegisterMemory | Format::RegisterAddress => format!("{r},{s}({t})"),
  }
}

fn check_register(value: i32) -> Result<i32, OperandError> {
  match usize::try_from(value) {
    Ok(index) if index < REGISTER_COUNT => Ok(value),
    _ => Err(OperandError::BadRegister(value)),
  }
}

fn parse_integer(text: &str) -> Result<i32, OperandError> {
  text
    .parse()
    .map_err(|_| OperandError::NotAnInteger(text.to_string()))
}

fn parse_register(text: &str) -> Result<i32, OperandError> {
  check_register(parse_integer(text)?)
}

// r,s,t
fn parse_register_only(operands: &str) -> Result<[i32; 3], OperandError> {
  let fields: Vec<&str> = operands.split(',').collect();
  let [r, s, t] = fields[..] else {
    return Err(OperandError::Malformed { expected: "r,s,t" });
  };
  Ok([parse_register(r)?, parse_register(s)?, parse_register(t)?])
}

// r,s(t)
//
// Anything after the closing parenthesis is ignored.
fn parse_register_offset(operands: &str) -> Result<[i32; 3], OperandError> {
  let malformed = OperandError::Malformed { expected: "r,s(t)" };
  let comma = operands.find(',').ok_or(malformed.clone())?;
  let open = operands[comma..]
    .find('(')
    .map(|i| comma + i)
    .ok_or(malformed.clone())?;
  let close = operands[open..]
    .find(')')
    .map(|i| open + i)
    .ok_or(malformed)?;

  let r = parse_register(&operands[..comma])?;
  let s = parse_integer(&operands[comma + 1..open])?;
  let t = parse_register(&operands[open + 1..close])?;
  Ok([r, s, t])
}

#[cfg(test)]
mod tests {
  use proptest::prelude::*;
  use strum::IntoEnumIterator;

  use super::*;

  fn decoded(line: &str) -> (Opcode, [i32; 3]) {
    let instruction = Instruction::decode(line).unwrap();
    (instruction.opcode(), instruction.operands())
  }

  fn operand_error(line: &str) -> OperandError {
    match Instruction::decode(line) {
      Err(DecodeError::InvalidArguments { reason, .. }) => reason,
      other => panic!("expected an arguments error for {line:?}, got {other:?}"),
    }
  }

  #[test]
  fn register_only() {
    assert_eq!(decoded("HALT   0,0,1"), (Opcode::Halt, [0, 0, 1]));
    assert_eq!(decoded("IN     0,0,1"), (Opcode::In, [0, 0, 1]));
    assert_eq!(decoded("OUT    0,0,0"), (Opcode::Out, [0, 0, 0]));
    assert_eq!(decoded("ADD    2,2,2"), (Opcode::Add, [2, 2, 2]));
    assert_eq!(decoded("SUB    7,6,5"), (Opcode::Sub, [7, 6, 5]));
    assert_eq!(decoded("MUL    0,0,0"), (Opcode::Mul, [0, 0, 0]));
    assert_eq!(decoded("DIV    0,1,0"), (Opcode::Div, [0, 1, 0]));
  }

  #[test]
  fn register_memory_and_address() {
    assert_eq!(decoded("LD 0,0(1)"), (Opcode::Ld, [0, 0, 1]));
    assert_eq!(decoded("ST 2,12(2)"), (Opcode::St, [2, 12, 2]));
    assert_eq!(decoded("LDA 1,-3(7)"), (Opcode::Lda, [1, -3, 7]));
    assert_eq!(decoded("LDC 1,100000(0)"), (Opcode::Ldc, [1, 100000, 0]));
    assert_eq!(decoded("JNE 4,2147483647(7)"), (Opcode::Jne, [4, i32::MAX, 7]));
    assert_eq!(
      Instruction::decode("LD 0,0(0)").unwrap().format(),
      Format::RegisterMemory
    );
    assert_eq!(
      Instruction::decode("JGE 0,0(0)").unwrap().format(),
      Format::RegisterAddress
    );
  }

  #[test]
  fn surrounding_whitespace() {
    assert_eq!(decoded("   HALT  0,0,1   "), (Opcode::Halt, [0, 0, 1]));
    assert_eq!(decoded("\tLD \t 0,0(1)  "), (Opcode::Ld, [0, 0, 1]));
  }

  #[test]
  fn wrong_token_count() {
    assert_eq!(
      Instruction::decode("   0,0,1   "),
      Err(DecodeError::InvalidInstruction("0,0,1".into()))
    );
    assert_eq!(
      Instruction::decode("OPCODE   "),
      Err(DecodeError::InvalidInstruction("OPCODE".into()))
    );
    assert_eq!(
      Instruction::decode("ADD 1, 2, 3"),
      Err(DecodeError::InvalidInstruction("ADD 1, 2, 3".into()))
    );
  }

  #[test]
  fn unknown_opcode() {
    assert_eq!(
      Instruction::decode("OPCODE 0,0(1)  "),
      Err(DecodeError::InvalidOpcode("OPCODE".into()))
    );
    assert_eq!(
      Instruction::decode("add 0,0,0"),
      Err(DecodeError::InvalidOpcode("add".into()))
    );
  }

  #[test]
  fn format_mismatch_is_an_arguments_error() {
    let err = Instruction::decode("LD 0,0,0").unwrap_err();
    assert_eq!(err.to_string(), "invalid arguments for opcode LD: '0,0,0'");
    assert!(matches!(
      err,
      DecodeError::InvalidArguments {
        opcode: Opcode::Ld,
        ..
      }
    ));

    let err = Instruction::decode("IN 0,0(1)").unwrap_err();
    assert_eq!(err.to_string(), "invalid arguments for opcode IN: '0,0(1)'");
  }

  #[test]
  fn register_only_operands() {
    assert_eq!(operand_error("ADD 2,a,1"), OperandError::NotAnInteger("a".into()));
    assert_eq!(operand_error("ADD ,10,1"), OperandError::NotAnInteger("".into()));
    assert_eq!(operand_error("ADD 1,,1"), OperandError::NotAnInteger("".into()));
    assert_eq!(
      operand_error("ADD 1,"),
      OperandError::Malformed { expected: "r,s,t" }
    );
    assert_eq!(
      operand_error("ADD 1,2,3,4"),
      OperandError::Malformed { expected: "r,s,t" }
    );
    assert_eq!(operand_error("ADD 12,1,1"), OperandError::BadRegister(12));
    assert_eq!(operand_error("ADD 2,13,1"), OperandError::BadRegister(13));
    assert_eq!(operand_error("ADD 2,1,-1"), OperandError::BadRegister(-1));
    assert_eq!(
      operand_error("ADD 2,1,99999999999"),
      OperandError::NotAnInteger("99999999999".into())
    );
  }

  #[test]
  fn register_offset_operands() {
    assert_eq!(operand_error("ST 1,a(1)"), OperandError::NotAnInteger("a".into()));
    assert_eq!(operand_error("LD a,10(1)"), OperandError::NotAnInteger("a".into()));
    assert_eq!(operand_error("LD ,10(1)"), OperandError::NotAnInteger("".into()));
    assert_eq!(operand_error("LD 1,(1)"), OperandError::NotAnInteger("".into()));
    let malformed = OperandError::Malformed { expected: "r,s(t)" };
    assert_eq!(operand_error("LD 1,"), malformed);
    assert_eq!(operand_error("LD 1"), malformed);
    assert_eq!(operand_error("LD 1(2),3"), malformed);
    assert_eq!(operand_error("LD 1,2(3"), malformed);
    assert_eq!(operand_error("LD 10,1(1)"), OperandError::BadRegister(10));
    assert_eq!(operand_error("LDA 1,1(12)"), OperandError::BadRegister(12));
  }

  #[test]
  fn offset_is_unconstrained() {
    assert_eq!(decoded("LDA 0,-2147483648(0)"), (Opcode::Lda, [0, i32::MIN, 0]));
    assert_eq!(decoded("ST 3,1024(0)"), (Opcode::St, [3, 1024, 0]));
  }

  #[test]
  fn new_checks_registers() {
    assert!(Instruction::new(Opcode::Ldc, [1, -50, 0]).is_ok());
    assert!(Instruction::new(Opcode::Add, [1, 8, 0]).is_err());
    let err = Instruction::new(Opcode::Ld, [8, 0, 0]).unwrap_err();
    assert_eq!(
      err,
      DecodeError::InvalidArguments {
        opcode: Opcode::Ld,
        operands: "8,0(0)".into(),
        reason: OperandError::BadRegister(8),
      }
    );
  }

  #[test]
  fn display() {
    assert_eq!(Instruction::HALT.to_string(), "HALT 0,0,0");
    assert_eq!(decoded_instruction("LD 1,-4(6)").to_string(), "LD   1,-4(6)");
    assert_eq!(decoded_instruction("JEQ 0,2(7)").to_string(), "JEQ  0,2(7)");
    assert_eq!(decoded_instruction("OUT 3,0,0").to_string(), "OUT  3,0,0");
  }

  fn decoded_instruction(line: &str) -> Instruction {
    line.parse().unwrap()
  }

  fn register() -> impl Strategy<Value = i32> {
    0..REGISTER_COUNT as i32
  }

  proptest! {
    #[test]
    fn register_only_round_trip(
      index in 0usize..7,
      r in register(),
      s in register(),
      t in register()
    ) {
      let opcode = Opcode::iter()
        .filter(|op| op.format() == Format::RegisterOnly)
        .nth(index)
        .unwrap();
      let line = format!("{opcode} {r},{s},{t}");
      let first = Instruction::decode(&line).unwrap();
      let second = Instruction::decode(&first.to_string()).unwrap();
      prop_assert_eq!(first, second);
      prop_assert_eq!(first.operands(), [r, s, t]);
    }

    #[test]
    fn register_offset_round_trip(r in register(), s in any::<i32>(), t in register()) {
      let first = Instruction::new(Opcode::Lda, [r, s, t]).unwrap();
      prop_assert_eq!(Instruction::decode(&first.to_string()), Ok(first));
    }
  }
}
