//! Program text to instruction sequence.

use std::str::FromStr;

use crate::instruction::{DecodeError, Instruction};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LoadError {
  /// `line_number` is 1-based and counts every source line, including
  /// comments and blanks.
  #[error("error parsing program at line {line_number}: {line}")]
  Decode {
    line_number: usize,
    line: String,
    #[source]
    source: DecodeError,
  },

  #[error("program has {length} instructions but instruction memory holds {capacity}")]
  TooLarge { length: usize, capacity: usize },
}

/// An ordered sequence of decoded instructions, destined for instruction
/// memory starting at slot 0.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Program {
  instructions: Vec<Instruction>,
}

impl Program {
  /// Decodes program text line by line.
  ///
  /// Blank lines, lines without any alphanumeric character and lines whose
  /// first non-whitespace character is `*` are skipped. The first line that
  /// fails to decode rejects the whole program.
  pub fn parse(source: &str) -> Result<Self, LoadError> {
    let mut instructions = Vec::new();
    for (index, line) in source.lines().enumerate() {
      if is_ignored(line) {
        continue;
      }
      let instruction = Instruction::decode(line).map_err(|source| LoadError::Decode {
        line_number: index + 1,
        line: line.to_string(),
        source,
      })?;
      instructions.push(instruction);
    }
    Ok(Self { instructions })
  }

  pub fn instructions(&self) -> &[Instruction] {
    &self.instructions
  }

  pub fn len(&self) -> usize {
    self.instructions.len()
  }

  pub fn is_empty(&self) -> bool {
    self.instructions.is_empty()
  }
}

impl From<Vec<Instruction>> for Program {
  fn from(instructions: Vec<Instruction>) -> Self {
    Self { instructions }
  }
}

impl FromStr for Program {
  type Err = LoadError;

  fn from_str(source: &str) -> Result<Self, Self::Err> {
    Self::parse(source)
  }
}

// whole-line comments and lines with nothing to decode
fn is_ignored(line: &str) -> bool {
  line.trim_start().starts_with('*') || !line.chars().any(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::instruction::OperandError;
  use crate::opcode::Opcode;

  fn instruction(opcode: Opcode, operands: [i32; 3]) -> Instruction {
    Instruction::new(opcode, operands).unwrap()
  }

  #[test]
  fn skips_comments() {
    let program = Program::parse("LDC 1,1(0)\n* This is a comment\nADD 1,1,1\n").unwrap();
    assert_eq!(
      program.instructions(),
      [
        instruction(Opcode::Ldc, [1, 1, 0]),
        instruction(Opcode::Add, [1, 1, 1]),
      ]
    );
  }

  #[test]
  fn skips_blank_and_indented_comment_lines() {
    let source = "\n   \nST 1,1(0)\n\t* indented comment\n ,,, \nSUB 1,1,1";
    let program = Program::parse(source).unwrap();
    assert_eq!(
      program.instructions(),
      [
        instruction(Opcode::St, [1, 1, 0]),
        instruction(Opcode::Sub, [1, 1, 1]),
      ]
    );
  }

  #[test]
  fn empty_source() {
    assert!(Program::parse("").unwrap().is_empty());
    assert!(Program::parse("* only a comment\n\n").unwrap().is_empty());
  }

  #[test]
  fn reports_failing_line() {
    let err = Program::parse("LDC 1,1(0)\n* comment\nSTORE 1,1(0)\nSUB 1,1,1\n").unwrap_err();
    assert_eq!(
      err,
      LoadError::Decode {
        line_number: 3,
        line: "STORE 1,1(0)".into(),
        source: DecodeError::InvalidOpcode("STORE".into()),
      }
    );
    assert_eq!(err.to_string(), "error parsing program at line 3: STORE 1,1(0)");
  }

  #[test]
  fn reports_argument_errors() {
    let err = "ADD 1,1,1\nLD 9,0(0)".parse::<Program>().unwrap_err();
    let LoadError::Decode {
      line_number,
      source,
      ..
    } = err
    else {
      panic!("expected a decode error");
    };
    assert_eq!(line_number, 2);
    assert_eq!(
      source,
      DecodeError::InvalidArguments {
        opcode: Opcode::Ld,
        operands: "9,0(0)".into(),
        reason: OperandError::BadRegister(9),
      }
    );
  }

  #[test]
  fn comment_marker_must_lead() {
    let err = Program::parse("ADD 1,1,1 * trailing").unwrap_err();
    assert!(matches!(
      err,
      LoadError::Decode {
        line_number: 1,
        source: DecodeError::InvalidInstruction(_),
        ..
      }
    ));
  }
}
