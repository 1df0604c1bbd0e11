use std::collections::VecDeque;
use std::io::{self, BufRead, Write};

/// The machine's line-oriented view of the outside world.
///
/// Every user-visible message the machine produces (trace lines, `OUT`
/// values, halt and fault notices) goes through [`Console::report_line`], and
/// `IN` reads through [`Console::read_integer`]. Both block the caller until
/// they are done.
pub trait Console {
  fn report_line(&mut self, line: &str);

  /// Prompts for a number, falling back to `default` when nothing usable can
  /// be read.
  fn read_integer(&mut self, prompt: &str, default: i32) -> i32;
}

/// A [`Console`] over a reader and a writer, usually stdin and stdout.
pub struct Stdio<R, W> {
  input: R,
  output: W,
}

impl<R, W> Stdio<R, W>
where
  R: BufRead,
  W: Write,
{
  pub fn new(input: R, output: W) -> Self {
    Self { input, output }
  }

  pub fn into_inner(self) -> (R, W) {
    (self.input, self.output)
  }

  fn read_line(&mut self, prompt: &str) -> io::Result<Option<String>> {
    write!(self.output, "{prompt}: ")?;
    self.output.flush()?;
    let mut line = String::new();
    if self.input.read_line(&mut line)? == 0 {
      return Ok(None);
    }
    Ok(Some(line))
  }
}

impl Stdio<io::StdinLock<'static>, io::Stdout> {
  /// A console attached to the process's standard streams.
  pub fn terminal() -> Self {
    Self::new(io::stdin().lock(), io::stdout())
  }
}

impl<R, W> Console for Stdio<R, W>
where
  R: BufRead,
  W: Write,
{
  fn report_line(&mut self, line: &str) {
    if let Err(err) = writeln!(self.output, "{line}") {
      tracing::warn!(%err, "failed to write console output");
    }
  }

  fn read_integer(&mut self, prompt: &str, default: i32) -> i32 {
    match self.read_line(prompt) {
      Ok(Some(line)) => match line.trim_end_matches(&['\r', '\n'][..]).parse() {
        Ok(value) => value,
        Err(_) => {
          self.report_line(&format!("Error converting input. Returning default {default}"));
          default
        }
      },
      Ok(None) => {
        self.report_line(&format!("Error reading input. Returning default {default}"));
        default
      }
      Err(err) => {
        tracing::warn!(%err, "failed to read console input");
        self.report_line(&format!("Error reading input. Returning default {default}"));
        default
      }
    }
  }
}

/// An in-memory [`Console`] that answers prompts from a fixed script and
/// records everything reported to it.
#[derive(Debug, Default)]
pub struct Script {
  inputs: VecDeque<i32>,
  prompts: Vec<String>,
  lines: Vec<String>,
}

impl Script {
  pub fn new(inputs: impl IntoIterator<Item = i32>) -> Self {
    Self {
      inputs: inputs.into_iter().collect(),
      ..Self::default()
    }
  }

  /// Lines reported so far, oldest first.
  pub fn lines(&self) -> &[String] {
    &self.lines
  }

  /// Prompts shown so far, oldest first.
  pub fn prompts(&self) -> &[String] {
    &self.prompts
  }

  pub fn take_lines(&mut self) -> Vec<String> {
    std::mem::take(&mut self.lines)
  }
}

impl Console for Script {
  fn report_line(&mut self, line: &str) {
    self.lines.push(line.to_string());
  }

  // An exhausted script behaves like end of input.
  fn read_integer(&mut self, prompt: &str, default: i32) -> i32 {
    self.prompts.push(prompt.to_string());
    self.inputs.pop_front().unwrap_or(default)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn stdio(input: &str) -> Stdio<&[u8], Vec<u8>> {
    Stdio::new(input.as_bytes(), Vec::new())
  }

  fn output(console: Stdio<&[u8], Vec<u8>>) -> String {
    String::from_utf8(console.into_inner().1).unwrap()
  }

  #[test]
  fn stdio_reads_integers() {
    let mut console = stdio("42\n-7\r\n");
    assert_eq!(console.read_integer("first", 0), 42);
    assert_eq!(console.read_integer("second", 0), -7);
    assert_eq!(output(console), "first: second: ");
  }

  #[test]
  fn stdio_falls_back_to_default() {
    let mut console = stdio("forty two\n");
    assert_eq!(console.read_integer("n", 5), 5);
    assert_eq!(console.read_integer("n", 9), 9);
    assert_eq!(
      output(console),
      "n: Error converting input. Returning default 5\n\
       n: Error reading input. Returning default 9\n"
    );
  }

  #[test]
  fn stdio_reports_lines() {
    let mut console = stdio("");
    console.report_line("Program halted.");
    console.report_line("12");
    assert_eq!(output(console), "Program halted.\n12\n");
  }

  #[test]
  fn script_answers_then_defaults() {
    let mut script = Script::new([3]);
    assert_eq!(script.read_integer("a", 0), 3);
    assert_eq!(script.read_integer("b", -1), -1);
    assert_eq!(script.prompts(), ["a", "b"]);
    script.report_line("x");
    assert_eq!(script.take_lines(), ["x"]);
    assert!(script.lines().is_empty());
  }
}
