//! Construction-time machine configuration.

/// Number of registers in the register file.
pub const REGISTER_COUNT: usize = 8;

/// Index of the register used as the program counter.
pub const PC_REGISTER: usize = REGISTER_COUNT - 1;

/// Data and instruction memory size used when none is given.
pub const DEFAULT_MEMORY_CAPACITY: usize = 1024;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
  #[error("memory capacity must be between 1 and {max}, got {0}", max = i32::MAX)]
  MemoryCapacity(usize),
}

/// Machine configuration.
///
/// The memory capacity applies to data memory and instruction memory alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
  memory_capacity: usize,
}

impl Config {
  /// Addresses and the capacity marker in data slot 0 are signed 32-bit
  /// words, so the capacity has to fit in one.
  pub fn new(memory_capacity: usize) -> Result<Self, ConfigError> {
    if memory_capacity == 0 || i32::try_from(memory_capacity).is_err() {
      return Err(ConfigError::MemoryCapacity(memory_capacity));
    }
    Ok(Self { memory_capacity })
  }

  pub fn memory_capacity(&self) -> usize {
    self.memory_capacity
  }
}

impl Default for Config {
  fn default() -> Self {
    Self {
      memory_capacity: DEFAULT_MEMORY_CAPACITY,
    }
  }
}
