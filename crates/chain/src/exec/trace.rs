use std::fmt;

/// One recorded trace message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
	pub level: u8,
	pub message: String,
}

/// Leveled messages recorded during one execution.
///
/// Entries above the configured level are discarded on arrival. Level 0 records
/// nothing.
#[derive(Debug, Clone, Default)]
pub struct Trace {
	level: u8,
	entries: Vec<TraceEntry>,
}

impl Trace {
	pub fn new(level: u8) -> Self {
		Self {
			level,
			entries: Vec::new(),
		}
	}

	pub fn level(&self) -> u8 {
		self.level
	}

	/// Returns true if a message at `level` would be kept.
	pub fn enabled(&self, level: u8) -> bool {
		level > 0 && level <= self.level
	}

	pub fn record(&mut self, level: u8, message: impl Into<String>) {
		if self.enabled(level) {
			self.entries.push(TraceEntry {
				level,
				message: message.into(),
			});
		}
	}

	pub fn entries(&self) -> &[TraceEntry] {
		&self.entries
	}

	pub fn messages(&self) -> impl Iterator<Item = &str> {
		self.entries.iter().map(|e| e.message.as_str())
	}
}

impl fmt::Display for Trace {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for entry in &self.entries {
			writeln!(f, "[{}] {}", entry.level, entry.message)?;
		}
		Ok(())
	}
}
