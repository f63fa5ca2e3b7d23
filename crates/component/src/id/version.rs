use std::cmp::Ordering;
use std::fmt;

use crate::SpecificationError;

/// A component version: `major.minor.micro.qualifier`.
///
/// Missing numeric parts are zero and a missing qualifier is empty, so `1` and `1.0.0`
/// denote the same version. Versions order numerically part by part, then by qualifier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Version {
	major: u32,
	minor: u32,
	micro: u32,
	qualifier: String,
}

impl Version {
	/// Creates a version without a qualifier.
	pub const fn new(major: u32, minor: u32, micro: u32) -> Self {
		Self {
			major,
			minor,
			micro,
			qualifier: String::new(),
		}
	}

	/// Returns this version with the given qualifier.
	pub fn with_qualifier(mut self, qualifier: impl Into<String>) -> Result<Self, SpecificationError> {
		let qualifier = qualifier.into();
		check_qualifier("version", &qualifier, &qualifier)?;
		self.qualifier = qualifier;
		Ok(self)
	}

	/// Parses `major[.minor[.micro[.qualifier]]]`. The empty string is the empty version.
	pub fn parse(text: &str) -> Result<Self, SpecificationError> {
		let parts = split_parts("version", text)?;
		Ok(Self {
			major: parts.major.unwrap_or(0),
			minor: parts.minor.unwrap_or(0),
			micro: parts.micro.unwrap_or(0),
			qualifier: parts.qualifier.unwrap_or_default(),
		})
	}

	pub const fn major(&self) -> u32 {
		self.major
	}

	pub const fn minor(&self) -> u32 {
		self.minor
	}

	pub const fn micro(&self) -> u32 {
		self.micro
	}

	pub fn qualifier(&self) -> &str {
		&self.qualifier
	}

	/// Returns true for `0.0.0` without qualifier, the version of unversioned identifiers.
	pub fn is_empty(&self) -> bool {
		self.major == 0 && self.minor == 0 && self.micro == 0 && self.qualifier.is_empty()
	}
}

impl Ord for Version {
	fn cmp(&self, other: &Self) -> Ordering {
		self.major
			.cmp(&other.major)
			.then_with(|| self.minor.cmp(&other.minor))
			.then_with(|| self.micro.cmp(&other.micro))
			.then_with(|| self.qualifier.cmp(&other.qualifier))
	}
}

impl PartialOrd for Version {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl fmt::Display for Version {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}.{}.{}", self.major, self.minor, self.micro)?;
		if !self.qualifier.is_empty() {
			write!(f, ".{}", self.qualifier)?;
		}
		Ok(())
	}
}

/// A version constraint fixing any prefix of `major.minor.micro.qualifier`.
///
/// Unset parts match every value. The unconstrained specification (`*` or the empty
/// string) matches every version. A leading `=` pins the whole version: `=1.2.3` matches
/// `1.2.3` but not `1.2.3.beta`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct VersionSpecification {
	major: Option<u32>,
	minor: Option<u32>,
	micro: Option<u32>,
	qualifier: Option<String>,
}

impl VersionSpecification {
	/// The specification matching every version.
	pub const fn any() -> Self {
		Self {
			major: None,
			minor: None,
			micro: None,
			qualifier: None,
		}
	}

	/// A specification matching exactly one version.
	pub fn exact(version: &Version) -> Self {
		Self {
			major: Some(version.major),
			minor: Some(version.minor),
			micro: Some(version.micro),
			qualifier: Some(version.qualifier.clone()),
		}
	}

	/// Parses `*`, the empty string, `major[.minor[.micro[.qualifier]]]` or
	/// `=major.minor.micro[.qualifier]`.
	pub fn parse(text: &str) -> Result<Self, SpecificationError> {
		const KIND: &str = "version specification";
		let text = text.trim();
		if text == "*" {
			return Ok(Self::any());
		}
		let Some(pinned) = text.strip_prefix('=') else {
			let parts = split_parts(KIND, text)?;
			return Ok(Self {
				major: parts.major,
				minor: parts.minor,
				micro: parts.micro,
				qualifier: parts.qualifier,
			});
		};
		let parts = split_parts(KIND, pinned)?;
		let (Some(major), Some(minor), Some(micro)) = (parts.major, parts.minor, parts.micro) else {
			return Err(SpecificationError::new(KIND, text, "exact version needs major.minor.micro"));
		};
		Ok(Self {
			major: Some(major),
			minor: Some(minor),
			micro: Some(micro),
			qualifier: Some(parts.qualifier.unwrap_or_default()),
		})
	}

	/// Returns true if no part is constrained.
	pub fn is_any(&self) -> bool {
		self.major.is_none() && self.minor.is_none() && self.micro.is_none() && self.qualifier.is_none()
	}

	/// Returns true if `version` satisfies every constrained part.
	pub fn matches(&self, version: &Version) -> bool {
		self.major.is_none_or(|m| m == version.major)
			&& self.minor.is_none_or(|m| m == version.minor)
			&& self.micro.is_none_or(|m| m == version.micro)
			&& self.qualifier.as_deref().is_none_or(|q| q == version.qualifier)
	}
}

impl fmt::Display for VersionSpecification {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let Some(major) = self.major else {
			return f.write_str("*");
		};
		if self.qualifier.as_deref() == Some("") {
			f.write_str("=")?;
		}
		write!(f, "{major}")?;
		if let Some(minor) = self.minor {
			write!(f, ".{minor}")?;
		}
		if let Some(micro) = self.micro {
			write!(f, ".{micro}")?;
		}
		if let Some(qualifier) = self.qualifier.as_deref().filter(|q| !q.is_empty()) {
			write!(f, ".{qualifier}")?;
		}
		Ok(())
	}
}

#[derive(Default)]
struct Parts {
	major: Option<u32>,
	minor: Option<u32>,
	micro: Option<u32>,
	qualifier: Option<String>,
}

fn split_parts(kind: &'static str, text: &str) -> Result<Parts, SpecificationError> {
	let text = text.trim();
	let mut parts = Parts::default();
	if text.is_empty() {
		return Ok(parts);
	}

	let mut pieces = text.splitn(4, '.');
	parts.major = pieces.next().map(|p| parse_number(kind, text, p)).transpose()?;
	parts.minor = pieces.next().map(|p| parse_number(kind, text, p)).transpose()?;
	parts.micro = pieces.next().map(|p| parse_number(kind, text, p)).transpose()?;
	if let Some(qualifier) = pieces.next() {
		check_qualifier(kind, text, qualifier)?;
		parts.qualifier = Some(qualifier.to_owned());
	}
	Ok(parts)
}

fn parse_number(kind: &'static str, text: &str, piece: &str) -> Result<u32, SpecificationError> {
	if piece.is_empty() {
		return Err(SpecificationError::new(kind, text, "empty version part"));
	}
	if !piece.bytes().all(|b| b.is_ascii_digit()) {
		return Err(SpecificationError::new(
			kind,
			text,
			format!("version part {piece:?} is not a non-negative integer"),
		));
	}
	piece
		.parse()
		.map_err(|_| SpecificationError::new(kind, text, format!("version part {piece:?} is out of range")))
}

fn check_qualifier(kind: &'static str, text: &str, qualifier: &str) -> Result<(), SpecificationError> {
	if qualifier.is_empty() {
		return Err(SpecificationError::new(kind, text, "empty qualifier"));
	}
	match qualifier
		.chars()
		.find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
	{
		Some(c) => Err(SpecificationError::new(
			kind,
			text,
			format!("qualifier contains illegal character {c:?}"),
		)),
		None => Ok(()),
	}
}
