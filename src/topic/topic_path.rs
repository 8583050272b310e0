//! Dot-delimited topic parsing

use std::fmt;
use std::ops::ControlFlow;
use std::str::FromStr;

use arcstr::{ArcStr, Substr};
use smallvec::SmallVec;

use super::error::limits::TopicLimits;
use super::error::{TopicError, TopicResult};

/// Separator between topic segments
pub const SEPARATOR: char = '.';

/// Wildcard marker, valid only as the final segment
pub const WILDCARD: &str = "*";

/// One segment of a parsed topic
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TopicSegment {
	/// Literal segment matching `[A-Za-z0-9_]+`
	Name(Substr),
	/// Trailing `*`
	Wildcard,
}

impl TopicSegment {
	/// Returns string representation of the segment.
	pub fn as_str(&self) -> &str {
		match self {
			| TopicSegment::Name(s) => s,
			| TopicSegment::Wildcard => WILDCARD,
		}
	}

	/// Returns true for the `*` segment.
	pub fn is_wildcard(&self) -> bool {
		matches!(self, TopicSegment::Wildcard)
	}
}

impl fmt::Display for TopicSegment {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// Parsed, validated topic.
///
/// Keeps the original string alongside its segments so the tree can report
/// the exact pattern a handler was registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicPath {
	path: ArcStr,
	segments: SmallVec<[TopicSegment; 4]>,
}

impl TopicPath {
	/// Parses a topic with the default [`TopicLimits`].
	pub fn parse(raw: impl Into<ArcStr>) -> TopicResult<Self> {
		Self::parse_with_limits(raw, &TopicLimits::default())
	}

	/// Parses a topic, rejecting it if it breaks the grammar or `limits`.
	pub fn parse_with_limits(
		raw: impl Into<ArcStr>,
		limits: &TopicLimits,
	) -> TopicResult<Self> {
		let path = raw.into();
		if path.trim().is_empty() || path.chars().all(|c| c == SEPARATOR) {
			return Err(TopicError::EmptyTopic);
		}
		if path.len() > limits.max_topic_length {
			return Err(TopicError::TopicTooLong {
				len: path.len(),
				max: limits.max_topic_length,
			});
		}

		let depth = path.split(SEPARATOR).count();
		if depth > limits.max_depth {
			return Err(TopicError::TooDeep {
				depth,
				max: limits.max_depth,
			});
		}

		let mut segments = SmallVec::with_capacity(depth);
		for (position, raw_segment) in path.split(SEPARATOR).enumerate() {
			let segment = match raw_segment {
				| "" => {
					return Err(TopicError::empty_segment(
						path.as_str(),
						position,
					));
				}
				| WILDCARD if position + 1 == depth => TopicSegment::Wildcard,
				| WILDCARD => {
					return Err(TopicError::wildcard_position(path.as_str()));
				}
				| s if s.len() > limits.max_segment_length => {
					return Err(TopicError::SegmentTooLong {
						position,
						len: s.len(),
						max: limits.max_segment_length,
					});
				}
				| s if !s.bytes().all(is_segment_byte) => {
					return Err(TopicError::invalid_segment(s, position));
				}
				| s => TopicSegment::Name(path.substr_from(s)),
			};
			segments.push(segment);
		}

		Ok(Self { path, segments })
	}

	/// Walks the segments in order. `f` receives each segment and whether it
	/// is the last one; returning `ControlFlow::Break` stops the walk.
	pub fn for_each_segment<B, F>(&self, mut f: F) -> ControlFlow<B>
	where F: FnMut(&TopicSegment, bool) -> ControlFlow<B> {
		let last = self.segments.len() - 1;
		for (index, segment) in self.segments.iter().enumerate() {
			if let ControlFlow::Break(b) = f(segment, index == last) {
				return ControlFlow::Break(b);
			}
		}
		ControlFlow::Continue(())
	}

	/// Returns the topic exactly as it was given.
	pub fn as_str(&self) -> &str {
		&self.path
	}

	/// Returns a cheap clone of the original topic string.
	pub fn path(&self) -> ArcStr {
		self.path.clone()
	}

	/// Returns the parsed segments.
	pub fn segments(&self) -> &[TopicSegment] {
		&self.segments
	}

	/// Returns the number of segments; never zero.
	pub fn depth(&self) -> usize {
		self.segments.len()
	}

	/// Returns true if the topic ends in `*`.
	pub fn is_wildcard(&self) -> bool {
		self.segments.last().is_some_and(TopicSegment::is_wildcard)
	}

	/// Returns true for the bare `*` topic.
	pub fn is_root_wildcard(&self) -> bool {
		self.segments.len() == 1 && self.is_wildcard()
	}
}

fn is_segment_byte(b: u8) -> bool {
	b.is_ascii_alphanumeric() || b == b'_'
}

impl fmt::Display for TopicPath {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.path)
	}
}

impl FromStr for TopicPath {
	type Err = TopicError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Self::parse(s)
	}
}

impl TryFrom<&str> for TopicPath {
	type Error = TopicError;

	fn try_from(value: &str) -> Result<Self, Self::Error> {
		Self::parse(value)
	}
}
