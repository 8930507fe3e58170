use std::fmt;

use crate::error::AppError;

const PREFIX: &str = "frame_";
const SUFFIX: &str = ".png";
const DIGITS: usize = 6;

/// Input pattern handed to the encoder; expands to the names [`FrameName`] accepts.
pub const SEQUENCE_PATTERN: &str = "frame_%06d.png";

/// A validated `frame_NNNNNN.png` file name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FrameName(String);

impl FrameName {
    pub fn parse(name: &str) -> Result<Self, AppError> {
        if is_frame_name(name) {
            Ok(Self(name.to_string()))
        } else {
            Err(AppError::invalid_frame_name(name))
        }
    }

    #[cfg(test)]
    pub(crate) fn from_index(index: u32) -> Option<Self> {
        (index < 1_000_000).then(|| Self(format!("{PREFIX}{index:06}{SUFFIX}")))
    }

    pub fn index(&self) -> u32 {
        self.0[PREFIX.len()..PREFIX.len() + DIGITS]
            .parse()
            .unwrap_or_default()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for FrameName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn is_frame_name(name: &str) -> bool {
    name.len() == PREFIX.len() + DIGITS + SUFFIX.len()
        && name.starts_with(PREFIX)
        && name.ends_with(SUFFIX)
        && name.as_bytes()[PREFIX.len()..PREFIX.len() + DIGITS]
            .iter()
            .all(u8::is_ascii_digit)
}
