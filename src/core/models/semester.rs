//! Semester and offering model

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// The teaching period within a calendar year.
///
/// Variants are declared in calendar order so the derived `Ord` sorts
/// `Semester1 < Semester2 < Summer`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Offering {
    /// First semester of the year
    Semester1,
    /// Second semester of the year
    Semester2,
    /// Summer semester at the end of the year
    Summer,
}

impl Offering {
    /// All offerings in calendar order
    pub const ALL: [Self; 3] = [Self::Semester1, Self::Semester2, Self::Summer];

    /// Short label used in plan files (`S1`, `S2`, `SUM`)
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Semester1 => "S1",
            Self::Semester2 => "S2",
            Self::Summer => "SUM",
        }
    }
}

impl fmt::Display for Offering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Errors raised while parsing semesters or offerings
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemesterParseError {
    /// The offering part was not recognised
    #[error("Unknown offering: '{0}' (expected S1, S2 or SUM)")]
    UnknownOffering(String),
    /// The year part was not a number
    #[error("Invalid year: '{0}'")]
    InvalidYear(String),
    /// The year was outside the supported range
    #[error("Year {0} is out of range (expected {min}..={max})", min = Semester::MIN_YEAR, max = Semester::MAX_YEAR)]
    YearOutOfRange(u16),
    /// The text did not have a `YEAR/OFFERING` shape
    #[error("Invalid semester: '{0}' (expected YEAR/OFFERING, e.g. 2020/S1)")]
    Malformed(String),
}

impl FromStr for Offering {
    type Err = SemesterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "s1" | "1" | "semester1" | "semester 1" | "sem1" => Ok(Self::Semester1),
            "s2" | "2" | "semester2" | "semester 2" | "sem2" => Ok(Self::Semester2),
            "sum" | "summer" | "s3" | "3" => Ok(Self::Summer),
            _ => Err(SemesterParseError::UnknownOffering(s.trim().to_string())),
        }
    }
}

/// An academic term: a year and the offering within it
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Semester {
    /// Calendar year
    pub year: u16,
    /// Offering within the year
    pub offering: Offering,
}

impl Semester {
    /// Earliest year accepted when parsing
    pub const MIN_YEAR: u16 = 1;

    /// Latest year accepted when parsing
    pub const MAX_YEAR: u16 = 9999;

    /// Create a new semester
    #[must_use]
    pub const fn new(year: u16, offering: Offering) -> Self {
        Self { year, offering }
    }

    /// The semester that follows this one
    ///
    /// `u16::MAX/SUM` is its own successor.
    #[must_use]
    pub const fn next(self) -> Self {
        match self.offering {
            Offering::Semester1 => Self::new(self.year, Offering::Semester2),
            Offering::Semester2 => Self::new(self.year, Offering::Summer),
            Offering::Summer => match self.year.checked_add(1) {
                Some(year) => Self::new(year, Offering::Semester1),
                None => self,
            },
        }
    }

    /// The semester that precedes this one
    ///
    /// `0/S1` is its own predecessor.
    #[must_use]
    pub const fn previous(self) -> Self {
        match self.offering {
            Offering::Semester1 => match self.year.checked_sub(1) {
                Some(year) => Self::new(year, Offering::Summer),
                None => self,
            },
            Offering::Semester2 => Self::new(self.year, Offering::Semester1),
            Offering::Summer => Self::new(self.year, Offering::Semester2),
        }
    }

    /// Advance by `steps` semesters
    #[must_use]
    pub fn advance(self, steps: usize) -> Self {
        (0..steps).fold(self, |sem, _| sem.next())
    }

    /// Inclusive ascending sequence of semesters from `first` to `last`.
    ///
    /// Empty when `first > last`.
    pub fn sequence(first: Self, last: Self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(first), move |s| (*s < last).then(|| s.next()))
            .take_while(move |s| *s <= last)
    }

    /// Inclusive descending sequence of semesters from `last` down to `first`.
    pub fn sequence_rev(last: Self, first: Self) -> impl Iterator<Item = Self> {
        std::iter::successors(Some(last), move |s| (*s > first).then(|| s.previous()))
            .take_while(move |s| *s >= first)
    }
}

impl fmt::Display for Semester {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.year, self.offering)
    }
}

impl FromStr for Semester {
    type Err = SemesterParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (year, offering) = trimmed
            .split_once(['/', '-', ' '])
            .ok_or_else(|| SemesterParseError::Malformed(trimmed.to_string()))?;

        let year = year
            .trim()
            .parse::<u16>()
            .map_err(|_| SemesterParseError::InvalidYear(year.trim().to_string()))?;
        if !(Self::MIN_YEAR..=Self::MAX_YEAR).contains(&year) {
            return Err(SemesterParseError::YearOutOfRange(year));
        }

        Ok(Self::new(year, offering.parse()?))
    }
}
