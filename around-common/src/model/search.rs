use crate::model::post::Location;
use std::fmt::{Display, Formatter};
use thiserror::Error;

pub const DEFAULT_SEARCH_RADIUS: Distance = Distance(200.0);

/// A non-negative distance in kilometers.
#[derive(Copy, Clone, PartialEq, PartialOrd, Debug)]
pub struct Distance(f64);

#[derive(Copy, Clone, PartialEq, Debug, Default, Error)]
#[error("The distance is not a finite, non-negative number of kilometers: {0}")]
pub struct InvalidDistanceError(f64);

impl Distance {
    pub fn kilometers(kilometers: f64) -> Result<Self, InvalidDistanceError> {
        if kilometers.is_finite() && kilometers >= 0.0 {
            Ok(Self(kilometers))
        } else {
            Err(InvalidDistanceError(kilometers))
        }
    }

    #[must_use]
    pub fn as_kilometers(self) -> f64 {
        self.0
    }
}

impl Default for Distance {
    fn default() -> Self {
        DEFAULT_SEARCH_RADIUS
    }
}

/// Formats in the store's distance syntax, e.g. `200km`.
impl Display for Distance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}km", self.0)
    }
}

#[derive(Copy, Clone, PartialEq, Debug)]
pub struct SearchRequest {
    pub center: Location,
    pub radius: Option<Distance>,
}

impl SearchRequest {
    #[must_use]
    pub fn new(center: Location, radius: Option<Distance>) -> Self {
        Self { center, radius }
    }

    /// The requested radius, or [`DEFAULT_SEARCH_RADIUS`] when none was given.
    #[must_use]
    pub fn radius(&self) -> Distance {
        self.radius.unwrap_or_default()
    }
}
