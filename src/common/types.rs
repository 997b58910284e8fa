//! Shared types module
//!
//! This module contains shared data types used throughout the application.

use std::fmt;

/// Which listener a connection arrived on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// Public-facing listener
    External,
    /// Listener dialled by the internal population
    Internal,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::External => write!(f, "external"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side() {
        assert_eq!(Side::External.to_string(), "external");
        assert_eq!(Side::Internal.to_string(), "internal");
    }
}
