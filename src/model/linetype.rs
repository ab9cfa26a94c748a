//! Line type table entry

use crate::types::Handle;

/// A line type table entry
#[derive(Debug, Clone)]
pub struct LineType {
    /// Unique handle
    pub handle: Handle,
    /// Line type name
    pub name: String,
    /// Description
    pub description: String,
    /// Pattern element lengths (positive = dash, negative = space, 0 = dot)
    pub pattern: Vec<f64>,
}

impl LineType {
    /// Create a new line type
    pub fn new(name: impl Into<String>) -> Self {
        LineType {
            handle: Handle::NULL,
            name: name.into(),
            description: String::new(),
            pattern: Vec::new(),
        }
    }

    /// Create the standard "Continuous" line type
    pub fn continuous() -> Self {
        LineType {
            description: "Solid line".to_string(),
            ..Self::new("Continuous")
        }
    }

    /// Create a simple dashed line type
    pub fn dashed() -> Self {
        LineType {
            description: "Dashed __ __ __".to_string(),
            pattern: vec![0.5, -0.25],
            ..Self::new("Dashed")
        }
    }

    /// Whether the pattern is a solid line
    pub fn is_continuous(&self) -> bool {
        self.pattern.is_empty()
    }

    /// Total length of one pattern repetition
    pub fn pattern_length(&self) -> f64 {
        self.pattern.iter().map(|e| e.abs()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_continuous() {
        let lt = LineType::continuous();
        assert!(lt.is_continuous());
        assert_eq!(lt.pattern_length(), 0.0);
    }

    #[test]
    fn test_dashed_pattern_length() {
        let lt = LineType::dashed();
        assert!(!lt.is_continuous());
        assert!((lt.pattern_length() - 0.75).abs() < 1e-9);
    }
}
