//! Strategy configuration.

use crate::domain::signal::StrategyKind;

#[derive(Debug, Clone)]
pub struct Strategy {
    pub name: String,
    pub description: String,
    pub kind: StrategyKind,
    /// Fraction of available cash committed on entry, in (0, 1].
    pub position_size: f64,
}

impl Strategy {
    pub fn new(kind: StrategyKind) -> Self {
        Strategy {
            name: kind.to_string(),
            description: String::new(),
            kind,
            position_size: 0.95,
        }
    }
}
