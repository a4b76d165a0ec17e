//! Trade signal evaluation.
//!
//! Each strategy maps a two-bar observation window and the current position
//! state to a single action. Evaluation is a pure function: no order state is
//! held here, the harness owns the position and threads it back in per bar.

use std::fmt;
use std::str::FromStr;

/// What the harness should do on the next fill opportunity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Buy,
    Sell,
    Hold,
}

/// Position state as seen by the evaluator. Transitions happen only in the
/// harness, on executed fills.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    Flat,
    Long,
}

/// Illumination fractions for the previous and current bar dates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhasePair {
    pub prev: f64,
    pub curr: f64,
}

impl PhasePair {
    fn is_valid(&self) -> bool {
        self.prev.is_finite() && self.curr.is_finite()
    }
}

/// Two-bar observation window. Lunar strategies additionally need `phases`;
/// the close-reversal strategy ignores it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalWindow {
    pub close_prev: f64,
    pub close_curr: f64,
    pub phases: Option<PhasePair>,
}

/// The available trading strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrategyKind {
    /// Buy whenever today's close is below yesterday's. Never sells; the
    /// original lesson script this reproduces only ever accumulated.
    CloseReversal,
    /// Sell into the turn from waning to new moon on a down day, buy while
    /// the moon wanes toward new on an up day.
    LunarSwing,
    /// Sell while the moon wanes below half, buy when illumination crosses
    /// above half.
    LunarCycle,
}

impl StrategyKind {
    /// Evaluate one bar. Pure; identical inputs always produce the same
    /// action. NaN closes, or missing/NaN phases for a lunar strategy,
    /// evaluate to `Hold`.
    ///
    /// Guarantees: never returns `Buy` when already long, never returns
    /// `Sell` when flat.
    pub fn evaluate(&self, window: &SignalWindow, position: PositionState) -> Action {
        if !window.close_prev.is_finite() || !window.close_curr.is_finite() {
            return Action::Hold;
        }

        match self {
            StrategyKind::CloseReversal => evaluate_close_reversal(window, position),
            StrategyKind::LunarSwing => match valid_phases(window) {
                Some(phases) => evaluate_lunar_swing(window, phases, position),
                None => Action::Hold,
            },
            StrategyKind::LunarCycle => match valid_phases(window) {
                Some(phases) => evaluate_lunar_cycle(phases, position),
                None => Action::Hold,
            },
        }
    }

    /// Whether this strategy consumes lunar phase observations.
    pub fn uses_phases(&self) -> bool {
        matches!(self, StrategyKind::LunarSwing | StrategyKind::LunarCycle)
    }
}

fn valid_phases(window: &SignalWindow) -> Option<PhasePair> {
    window.phases.filter(PhasePair::is_valid)
}

fn evaluate_close_reversal(window: &SignalWindow, position: PositionState) -> Action {
    if position == PositionState::Flat && window.close_curr < window.close_prev {
        Action::Buy
    } else {
        Action::Hold
    }
}

fn evaluate_lunar_swing(
    window: &SignalWindow,
    phases: PhasePair,
    position: PositionState,
) -> Action {
    match position {
        PositionState::Long => {
            // Waning moon crossing below half on a down day.
            if phases.prev > 0.5 && phases.curr < 0.5 && window.close_prev > window.close_curr {
                Action::Sell
            } else {
                Action::Hold
            }
        }
        PositionState::Flat => {
            // Moon still dimming toward new while price turns up.
            if phases.prev > phases.curr && phases.curr < 0.5 && window.close_curr > window.close_prev
            {
                Action::Buy
            } else {
                Action::Hold
            }
        }
    }
}

fn evaluate_lunar_cycle(phases: PhasePair, position: PositionState) -> Action {
    match position {
        PositionState::Long => {
            // Inclusive at the half boundary: the cross counts as soon as
            // illumination is no longer above half.
            if phases.prev > phases.curr && phases.curr <= 0.5 {
                Action::Sell
            } else {
                Action::Hold
            }
        }
        PositionState::Flat => {
            if phases.prev < 0.5 && phases.curr > 0.5 {
                Action::Buy
            } else {
                Action::Hold
            }
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StrategyKind::CloseReversal => "close-reversal",
            StrategyKind::LunarSwing => "lunar-swing",
            StrategyKind::LunarCycle => "lunar-cycle",
        };
        write!(f, "{name}")
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "close-reversal" => Ok(StrategyKind::CloseReversal),
            "lunar-swing" => Ok(StrategyKind::LunarSwing),
            "lunar-cycle" => Ok(StrategyKind::LunarCycle),
            other => Err(format!(
                "unknown strategy kind '{other}' (expected close-reversal, lunar-swing or lunar-cycle)"
            )),
        }
    }
}
