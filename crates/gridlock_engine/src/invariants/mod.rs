//! First-class invariants over [`crate::GameState`].
//!
//! Invariants are properties every accepted mutation must preserve. The
//! engine checks them with `debug_assert!`; tests can check them directly.

mod connectivity;
mod wall_cap;
mod wall_orientation;

pub use connectivity::ConnectivityInvariant;
pub use wall_cap::WallCapInvariant;
pub use wall_orientation::WallOrientationInvariant;

/// A logical property that must hold for a given state.
pub trait Invariant<S> {
    /// Checks if the invariant holds for the given state.
    fn holds(state: &S) -> bool;

    /// Human-readable description of the invariant.
    fn description() -> &'static str;
}

/// Violation of an invariant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvariantViolation {
    /// Description of the violated invariant.
    pub description: String,
}

impl InvariantViolation {
    /// Creates a new invariant violation.
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
        }
    }
}

/// Several invariants checked together. Implemented for tuples.
pub trait InvariantSet<S> {
    /// Checks every member, collecting all violations.
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>>;
}

/// Turns `(holds, description)` pairs into a `check_all` result.
fn collect(checks: &[(bool, &'static str)]) -> Result<(), Vec<InvariantViolation>> {
    let violations: Vec<InvariantViolation> = checks
        .iter()
        .filter(|(holds, _)| !holds)
        .map(|(_, description)| InvariantViolation::new(*description))
        .collect();
    if violations.is_empty() {
        Ok(())
    } else {
        Err(violations)
    }
}

impl<S, I1, I2> InvariantSet<S> for (I1, I2)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        collect(&[
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
        ])
    }
}

impl<S, I1, I2, I3> InvariantSet<S> for (I1, I2, I3)
where
    I1: Invariant<S>,
    I2: Invariant<S>,
    I3: Invariant<S>,
{
    fn check_all(state: &S) -> Result<(), Vec<InvariantViolation>> {
        collect(&[
            (I1::holds(state), I1::description()),
            (I2::holds(state), I2::description()),
            (I3::holds(state), I3::description()),
        ])
    }
}

/// Invariants that hold after every accepted mutation.
pub type WallInvariants = (WallCapInvariant, WallOrientationInvariant);

/// Invariants that hold whenever walls are locked in or the turn passes.
pub type LockedInInvariants = (
    WallCapInvariant,
    WallOrientationInvariant,
    ConnectivityInvariant,
);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Color, Coord, EdgeState, GameConfig, GameState};

    #[test]
    fn test_fresh_state_satisfies_all() {
        let state = GameState::from_config(&GameConfig::default()).unwrap();
        assert!(LockedInInvariants::check_all(&state).is_ok());
    }

    #[test]
    fn test_collects_every_violation() {
        let mut state = GameState::from_config(&GameConfig::default()).unwrap();
        // A listed red wall that never reached the board.
        state
            .walls_mut()
            .active_mut(Color::Red)
            .push(Coord::new(3, 2));
        // A blue wall on a vertical edge, missing from the wall lists.
        state
            .current_board_mut()
            .set_edge(Coord::new(1, 2), EdgeState::Wall(Color::Blue))
            .unwrap();
        let violations = WallInvariants::check_all(&state).unwrap_err();
        assert_eq!(violations.len(), 2);
    }

    #[test]
    fn test_triple_reports_only_failing_members() {
        let mut state = GameState::from_config(&GameConfig::default()).unwrap();
        state
            .walls_mut()
            .active_mut(Color::Red)
            .push(Coord::new(3, 2));
        let violations = LockedInInvariants::check_all(&state).unwrap_err();
        assert_eq!(
            violations,
            vec![InvariantViolation::new(
                WallOrientationInvariant::description()
            )]
        );
    }
}
