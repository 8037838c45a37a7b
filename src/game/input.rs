use serde::{Deserialize, Serialize};

/// Per-frame control intent for the local ship
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ShipInput {
    /// -1.0 (left) to 1.0 (right)
    pub turn: f32,
    /// 0.0 to 1.0; below the deadzone the ship coasts
    pub thrust: f32,
    pub fire: bool,
    /// Sell at the base, deposit materials in the drop zone
    pub interact: bool,
}

impl ShipInput {
    pub fn new(turn: f32, thrust: f32, fire: bool, interact: bool) -> Self {
        Self {
            turn,
            thrust,
            fire,
            interact,
        }
    }

    /// Clamp axes into range; NaN becomes 0
    pub fn sanitized(&self) -> Self {
        let clean = |v: f32, lo: f32, hi: f32| if v.is_finite() { v.clamp(lo, hi) } else { 0.0 };
        Self {
            turn: clean(self.turn, -1.0, 1.0),
            thrust: clean(self.thrust, 0.0, 1.0),
            fire: self.fire,
            interact: self.interact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitized_clamps() {
        let input = ShipInput::new(3.0, -2.0, true, false).sanitized();
        assert_eq!(input.turn, 1.0);
        assert_eq!(input.thrust, 0.0);
        assert!(input.fire);

        let input = ShipInput::new(f32::NAN, f32::INFINITY, false, true).sanitized();
        assert_eq!(input.turn, 0.0);
        assert_eq!(input.thrust, 0.0);
    }
}
