use super::types::PowerUpKind;

pub const SPEED_BOOST_MULTIPLIER: f64 = 1.5;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PowerUpState {
    pub active: bool,
    pub remaining_ms: u64,
}

/// Independent Inactive -> Active -> Inactive timers, one per kind.
#[derive(Clone, Debug, Default)]
pub struct PowerUpManager {
    speed_boost: PowerUpState,
    shield: PowerUpState,
    double_score: PowerUpState,
}

impl PowerUpManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activating a kind that is already active changes nothing; the first
    /// activation runs its full duration.
    pub fn activate(&mut self, kind: PowerUpKind) -> bool {
        let state = self.state_mut(kind);
        if state.active {
            return false;
        }
        *state = PowerUpState {
            active: true,
            remaining_ms: kind.duration_ms(),
        };
        true
    }

    /// Advances every active timer and returns the kinds that just expired.
    pub fn tick(&mut self, elapsed_ms: u64) -> Vec<PowerUpKind> {
        let mut expired = Vec::new();
        for kind in PowerUpKind::ALL {
            let state = self.state_mut(kind);
            if !state.active {
                continue;
            }
            state.remaining_ms = state.remaining_ms.saturating_sub(elapsed_ms);
            if state.remaining_ms == 0 {
                state.active = false;
                expired.push(kind);
            }
        }
        expired
    }

    pub fn is_active(&self, kind: PowerUpKind) -> bool {
        self.state(kind).active
    }

    pub fn remaining_ms(&self, kind: PowerUpKind) -> u64 {
        self.state(kind).remaining_ms
    }

    pub fn state(&self, kind: PowerUpKind) -> PowerUpState {
        match kind {
            PowerUpKind::SpeedBoost => self.speed_boost,
            PowerUpKind::Shield => self.shield,
            PowerUpKind::DoubleScore => self.double_score,
        }
    }

    pub fn states(&self) -> [(PowerUpKind, PowerUpState); 3] {
        PowerUpKind::ALL.map(|kind| (kind, self.state(kind)))
    }

    /// Rebuilt from the active effects on every call rather than
    /// accumulated.
    pub fn speed_multiplier(&self) -> f64 {
        if self.speed_boost.active { SPEED_BOOST_MULTIPLIER } else { 1.0 }
    }

    pub fn score_multiplier(&self) -> u32 {
        if self.double_score.active { 2 } else { 1 }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn state_mut(&mut self, kind: PowerUpKind) -> &mut PowerUpState {
        match kind {
            PowerUpKind::SpeedBoost => &mut self.speed_boost,
            PowerUpKind::Shield => &mut self.shield,
            PowerUpKind::DoubleScore => &mut self.double_score,
        }
    }
}
