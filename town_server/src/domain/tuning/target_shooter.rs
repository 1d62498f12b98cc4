use town_protocol::Difficulty;

/// Gameplay tuning for Target Shooter.
#[derive(Debug, Clone, Copy)]
pub struct TargetShooterTuning {
    pub field_width: f32,
    pub field_height: f32,

    /// Target diameter per difficulty.
    pub easy_target_size: f32,
    pub medium_target_size: f32,
    pub hard_target_size: f32,

    pub winning_score: u32,
    /// Upper bound the score type allows.
    pub max_score: u32,
}

impl TargetShooterTuning {
    pub fn target_size(&self, difficulty: Difficulty) -> f32 {
        match difficulty {
            Difficulty::Easy => self.easy_target_size,
            Difficulty::Medium => self.medium_target_size,
            Difficulty::Hard => self.hard_target_size,
        }
    }
}

impl Default for TargetShooterTuning {
    fn default() -> Self {
        Self {
            field_width: 500.0,
            field_height: 500.0,
            easy_target_size: 60.0,
            medium_target_size: 40.0,
            hard_target_size: 25.0,
            winning_score: 5,
            max_score: 10,
        }
    }
}
