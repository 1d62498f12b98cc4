/// Gameplay tuning for Pong.
///
/// Distances are in field pixels, speeds in pixels per physics step.
#[derive(Debug, Clone, Copy)]
pub struct PongTuning {
    pub field_width: f32,
    pub field_height: f32,

    pub paddle_width: f32,
    pub paddle_height: f32,
    /// Gap between a paddle and its back wall.
    pub paddle_margin: f32,
    pub paddle_speed: f32,

    pub ball_radius: f32,
    pub ball_speed: f32,

    /// Largest rebound angle off a paddle, in radians from the horizontal.
    pub max_rebound_angle: f32,
    /// Largest serve angle, in radians from the horizontal.
    pub max_serve_angle: f32,

    pub winning_score: u32,
}

impl PongTuning {
    pub fn left_paddle_x(&self) -> f32 {
        self.paddle_margin
    }

    pub fn right_paddle_x(&self) -> f32 {
        self.field_width - self.paddle_margin - self.paddle_width
    }

    pub fn paddle_start_y(&self) -> f32 {
        (self.field_height - self.paddle_height) / 2.0
    }
}

impl Default for PongTuning {
    fn default() -> Self {
        Self {
            field_width: 600.0,
            field_height: 400.0,
            paddle_width: 10.0,
            paddle_height: 80.0,
            paddle_margin: 20.0,
            paddle_speed: 8.0,
            ball_radius: 5.0,
            ball_speed: 6.0,
            max_rebound_angle: std::f32::consts::FRAC_PI_3,
            max_serve_angle: std::f32::consts::FRAC_PI_4,
            winning_score: 5,
        }
    }
}
