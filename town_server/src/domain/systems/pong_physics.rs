use crate::domain::ports::RandomSource;
use crate::domain::tuning::pong::PongTuning;
use town_protocol::{Point, PongGameState, PongSide};
use tracing::debug;

/// What happened during one physics step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepOutcome {
    /// Side that scored, if the ball left the field.
    pub scored: Option<PongSide>,
    pub paddle_hit: Option<PongSide>,
}

/// Advances paddles and ball by one fixed step.
///
/// Scores are awarded here (capped at the winning score); deciding whether the
/// game is over is left to the caller.
pub fn step(state: &mut PongGameState, tuning: &PongTuning, rng: &mut dyn RandomSource) -> StepOutcome {
    move_paddles(state, tuning);

    state.ball_position.x += state.ball_velocity.x;
    state.ball_position.y += state.ball_velocity.y;

    bounce_off_walls(state, tuning);

    let mut outcome = StepOutcome::default();
    for side in [PongSide::Left, PongSide::Right] {
        if bounce_off_paddle(state, tuning, side, rng) {
            outcome.paddle_hit = Some(side);
            break;
        }
    }

    if let Some(scorer) = out_of_bounds(state, tuning) {
        let score = match scorer {
            PongSide::Left => &mut state.left_score,
            PongSide::Right => &mut state.right_score,
        };
        *score = (*score + 1).min(tuning.winning_score);
        debug!(
            ?scorer,
            left_score = state.left_score,
            right_score = state.right_score,
            "point scored"
        );
        serve(state, tuning, rng);
        outcome.scored = Some(scorer);
    }

    outcome
}

/// Re-centres the ball and launches it toward a random side at a random angle.
pub fn serve(state: &mut PongGameState, tuning: &PongTuning, rng: &mut dyn RandomSource) {
    state.ball_position = Point::new(tuning.field_width / 2.0, tuning.field_height / 2.0);

    let angle = rng.range(-tuning.max_serve_angle, tuning.max_serve_angle);
    let direction = if rng.next_unit() < 0.5 { -1.0 } else { 1.0 };
    state.ball_velocity = Point::new(
        direction * tuning.ball_speed * angle.cos(),
        tuning.ball_speed * angle.sin(),
    );
}

fn move_paddles(state: &mut PongGameState, tuning: &PongTuning) {
    let max_y = tuning.field_height - tuning.paddle_height;

    let left_dy = state.left_paddle_direction.sign() * tuning.paddle_speed;
    state.left_paddle.y = (state.left_paddle.y + left_dy).clamp(0.0, max_y);

    let right_dy = state.right_paddle_direction.sign() * tuning.paddle_speed;
    state.right_paddle.y = (state.right_paddle.y + right_dy).clamp(0.0, max_y);
}

fn bounce_off_walls(state: &mut PongGameState, tuning: &PongTuning) {
    let radius = tuning.ball_radius;
    let ball = &mut state.ball_position;
    let velocity = &mut state.ball_velocity;

    if ball.y - radius <= 0.0 && velocity.y < 0.0 {
        ball.y = radius;
        velocity.y = -velocity.y;
    } else if ball.y + radius >= tuning.field_height && velocity.y > 0.0 {
        ball.y = tuning.field_height - radius;
        velocity.y = -velocity.y;
    }
}

fn bounce_off_paddle(
    state: &mut PongGameState,
    tuning: &PongTuning,
    side: PongSide,
    rng: &mut dyn RandomSource,
) -> bool {
    let (paddle, heading_in, outward) = match side {
        PongSide::Left => (state.left_paddle, state.ball_velocity.x < 0.0, 1.0),
        PongSide::Right => (state.right_paddle, state.ball_velocity.x > 0.0, -1.0),
    };
    if !heading_in {
        return false;
    }

    let radius = tuning.ball_radius;
    let ball = state.ball_position;
    let overlaps_x = ball.x - radius <= paddle.x + tuning.paddle_width && ball.x + radius >= paddle.x;
    let overlaps_y = ball.y + radius >= paddle.y && ball.y - radius <= paddle.y + tuning.paddle_height;
    if !(overlaps_x && overlaps_y) {
        return false;
    }

    // Randomised rebound angle keeps volleys from settling into a loop.
    let speed = state.ball_velocity.x.hypot(state.ball_velocity.y);
    let angle = rng.range(-tuning.max_rebound_angle, tuning.max_rebound_angle);
    state.ball_velocity = Point::new(outward * speed * angle.cos(), speed * angle.sin());
    state.ball_position.x = match side {
        PongSide::Left => paddle.x + tuning.paddle_width + radius,
        PongSide::Right => paddle.x - radius,
    };
    true
}

// Returns the side that scored when the ball fully left the field.
fn out_of_bounds(state: &PongGameState, tuning: &PongTuning) -> Option<PongSide> {
    let radius = tuning.ball_radius;
    if state.ball_position.x + radius < 0.0 {
        Some(PongSide::Right)
    } else if state.ball_position.x - radius > tuning.field_width {
        Some(PongSide::Left)
    } else {
        None
    }
}
