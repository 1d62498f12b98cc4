use super::Game;
use super::seats::{Seating, SeatedState, finish};
use crate::domain::errors::GameError;
use crate::domain::ports::RandomSource;
use crate::domain::systems::pong_physics;
use crate::domain::tuning::pong::PongTuning;
use town_protocol::{
    AreaKind, GameInstanceId, GameMove, GameState, GameStatus, PaddleDirection, PlayerId, Point,
    PongGameState, PongMove, PongSide,
};
use tracing::info;

/// Two-player Pong. The ball only moves through [`Game::update_physics`].
pub struct PongGame {
    id: GameInstanceId,
    state: PongGameState,
    seating: Seating,
    tuning: PongTuning,
}

impl PongGame {
    pub fn with_tuning(id: GameInstanceId, prior: Option<&Self>, tuning: PongTuning) -> Self {
        let state = PongGameState {
            left_paddle: Point::new(tuning.left_paddle_x(), tuning.paddle_start_y()),
            right_paddle: Point::new(tuning.right_paddle_x(), tuning.paddle_start_y()),
            ball_position: Point::new(tuning.field_width / 2.0, tuning.field_height / 2.0),
            ..PongGameState::default()
        };
        Self {
            id,
            state,
            seating: Seating::seeded_from(prior.map(|game| &game.seating)),
            tuning,
        }
    }

    pub fn pong_state(&self) -> &PongGameState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn pong_state_mut(&mut self) -> &mut PongGameState {
        &mut self.state
    }

    fn side(seat: usize) -> PongSide {
        if seat == 0 { PongSide::Left } else { PongSide::Right }
    }
}

impl Game for PongGame {
    type Move = PongMove;

    const AREA_KIND: AreaKind = AreaKind::Pong;

    fn new(id: GameInstanceId, prior: Option<&Self>) -> Self {
        Self::with_tuning(id, prior, PongTuning::default())
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn status(&self) -> GameStatus {
        self.state.status
    }

    fn winner(&self) -> Option<&PlayerId> {
        self.state.winner.as_ref()
    }

    fn players(&self) -> &[PlayerId] {
        self.seating.players()
    }

    fn join(&mut self, player: &str) -> Result<(), GameError> {
        let seat = self.seating.join(&mut self.state, player)?;
        info!(game_id = %self.id, player, side = ?Self::side(seat), "pong player joined");
        Ok(())
    }

    fn start_game(&mut self, player: &str, rng: &mut dyn RandomSource) -> Result<(), GameError> {
        if self.seating.ready(&mut self.state, player)? {
            pong_physics::serve(&mut self.state, &self.tuning, rng);
            info!(game_id = %self.id, "pong game started");
        }
        Ok(())
    }

    fn apply_move(
        &mut self,
        player: &str,
        game_move: PongMove,
        _rng: &mut dyn RandomSource,
    ) -> Result<(), GameError> {
        let seat = self.seating.seat_in_progress(&self.state, player)?;
        match Self::side(seat) {
            PongSide::Left => self.state.left_paddle_direction = game_move.direction,
            PongSide::Right => self.state.right_paddle_direction = game_move.direction,
        }
        Ok(())
    }

    fn leave(&mut self, player: &str) -> Result<(), GameError> {
        if self.state.status == GameStatus::Over {
            return Ok(());
        }
        let seat = self.state.seat_of(player);
        self.seating.leave(&mut self.state, player)?;
        if let Some(seat) = seat {
            match Self::side(seat) {
                PongSide::Left => self.state.left_paddle_direction = PaddleDirection::Still,
                PongSide::Right => self.state.right_paddle_direction = PaddleDirection::Still,
            }
        }
        if self.state.status == GameStatus::Over {
            info!(game_id = %self.id, winner = ?self.state.winner, "pong game ended by leave");
        }
        Ok(())
    }

    fn supports_physics(&self) -> bool {
        true
    }

    fn update_physics(&mut self, rng: &mut dyn RandomSource) -> bool {
        if self.state.status != GameStatus::InProgress {
            return false;
        }

        let outcome = pong_physics::step(&mut self.state, &self.tuning, rng);
        if let Some(scorer) = outcome.scored {
            if self.state.score_of(scorer) >= self.tuning.winning_score {
                let seat = match scorer {
                    PongSide::Left => 0,
                    PongSide::Right => 1,
                };
                finish(&mut self.state, seat);
                info!(game_id = %self.id, winner = ?self.state.winner, "pong game won");
            }
        }
        true
    }

    fn state(&self) -> GameState {
        GameState::Pong(self.state.clone())
    }

    fn move_from_wire(game_move: GameMove) -> Option<PongMove> {
        match game_move {
            GameMove::Pong(pong_move) => Some(pong_move),
            GameMove::TargetShooter(_) => None,
        }
    }
}
