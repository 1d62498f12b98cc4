use super::Game;
use super::seats::{Seating, finish};
use crate::domain::errors::GameError;
use crate::domain::ports::RandomSource;
use crate::domain::tuning::target_shooter::TargetShooterTuning;
use town_protocol::{
    AreaKind, Difficulty, GameInstanceId, GameMove, GameState, GameStatus, PlayerId, Point,
    TargetShooterGameState, TargetShooterMove,
};
use tracing::{debug, info};

/// Two players race to hit a shared target; each hit moves the target.
pub struct TargetShooterGame {
    id: GameInstanceId,
    state: TargetShooterGameState,
    seating: Seating,
    tuning: TargetShooterTuning,
}

impl TargetShooterGame {
    pub fn with_tuning(
        id: GameInstanceId,
        prior: Option<&Self>,
        tuning: TargetShooterTuning,
    ) -> Self {
        // Difficulty carries over so a rematch keeps the agreed setting.
        let difficulty = prior
            .map(|game| game.state.difficulty)
            .unwrap_or_default();
        let state = TargetShooterGameState {
            difficulty,
            target_size: tuning.target_size(difficulty),
            current_target: Point::new(tuning.field_width / 2.0, tuning.field_height / 2.0),
            ..TargetShooterGameState::default()
        };
        Self {
            id,
            state,
            seating: Seating::seeded_from(prior.map(|game| &game.seating)),
            tuning,
        }
    }

    pub fn shooter_state(&self) -> &TargetShooterGameState {
        &self.state
    }

    #[cfg(test)]
    pub(crate) fn shooter_state_mut(&mut self) -> &mut TargetShooterGameState {
        &mut self.state
    }

    fn is_hit(&self, position: &Point) -> bool {
        position.distance(&self.state.current_target) < self.state.target_size / 2.0
    }

    // Uniform position that keeps the whole target on the field and differs from the current one.
    fn relocate_target(&mut self, rng: &mut dyn RandomSource) {
        let radius = self.state.target_size / 2.0;
        let (max_x, max_y) = (
            self.tuning.field_width - radius,
            self.tuning.field_height - radius,
        );
        let mut next = Point::new(rng.range(radius, max_x), rng.range(radius, max_y));
        if next == self.state.current_target {
            next = Point::new(radius + max_x - next.x, radius + max_y - next.y);
        }
        if next == self.state.current_target {
            next.x = if next.x + radius <= max_x {
                next.x + radius
            } else {
                next.x - radius
            };
        }
        self.state.current_target = next;
    }
}

impl Game for TargetShooterGame {
    type Move = TargetShooterMove;

    const AREA_KIND: AreaKind = AreaKind::TargetShooter;

    fn new(id: GameInstanceId, prior: Option<&Self>) -> Self {
        Self::with_tuning(id, prior, TargetShooterTuning::default())
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
        info!(game_id = %self.id, player, seat = seat + 1, "target shooter player joined");
        Ok(())
    }

    fn start_game(&mut self, player: &str, rng: &mut dyn RandomSource) -> Result<(), GameError> {
        if self.seating.ready(&mut self.state, player)? {
            self.relocate_target(rng);
            info!(game_id = %self.id, "target shooter game started");
        }
        Ok(())
    }

    fn apply_move(
        &mut self,
        player: &str,
        game_move: TargetShooterMove,
        rng: &mut dyn RandomSource,
    ) -> Result<(), GameError> {
        let seat = self.seating.seat_in_progress(&self.state, player)?;
        let hit = self.is_hit(&game_move.position);

        let (score, accuracy, cursor) = if seat == 0 {
            (
                &mut self.state.player1_score,
                &mut self.state.player1_accuracy,
                &mut self.state.player1_cursor,
            )
        } else {
            (
                &mut self.state.player2_score,
                &mut self.state.player2_accuracy,
                &mut self.state.player2_cursor,
            )
        };
        *cursor = Some(game_move.position);
        accuracy.shots += 1;
        if !hit {
            return Ok(());
        }

        accuracy.hits += 1;
        *score = (*score + 1).min(self.tuning.max_score);
        let reached = *score >= self.tuning.winning_score;
        debug!(game_id = %self.id, player, score = *score, "target hit");

        if reached {
            finish(&mut self.state, seat);
            info!(game_id = %self.id, winner = ?self.state.winner, "target shooter game won");
        } else {
            self.relocate_target(rng);
        }
        Ok(())
    }

    fn leave(&mut self, player: &str) -> Result<(), GameError> {
        self.seating.leave(&mut self.state, player)?;
        if self.state.status == GameStatus::Over {
            info!(game_id = %self.id, winner = ?self.state.winner, "target shooter game over");
        }
        Ok(())
    }

    fn change_difficulty(&mut self, player: &str, difficulty: Difficulty) -> Result<(), GameError> {
        if !matches!(
            self.state.status,
            GameStatus::WaitingForPlayers | GameStatus::WaitingToStart
        ) {
            return Err(GameError::InvalidCommand(
                "difficulty can only change before the game starts",
            ));
        }
        if self.state.player1.as_deref() != Some(player)
            && self.state.player2.as_deref() != Some(player)
        {
            return Err(GameError::PlayerNotInGame);
        }

        self.state.difficulty = difficulty;
        self.state.target_size = self.tuning.target_size(difficulty);
        Ok(())
    }

    fn state(&self) -> GameState {
        GameState::TargetShooter(self.state.clone())
    }

    fn move_from_wire(game_move: GameMove) -> Option<TargetShooterMove> {
        match game_move {
            GameMove::TargetShooter(shot) => Some(shot),
            GameMove::Pong(_) => None,
        }
    }
}
