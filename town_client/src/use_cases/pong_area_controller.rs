// Client-side mirror of a Pong area.

use crate::domain::{CommandSender, ControllerError};
use crate::use_cases::events::{EventBus, SubscriptionId, track};
use crate::use_cases::game_area_controller::{AreaEvent, GameAreaController};
use std::sync::Arc;
use town_protocol::{
    AreaKind, AreaSnapshot, GameInstanceId, GameMove, GameResult, GameState, GameStatus,
    InteractableCommand, PaddleDirection, PlayerId, Point, PongGameState, PongMove, PongSide,
};

#[derive(Debug, Clone, PartialEq)]
pub enum PongEvent {
    Area(AreaEvent),
    LeftPlayerUpdated(Option<PlayerId>),
    RightPlayerUpdated(Option<PlayerId>),
    LeftReadyUpdated(bool),
    RightReadyUpdated(bool),
    LeftPaddleUpdated(Point),
    RightPaddleUpdated(Point),
    LeftPaddleDirectionUpdated(PaddleDirection),
    RightPaddleDirectionUpdated(PaddleDirection),
    LeftScoreUpdated(u32),
    RightScoreUpdated(u32),
    BallPositionUpdated(Point),
    BallVelocityUpdated(Point),
    StatusUpdated(GameStatus),
}

pub struct PongAreaController {
    area: GameAreaController,
    view: PongGameState,
    events: EventBus<PongEvent>,
}

impl PongAreaController {
    pub fn new(
        area_id: impl Into<String>,
        player_id: impl Into<PlayerId>,
        sender: Arc<dyn CommandSender>,
    ) -> Self {
        Self {
            area: GameAreaController::new(area_id, AreaKind::Pong, player_id, sender),
            view: PongGameState::default(),
            events: EventBus::new(),
        }
    }

    pub fn area(&self) -> &GameAreaController {
        &self.area
    }

    pub fn on<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&PongEvent) + Send + Sync + 'static,
    {
        self.events.on(handler)
    }

    pub fn off(&mut self, id: SubscriptionId) -> bool {
        self.events.off(id)
    }

    /// Mirrors `snapshot` and emits one event per genuinely changed field.
    pub fn apply_snapshot(&mut self, snapshot: &AreaSnapshot) {
        if snapshot.id != self.area.area_id() {
            tracing::debug!(
                area_id = %self.area.area_id(),
                snapshot_id = %snapshot.id,
                "ignoring snapshot for another area"
            );
            return;
        }

        let mut pending: Vec<PongEvent> = self
            .area
            .apply_snapshot(snapshot)
            .into_iter()
            .map(PongEvent::Area)
            .collect();

        let next = match snapshot.game.as_ref().map(|game| &game.state) {
            Some(GameState::Pong(state)) => state.clone(),
            Some(other) => {
                tracing::warn!(area_id = %snapshot.id, ?other, "non-pong state in pong area");
                PongGameState::default()
            }
            None => PongGameState::default(),
        };
        self.diff(&next, &mut pending);

        for event in &pending {
            self.events.emit(event);
        }
    }

    fn diff(&mut self, next: &PongGameState, out: &mut Vec<PongEvent>) {
        let view = &mut self.view;
        track(&mut view.status, &next.status, PongEvent::StatusUpdated, out);
        track(&mut view.left_player, &next.left_player, PongEvent::LeftPlayerUpdated, out);
        track(&mut view.right_player, &next.right_player, PongEvent::RightPlayerUpdated, out);
        track(&mut view.left_ready, &next.left_ready, PongEvent::LeftReadyUpdated, out);
        track(&mut view.right_ready, &next.right_ready, PongEvent::RightReadyUpdated, out);
        track(&mut view.left_paddle, &next.left_paddle, PongEvent::LeftPaddleUpdated, out);
        track(&mut view.right_paddle, &next.right_paddle, PongEvent::RightPaddleUpdated, out);
        track(
            &mut view.left_paddle_direction,
            &next.left_paddle_direction,
            PongEvent::LeftPaddleDirectionUpdated,
            out,
        );
        track(
            &mut view.right_paddle_direction,
            &next.right_paddle_direction,
            PongEvent::RightPaddleDirectionUpdated,
            out,
        );
        track(&mut view.left_score, &next.left_score, PongEvent::LeftScoreUpdated, out);
        track(&mut view.right_score, &next.right_score, PongEvent::RightScoreUpdated, out);
        track(&mut view.ball_position, &next.ball_position, PongEvent::BallPositionUpdated, out);
        track(&mut view.ball_velocity, &next.ball_velocity, PongEvent::BallVelocityUpdated, out);
        // The winner is reported through the area's GameEnd event.
        view.winner = next.winner.clone();
    }

    pub fn left_paddle(&self) -> Point {
        self.view.left_paddle
    }

    pub fn right_paddle(&self) -> Point {
        self.view.right_paddle
    }

    pub fn ball_position(&self) -> Point {
        self.view.ball_position
    }

    pub fn ball_velocity(&self) -> Point {
        self.view.ball_velocity
    }

    pub fn score(&self, side: PongSide) -> u32 {
        self.view.score_of(side)
    }

    pub fn left_player(&self) -> Option<&PlayerId> {
        self.area.known_occupant(self.view.left_player.as_ref())
    }

    pub fn right_player(&self) -> Option<&PlayerId> {
        self.area.known_occupant(self.view.right_player.as_ref())
    }

    /// Side our player is seated on.
    pub fn game_piece(&self) -> Result<PongSide, ControllerError> {
        self.view
            .side_of(self.area.player_id())
            .ok_or(ControllerError::PlayerNotInGame)
    }

    pub fn status(&self) -> GameStatus {
        self.area.status()
    }

    pub fn is_active(&self) -> bool {
        self.area.is_active()
    }

    pub fn is_player(&self) -> bool {
        self.area.is_player()
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        self.area.winner()
    }

    pub fn history(&self) -> &[GameResult] {
        self.area.history()
    }

    pub fn instance_id(&self) -> Option<&str> {
        self.area.instance_id()
    }

    pub async fn join_game(&self) -> Result<GameInstanceId, ControllerError> {
        self.area.join_game().await
    }

    pub async fn start_game(&self) -> Result<(), ControllerError> {
        self.area.start_game().await
    }

    pub async fn leave_game(&self) -> Result<(), ControllerError> {
        self.area.leave_game().await
    }

    pub async fn make_move(&self, direction: PaddleDirection) -> Result<(), ControllerError> {
        let game_id = self.area.live_instance_id()?;
        let game_piece = self.game_piece()?;
        self.area
            .send(InteractableCommand::GameMove {
                game_id,
                game_move: GameMove::Pong(PongMove {
                    game_piece,
                    direction,
                }),
            })
            .await?;
        Ok(())
    }

    pub async fn start_physics(&self) -> Result<(), ControllerError> {
        let game_id = self.area.any_instance_id()?;
        self.area
            .send(InteractableCommand::StartUpdatePhysics { game_id })
            .await?;
        Ok(())
    }

    pub async fn stop_physics(&self) -> Result<(), ControllerError> {
        let game_id = self.area.any_instance_id()?;
        self.area
            .send(InteractableCommand::StopUpdatePhysics { game_id })
            .await?;
        Ok(())
    }
}
