// Client-side mirror of a Target Shooter area.

use crate::domain::{CommandSender, ControllerError};
use crate::use_cases::events::{EventBus, SubscriptionId, track};
use crate::use_cases::game_area_controller::{AreaEvent, GameAreaController};
use std::sync::Arc;
use town_protocol::{
    Accuracy, AreaKind, AreaSnapshot, Difficulty, GameInstanceId, GameMove, GameResult,
    GameState, GameStatus, InteractableCommand, PlayerId, Point, ShooterSlot,
    TargetShooterGameState, TargetShooterMove,
};

#[derive(Debug, Clone, PartialEq)]
pub enum TargetShooterEvent {
    Area(AreaEvent),
    Player1Updated(Option<PlayerId>),
    Player2Updated(Option<PlayerId>),
    Player1ReadyUpdated(bool),
    Player2ReadyUpdated(bool),
    Player1ScoreUpdated(u32),
    Player2ScoreUpdated(u32),
    Player1AccuracyUpdated(Accuracy),
    Player2AccuracyUpdated(Accuracy),
    Player1CursorUpdated(Option<Point>),
    Player2CursorUpdated(Option<Point>),
    CurrentTargetUpdated(Point),
    TargetSizeUpdated(f32),
    DifficultyUpdated(Difficulty),
    StatusUpdated(GameStatus),
}

pub struct TargetShooterAreaController {
    area: GameAreaController,
    view: TargetShooterGameState,
    events: EventBus<TargetShooterEvent>,
}

impl TargetShooterAreaController {
    pub fn new(
        area_id: impl Into<String>,
        player_id: impl Into<PlayerId>,
        sender: Arc<dyn CommandSender>,
    ) -> Self {
        Self {
            area: GameAreaController::new(area_id, AreaKind::TargetShooter, player_id, sender),
            view: TargetShooterGameState::default(),
            events: EventBus::new(),
        }
    }

    pub fn area(&self) -> &GameAreaController {
        &self.area
    }

    pub fn on<F>(&mut self, handler: F) -> SubscriptionId
    where
        F: FnMut(&TargetShooterEvent) + Send + Sync + 'static,
    {
        self.events.on(handler)
    }

    pub fn off(&mut self, id: SubscriptionId) -> bool {
        self.events.off(id)
    }

    pub fn apply_snapshot(&mut self, snapshot: &AreaSnapshot) {
        if snapshot.id != self.area.area_id() {
            tracing::debug!(
                area_id = %self.area.area_id(),
                snapshot_id = %snapshot.id,
                "ignoring snapshot for another area"
            );
            return;
        }

        let mut pending: Vec<TargetShooterEvent> = self
            .area
            .apply_snapshot(snapshot)
            .into_iter()
            .map(TargetShooterEvent::Area)
            .collect();

        let next = match snapshot.game.as_ref().map(|game| &game.state) {
            Some(GameState::TargetShooter(state)) => state.clone(),
            Some(other) => {
                tracing::warn!(area_id = %snapshot.id, ?other, "non-shooter state in shooter area");
                TargetShooterGameState::default()
            }
            None => TargetShooterGameState::default(),
        };
        self.diff(&next, &mut pending);

        for event in &pending {
            self.events.emit(event);
        }
    }

    fn diff(&mut self, next: &TargetShooterGameState, out: &mut Vec<TargetShooterEvent>) {
        use TargetShooterEvent as E;
        let view = &mut self.view;
        track(&mut view.status, &next.status, E::StatusUpdated, out);
        track(&mut view.player1, &next.player1, E::Player1Updated, out);
        track(&mut view.player2, &next.player2, E::Player2Updated, out);
        track(&mut view.player1_ready, &next.player1_ready, E::Player1ReadyUpdated, out);
        track(&mut view.player2_ready, &next.player2_ready, E::Player2ReadyUpdated, out);
        track(&mut view.player1_score, &next.player1_score, E::Player1ScoreUpdated, out);
        track(&mut view.player2_score, &next.player2_score, E::Player2ScoreUpdated, out);
        track(&mut view.player1_accuracy, &next.player1_accuracy, E::Player1AccuracyUpdated, out);
        track(&mut view.player2_accuracy, &next.player2_accuracy, E::Player2AccuracyUpdated, out);
        track(&mut view.player1_cursor, &next.player1_cursor, E::Player1CursorUpdated, out);
        track(&mut view.player2_cursor, &next.player2_cursor, E::Player2CursorUpdated, out);
        track(&mut view.current_target, &next.current_target, E::CurrentTargetUpdated, out);
        track(&mut view.target_size, &next.target_size, E::TargetSizeUpdated, out);
        track(&mut view.difficulty, &next.difficulty, E::DifficultyUpdated, out);
        view.winner = next.winner.clone();
    }

    pub fn current_target(&self) -> Point {
        self.view.current_target
    }

    pub fn target_size(&self) -> f32 {
        self.view.target_size
    }

    pub fn difficulty(&self) -> Difficulty {
        self.view.difficulty
    }

    pub fn score(&self, slot: ShooterSlot) -> u32 {
        match slot {
            ShooterSlot::Player1 => self.view.player1_score,
            ShooterSlot::Player2 => self.view.player2_score,
        }
    }

    pub fn accuracy(&self, slot: ShooterSlot) -> Accuracy {
        match slot {
            ShooterSlot::Player1 => self.view.player1_accuracy,
            ShooterSlot::Player2 => self.view.player2_accuracy,
        }
    }

    pub fn cursor(&self, slot: ShooterSlot) -> Option<Point> {
        match slot {
            ShooterSlot::Player1 => self.view.player1_cursor,
            ShooterSlot::Player2 => self.view.player2_cursor,
        }
    }

    pub fn player1(&self) -> Option<&PlayerId> {
        self.area.known_occupant(self.view.player1.as_ref())
    }

    pub fn player2(&self) -> Option<&PlayerId> {
        self.area.known_occupant(self.view.player2.as_ref())
    }

    pub fn game_piece(&self) -> Result<ShooterSlot, ControllerError> {
        self.view
            .slot_of(self.area.player_id())
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

    /// Fires a shot at `position`.
    pub async fn make_move(&self, position: Point) -> Result<(), ControllerError> {
        let game_id = self.area.live_instance_id()?;
        let game_piece = self.game_piece()?;
        self.area
            .send(InteractableCommand::GameMove {
                game_id,
                game_move: GameMove::TargetShooter(TargetShooterMove {
                    game_piece,
                    position,
                }),
            })
            .await?;
        Ok(())
    }

    // The server only accepts this before the game starts.
    pub async fn change_difficulty(&self, difficulty: Difficulty) -> Result<(), ControllerError> {
        let game_id = self.area.any_instance_id()?;
        self.area
            .send(InteractableCommand::ChangeDifficulty {
                game_id,
                difficulty,
            })
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::use_cases::test_support::{FakeSender, drain, instance, recorder, snapshot};

    fn waiting() -> TargetShooterGameState {
        TargetShooterGameState {
            status: GameStatus::WaitingToStart,
            player1: Some("p1".to_string()),
            player2: Some("p2".to_string()),
            current_target: Point::new(250.0, 250.0),
            target_size: 40.0,
            ..TargetShooterGameState::default()
        }
    }

    fn model(state: TargetShooterGameState) -> AreaSnapshot {
        snapshot(
            "shooter-1",
            AreaKind::TargetShooter,
            &["p1", "p2"],
            Some(instance("g1", &["p1", "p2"], GameState::TargetShooter(state))),
        )
    }

    fn controller(player: &str, sender: Arc<FakeSender>) -> TargetShooterAreaController {
        TargetShooterAreaController::new("shooter-1", player, sender)
    }

    #[test]
    fn a_hit_reports_score_accuracy_and_target_changes() {
        let mut shooter = controller("p1", FakeSender::new());
        let mut state = TargetShooterGameState {
            status: GameStatus::InProgress,
            ..waiting()
        };
        shooter.apply_snapshot(&model(state.clone()));
        let (seen, handler) = recorder::<TargetShooterEvent>();
        shooter.on(handler);

        state.player1_score = 1;
        state.player1_accuracy = Accuracy { hits: 1, shots: 1 };
        state.player1_cursor = Some(Point::new(250.0, 250.0));
        state.current_target = Point::new(90.0, 310.0);
        shooter.apply_snapshot(&model(state));

        assert_eq!(
            drain(&seen),
            vec![
                TargetShooterEvent::Player1ScoreUpdated(1),
                TargetShooterEvent::Player1AccuracyUpdated(Accuracy { hits: 1, shots: 1 }),
                TargetShooterEvent::Player1CursorUpdated(Some(Point::new(250.0, 250.0))),
                TargetShooterEvent::CurrentTargetUpdated(Point::new(90.0, 310.0)),
            ]
        );
        assert_eq!(shooter.score(ShooterSlot::Player1), 1);
        assert_eq!(shooter.score(ShooterSlot::Player2), 0);
    }

    #[test]
    fn difficulty_change_alone_emits_one_event() {
        let mut shooter = controller("p1", FakeSender::new());
        shooter.apply_snapshot(&model(waiting()));
        let (seen, handler) = recorder::<TargetShooterEvent>();
        shooter.on(handler);

        shooter.apply_snapshot(&model(TargetShooterGameState {
            difficulty: Difficulty::Hard,
            ..waiting()
        }));

        assert_eq!(
            drain(&seen),
            vec![TargetShooterEvent::DifficultyUpdated(Difficulty::Hard)]
        );
        assert_eq!(shooter.difficulty(), Difficulty::Hard);
    }

    #[test]
    fn repeated_snapshot_emits_nothing() {
        let mut shooter = controller("p1", FakeSender::new());
        let (seen, handler) = recorder::<TargetShooterEvent>();
        shooter.on(handler);

        shooter.apply_snapshot(&model(waiting()));
        drain(&seen);
        shooter.apply_snapshot(&model(waiting()));

        assert!(drain(&seen).is_empty());
    }

    #[test]
    fn game_end_is_forwarded_from_the_area() {
        let mut shooter = controller("p1", FakeSender::new());
        let live = TargetShooterGameState {
            status: GameStatus::InProgress,
            ..waiting()
        };
        shooter.apply_snapshot(&model(live.clone()));
        let (seen, handler) = recorder::<TargetShooterEvent>();
        shooter.on(handler);

        shooter.apply_snapshot(&model(TargetShooterGameState {
            status: GameStatus::Over,
            winner: Some("p2".to_string()),
            ..live
        }));

        assert_eq!(
            drain(&seen),
            vec![
                TargetShooterEvent::Area(AreaEvent::GameEnd {
                    winner: Some("p2".to_string())
                }),
                TargetShooterEvent::StatusUpdated(GameStatus::Over),
            ]
        );
        assert_eq!(shooter.winner().map(String::as_str), Some("p2"));
    }

    #[tokio::test]
    async fn shots_carry_our_slot_and_position() {
        let sender = FakeSender::new();
        let mut shooter = controller("p2", Arc::clone(&sender));
        shooter.apply_snapshot(&model(TargetShooterGameState {
            status: GameStatus::InProgress,
            ..waiting()
        }));

        shooter
            .make_move(Point::new(10.0, 20.0))
            .await
            .expect("shot accepted");

        assert_eq!(
            sender.sent(),
            vec![(
                "shooter-1".to_string(),
                InteractableCommand::GameMove {
                    game_id: "g1".to_string(),
                    game_move: GameMove::TargetShooter(TargetShooterMove {
                        game_piece: ShooterSlot::Player2,
                        position: Point::new(10.0, 20.0),
                    }),
                }
            )]
        );
    }

    #[tokio::test]
    async fn shots_before_start_fail_locally() {
        let sender = FakeSender::new();
        let mut shooter = controller("p1", Arc::clone(&sender));
        shooter.apply_snapshot(&model(waiting()));

        assert_eq!(
            shooter.make_move(Point::new(1.0, 1.0)).await,
            Err(ControllerError::NoGameInProgress)
        );
        assert!(sender.sent().is_empty());
    }

    #[tokio::test]
    async fn change_difficulty_forwards_server_rejection() {
        let sender = FakeSender::new();
        let mut shooter = controller("p1", Arc::clone(&sender));

        assert_eq!(
            shooter.change_difficulty(Difficulty::Easy).await,
            Err(ControllerError::NoGameInProgress)
        );

        shooter.apply_snapshot(&model(waiting()));
        sender.reply_with(Err(ControllerError::Remote(
            "invalid command: difficulty is locked once the game starts".to_string(),
        )));

        assert!(matches!(
            shooter.change_difficulty(Difficulty::Easy).await,
            Err(ControllerError::Remote(_))
        ));
        assert_eq!(
            sender.sent(),
            vec![(
                "shooter-1".to_string(),
                InteractableCommand::ChangeDifficulty {
                    game_id: "g1".to_string(),
                    difficulty: Difficulty::Easy,
                }
            )]
        );
    }
}
