// Game area: command surface and match history around one hosted game.

use crate::domain::{AreaEmitter, Game, GameError, PlayerRegistry, RandomSource};
use std::collections::BTreeMap;
use std::sync::Arc;
use town_protocol::{
    AreaSnapshot, CommandPayload, GameResult, GameStatus, InteractableCommand, PlayerId,
};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// An area hosting at most one live instance of `G` plus the results of past instances.
///
/// All mutation happens through `&mut self`; the owning area task is the only writer.
pub struct GameArea<G: Game> {
    id: String,
    occupants: Vec<PlayerId>,
    game: Option<G>,
    history: Vec<GameResult>,
    physics_running: bool,
    rng: Box<dyn RandomSource>,
    players: Arc<dyn PlayerRegistry>,
    emitter: Arc<dyn AreaEmitter>,
}

impl<G: Game> GameArea<G> {
    pub fn new(
        id: impl Into<String>,
        rng: Box<dyn RandomSource>,
        players: Arc<dyn PlayerRegistry>,
        emitter: Arc<dyn AreaEmitter>,
    ) -> Self {
        Self {
            id: id.into(),
            occupants: Vec::new(),
            game: None,
            history: Vec::new(),
            physics_running: false,
            rng,
            players,
            emitter,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn game(&self) -> Option<&G> {
        self.game.as_ref()
    }

    pub fn history(&self) -> &[GameResult] {
        &self.history
    }

    pub fn physics_running(&self) -> bool {
        self.physics_running
    }

    /// Runs one interactable command for `player`.
    ///
    /// On error nothing visible changes and no snapshot is emitted.
    pub fn handle_command(
        &mut self,
        player: &str,
        command: InteractableCommand,
    ) -> Result<Option<CommandPayload>, GameError> {
        let command_name = command.name();
        let participants = self.participants();

        let payload = match command {
            InteractableCommand::JoinGame => {
                let game_id = self.join_game(player)?;
                Some(CommandPayload::JoinGame { game_id })
            }
            InteractableCommand::StartGame { game_id } => {
                live_game(&mut self.game, &game_id)?.start_game(player, self.rng.as_mut())?;
                None
            }
            InteractableCommand::GameMove { game_id, game_move } => {
                let game = live_game(&mut self.game, &game_id)?;
                let game_move = G::move_from_wire(game_move)
                    .ok_or(GameError::InvalidCommand("move does not match this game"))?;
                game.apply_move(player, game_move, self.rng.as_mut())?;
                None
            }
            InteractableCommand::LeaveGame { game_id } => {
                live_game(&mut self.game, &game_id)?.leave(player)?;
                None
            }
            InteractableCommand::StartUpdatePhysics { game_id } => {
                let game = live_game(&mut self.game, &game_id)?;
                if !game.supports_physics() {
                    return Err(GameError::InvalidCommand("game has no physics"));
                }
                self.physics_running = true;
                None
            }
            InteractableCommand::StopUpdatePhysics { game_id } => {
                let game = live_game(&mut self.game, &game_id)?;
                if !game.supports_physics() {
                    return Err(GameError::InvalidCommand("game has no physics"));
                }
                self.physics_running = false;
                None
            }
            InteractableCommand::ChangeDifficulty {
                game_id,
                difficulty,
            } => {
                live_game(&mut self.game, &game_id)?.change_difficulty(player, difficulty)?;
                None
            }
            InteractableCommand::TicketBoothPurchase { .. }
            | InteractableCommand::TicketBoothEquip { .. }
            | InteractableCommand::AddToken { .. } => {
                return Err(GameError::InvalidCommand("economy commands need a ticket booth"));
            }
        };

        debug!(area_id = %self.id, player, command = command_name, "command applied");
        self.record_if_over(&participants);
        self.emit();
        Ok(payload)
    }

    /// Adds `player` to the area occupants. Returns false if already present.
    pub fn add_occupant(&mut self, player: &str) -> bool {
        if self.occupants.iter().any(|occupant| occupant == player) {
            return false;
        }
        self.occupants.push(player.to_string());
        self.emit();
        true
    }

    /// Removes `player`, leaving any game they are seated in first.
    pub fn remove_occupant(&mut self, player: &str) -> bool {
        let participants = self.participants();
        let seated = participants.iter().any(|seated| seated == player)
            && self
                .game
                .as_ref()
                .is_some_and(|game| game.status() != GameStatus::Over);
        if seated {
            if let Some(game) = self.game.as_mut() {
                if let Err(err) = game.leave(player) {
                    warn!(area_id = %self.id, player_id = player, error = %err, "leave on exit failed");
                }
            }
            self.record_if_over(&participants);
        }

        let before = self.occupants.len();
        self.occupants.retain(|occupant| occupant != player);
        let changed = seated || self.occupants.len() != before;
        if changed {
            self.emit();
        }
        changed
    }

    /// One physics step for the live instance. Returns true when state changed.
    pub fn tick(&mut self) -> bool {
        if !self.physics_running {
            return false;
        }
        let participants = self.participants();
        let Some(game) = self.game.as_mut() else {
            self.physics_running = false;
            return false;
        };

        let changed = game.update_physics(self.rng.as_mut());
        if game.status() == GameStatus::Over {
            self.physics_running = false;
        }
        if changed {
            self.record_if_over(&participants);
            self.emit();
        }
        changed
    }

    pub fn to_snapshot(&self) -> AreaSnapshot {
        let game = self.game.as_ref().map(|game| {
            let mut model = game.to_model();
            model.result = self
                .history
                .iter()
                .find(|result| result.game_id == model.id)
                .map(|result| result.scores.clone());
            model
        });
        AreaSnapshot {
            id: self.id.clone(),
            kind: G::AREA_KIND,
            occupants: self.occupants.clone(),
            game,
            history: self.history.clone(),
        }
    }

    fn join_game(&mut self, player: &str) -> Result<String, GameError> {
        match self.game.as_mut() {
            Some(game) if game.status() != GameStatus::Over => {
                game.join(player)?;
                Ok(game.id().to_string())
            }
            _ => {
                let mut fresh = G::new(Uuid::new_v4().to_string(), self.game.as_ref());
                fresh.join(player)?;
                let game_id = fresh.id().to_string();
                info!(area_id = %self.id, game_id = %game_id, "new game instance");
                self.game = Some(fresh);
                self.physics_running = false;
                Ok(game_id)
            }
        }
    }

    // Seated players of the live instance before a mutation; leavers drop out of `players()`.
    fn participants(&self) -> Vec<PlayerId> {
        self.game
            .as_ref()
            .map(|game| game.players().to_vec())
            .unwrap_or_default()
    }

    fn record_if_over(&mut self, before: &[PlayerId]) {
        let Some(game) = self.game.as_ref() else {
            return;
        };
        if game.status() != GameStatus::Over
            || self.history.iter().any(|result| result.game_id == game.id())
        {
            return;
        }

        let mut participants = before.to_vec();
        for player in game.players() {
            if !participants.contains(player) {
                participants.push(player.clone());
            }
        }

        let winner = game.winner();
        let scores: BTreeMap<String, u32> = participants
            .iter()
            .map(|player| {
                let name = self
                    .players
                    .display_name(player)
                    .unwrap_or_else(|| player.clone());
                let score = u32::from(winner == Some(player));
                (name, score)
            })
            .collect();

        info!(area_id = %self.id, game_id = %game.id(), ?scores, "game result recorded");
        self.history.push(GameResult {
            game_id: game.id().to_string(),
            scores,
        });
    }

    fn emit(&self) {
        self.emitter.area_changed(self.to_snapshot());
    }
}

/// Resolves the live instance a command addresses.
fn live_game<'a, G: Game>(game: &'a mut Option<G>, game_id: &str) -> Result<&'a mut G, GameError> {
    let game = game.as_mut().ok_or(GameError::GameNotInProgress)?;
    if game.id() != game_id {
        return Err(GameError::GameIdMismatch);
    }
    Ok(game)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::test_support::{RecordingEmitter, SequenceRandom, StaticPlayers};
    use crate::domain::{PongGame, TargetShooterGame};
    use town_protocol::{
        Difficulty, GameMove, GameState, PaddleDirection, Point, PongMove, PongSide,
    };

    fn pong_area() -> (GameArea<PongGame>, RecordingEmitter) {
        let emitter = RecordingEmitter::default();
        let players = StaticPlayers::with(&[("a", "Ada"), ("b", "Bob")]);
        let area = GameArea::new(
            "pong-1",
            Box::new(SequenceRandom::centred()),
            Arc::new(players),
            Arc::new(emitter.clone()),
        );
        (area, emitter)
    }

    fn join(area: &mut GameArea<PongGame>, player: &str) -> String {
        match area.handle_command(player, InteractableCommand::JoinGame) {
            Ok(Some(CommandPayload::JoinGame { game_id })) => game_id,
            other => panic!("unexpected join reply: {other:?}"),
        }
    }

    fn running_pong() -> (GameArea<PongGame>, RecordingEmitter, String) {
        let (mut area, emitter) = pong_area();
        let game_id = join(&mut area, "a");
        join(&mut area, "b");
        for player in ["a", "b"] {
            area.handle_command(
                player,
                InteractableCommand::StartGame {
                    game_id: game_id.clone(),
                },
            )
            .expect("start");
        }
        (area, emitter, game_id)
    }

    #[test]
    fn join_creates_an_instance_and_notifies() {
        let (mut area, emitter) = pong_area();

        let game_id = join(&mut area, "a");
        let second = join(&mut area, "b");

        assert_eq!(game_id, second);
        assert_eq!(emitter.count(), 2);
        let snapshot = emitter.last().expect("snapshot");
        let game = snapshot.game.expect("game in snapshot");
        assert_eq!(game.players, vec!["a".to_string(), "b".to_string()]);
        assert_eq!(game.state.status(), GameStatus::WaitingToStart);
    }

    #[test]
    fn commands_without_an_instance_report_not_in_progress() {
        let (mut area, emitter) = pong_area();

        let result = area.handle_command(
            "a",
            InteractableCommand::StartGame {
                game_id: "missing".to_string(),
            },
        );

        assert_eq!(result, Err(GameError::GameNotInProgress));
        assert_eq!(emitter.count(), 0);
    }

    #[test]
    fn wrong_instance_id_is_a_mismatch() {
        let (mut area, emitter) = pong_area();
        join(&mut area, "a");
        let emitted = emitter.count();

        let result = area.handle_command(
            "a",
            InteractableCommand::LeaveGame {
                game_id: "other".to_string(),
            },
        );

        assert_eq!(result, Err(GameError::GameIdMismatch));
        assert_eq!(emitter.count(), emitted);
    }

    #[test]
    fn failed_game_commands_do_not_notify() {
        let (mut area, emitter) = pong_area();
        join(&mut area, "a");
        let emitted = emitter.count();

        assert_eq!(
            area.handle_command("a", InteractableCommand::JoinGame),
            Err(GameError::PlayerAlreadyInGame)
        );
        assert_eq!(emitter.count(), emitted);
    }

    #[test]
    fn leaving_a_running_game_records_the_result_once() {
        let (mut area, emitter, game_id) = running_pong();

        area.handle_command(
            "a",
            InteractableCommand::LeaveGame {
                game_id: game_id.clone(),
            },
        )
        .expect("leave");
        area.handle_command("b", InteractableCommand::LeaveGame { game_id })
            .expect("leaving a finished game is a no-op");

        assert_eq!(area.history().len(), 1);
        let scores = &area.history()[0].scores;
        assert_eq!(scores.get("Ada"), Some(&0));
        assert_eq!(scores.get("Bob"), Some(&1));

        let snapshot = emitter.last().expect("snapshot");
        let game = snapshot.game.expect("game");
        assert_eq!(game.result.as_ref(), Some(scores));
    }

    #[test]
    fn join_after_game_over_starts_a_new_instance() {
        let (mut area, _emitter, game_id) = running_pong();
        area.handle_command(
            "b",
            InteractableCommand::LeaveGame {
                game_id: game_id.clone(),
            },
        )
        .expect("leave");

        let next = join(&mut area, "b");

        assert_ne!(next, game_id);
        let game = area.game().expect("game");
        assert_eq!(game.status(), GameStatus::WaitingForPlayers);
        // "b" played on the right before and keeps that side.
        assert_eq!(game.pong_state().right_player.as_deref(), Some("b"));
    }

    #[test]
    fn moves_are_routed_to_the_seated_player() {
        let (mut area, _emitter, game_id) = running_pong();

        area.handle_command(
            "b",
            InteractableCommand::GameMove {
                game_id,
                game_move: GameMove::Pong(PongMove {
                    game_piece: PongSide::Left,
                    direction: PaddleDirection::Down,
                }),
            },
        )
        .expect("move");

        let state = area.game().expect("game").pong_state();
        assert_eq!(state.right_paddle_direction, PaddleDirection::Down);
    }

    #[test]
    fn physics_runs_only_after_start_update_physics() {
        let (mut area, _emitter, game_id) = running_pong();
        assert!(!area.tick());

        area.handle_command(
            "a",
            InteractableCommand::StartUpdatePhysics {
                game_id: game_id.clone(),
            },
        )
        .expect("start physics");
        assert!(area.tick());

        area.handle_command("a", InteractableCommand::StopUpdatePhysics { game_id })
            .expect("stop physics");
        assert!(!area.physics_running());
        assert!(!area.tick());
    }

    #[test]
    fn physics_stops_once_the_game_is_over() {
        let (mut area, _emitter, game_id) = running_pong();
        area.handle_command("a", InteractableCommand::StartUpdatePhysics { game_id })
            .expect("start physics");
        area.remove_occupant("a");

        assert!(!area.tick());
        assert!(!area.physics_running());
    }

    #[test]
    fn target_shooter_has_no_physics() {
        let mut area: GameArea<TargetShooterGame> = GameArea::new(
            "ts-1",
            Box::new(SequenceRandom::centred()),
            Arc::new(StaticPlayers::default()),
            Arc::new(RecordingEmitter::default()),
        );
        let game_id = match area.handle_command("a", InteractableCommand::JoinGame) {
            Ok(Some(CommandPayload::JoinGame { game_id })) => game_id,
            other => panic!("unexpected join reply: {other:?}"),
        };

        assert!(matches!(
            area.handle_command("a", InteractableCommand::StartUpdatePhysics { game_id: game_id.clone() }),
            Err(GameError::InvalidCommand(_))
        ));

        area.handle_command(
            "a",
            InteractableCommand::ChangeDifficulty {
                game_id,
                difficulty: Difficulty::Hard,
            },
        )
        .expect("difficulty");
        let snapshot = area.to_snapshot();
        match snapshot.game.map(|game| game.state) {
            Some(GameState::TargetShooter(state)) => assert_eq!(state.difficulty, Difficulty::Hard),
            other => panic!("unexpected state: {other:?}"),
        }
    }

    #[test]
    fn economy_commands_are_rejected() {
        let (mut area, emitter) = pong_area();
        let result = area.handle_command("a", InteractableCommand::AddToken { amount: 3 });
        assert!(matches!(result, Err(GameError::InvalidCommand(_))));
        assert_eq!(emitter.count(), 0);
    }

    #[test]
    fn unknown_display_names_fall_back_to_the_id() {
        let emitter = RecordingEmitter::default();
        let mut area: GameArea<PongGame> = GameArea::new(
            "pong-2",
            Box::new(SequenceRandom::centred()),
            Arc::new(StaticPlayers::with(&[("a", "Ada")])),
            Arc::new(emitter),
        );
        let game_id = join(&mut area, "a");
        join(&mut area, "z");
        for player in ["a", "z"] {
            area.handle_command(player, InteractableCommand::StartGame { game_id: game_id.clone() })
                .expect("start");
        }

        area.remove_occupant("a");

        let scores = &area.history()[0].scores;
        assert_eq!(scores.get("z"), Some(&1));
        assert_eq!(scores.get("Ada"), Some(&0));
    }

    #[test]
    fn exiting_while_seated_in_a_waiting_game_frees_the_seat() {
        let (mut area, _emitter) = pong_area();
        for player in ["a", "b"] {
            area.add_occupant(player);
            join(&mut area, player);
        }

        assert!(area.remove_occupant("a"));

        let game = area.game().expect("game");
        assert_eq!(game.status(), GameStatus::WaitingForPlayers);
        assert_eq!(game.pong_state().left_player, None);
        assert_eq!(game.pong_state().right_player.as_deref(), Some("b"));
        assert!(area.history().is_empty());
        assert_eq!(area.to_snapshot().occupants, vec!["b".to_string()]);
    }

    #[test]
    fn occupancy_changes_are_emitted_once() {
        let (mut area, emitter) = pong_area();

        assert!(area.add_occupant("a"));
        assert!(!area.add_occupant("a"));
        assert!(area.remove_occupant("a"));
        assert!(!area.remove_occupant("a"));

        assert_eq!(emitter.count(), 2);
        assert!(area.to_snapshot().occupants.is_empty());
    }

    #[test]
    fn snapshot_carries_kind_and_ball_state() {
        let (area, _emitter, _game_id) = running_pong();
        let snapshot = area.to_snapshot();

        assert_eq!(snapshot.kind, town_protocol::AreaKind::Pong);
        match snapshot.game.map(|game| game.state) {
            Some(GameState::Pong(state)) => {
                assert_eq!(state.ball_position, Point::new(300.0, 200.0));
            }
            other => panic!("unexpected state: {other:?}"),
        }
    }
}
