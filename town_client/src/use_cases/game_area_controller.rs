// Shared client-side mirror of a game area.

use crate::domain::{CommandSender, ControllerError};
use std::sync::Arc;
use town_protocol::{
    AreaKind, AreaSnapshot, CommandPayload, GameInstance, GameInstanceId, GameResult,
    GameState, GameStatus, InteractableCommand, PlayerId,
};

/// Changes every game area reports, whatever game it hosts.
#[derive(Debug, Clone, PartialEq)]
pub enum AreaEvent {
    OccupantsChanged(Vec<PlayerId>),
    HistoryUpdated(Vec<GameResult>),
    /// A different instance (or none) is now live in the area.
    GameUpdated(Option<GameInstanceId>),
    /// The live instance just reached `OVER`.
    GameEnd { winner: Option<PlayerId> },
}

/// Last known state of one game area plus the commands every game shares.
///
/// Concrete controllers wrap this and add their own tracked fields.
pub struct GameAreaController {
    area_id: String,
    kind: AreaKind,
    player_id: PlayerId,
    occupants: Vec<PlayerId>,
    game: Option<GameInstance>,
    history: Vec<GameResult>,
    sender: Arc<dyn CommandSender>,
}

impl GameAreaController {
    pub fn new(
        area_id: impl Into<String>,
        kind: AreaKind,
        player_id: impl Into<PlayerId>,
        sender: Arc<dyn CommandSender>,
    ) -> Self {
        Self {
            area_id: area_id.into(),
            kind,
            player_id: player_id.into(),
            occupants: Vec::new(),
            game: None,
            history: Vec::new(),
            sender,
        }
    }

    pub fn area_id(&self) -> &str {
        &self.area_id
    }

    pub fn kind(&self) -> AreaKind {
        self.kind
    }

    /// The player this controller acts for.
    pub fn player_id(&self) -> &str {
        &self.player_id
    }

    pub fn occupants(&self) -> &[PlayerId] {
        &self.occupants
    }

    pub fn is_occupant(&self, player_id: &str) -> bool {
        self.occupants.iter().any(|id| id == player_id)
    }

    pub fn game(&self) -> Option<&GameInstance> {
        self.game.as_ref()
    }

    pub fn game_state(&self) -> Option<&GameState> {
        self.game.as_ref().map(|game| &game.state)
    }

    pub fn instance_id(&self) -> Option<&str> {
        self.game.as_ref().map(|game| game.id.as_str())
    }

    pub fn history(&self) -> &[GameResult] {
        &self.history
    }

    pub fn status(&self) -> GameStatus {
        self.game_state()
            .map(GameState::status)
            .unwrap_or(GameStatus::WaitingForPlayers)
    }

    pub fn is_active(&self) -> bool {
        self.status() == GameStatus::InProgress
    }

    pub fn is_player(&self) -> bool {
        self.game
            .as_ref()
            .is_some_and(|game| game.players.iter().any(|id| *id == self.player_id))
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        self.game_state().and_then(GameState::winner)
    }

    // Slot lookups only resolve players this area currently knows about.
    pub(crate) fn known_occupant<'a>(&self, player: Option<&'a PlayerId>) -> Option<&'a PlayerId> {
        player.filter(|id| self.is_occupant(id))
    }

    /// Replaces the cached area state and returns what changed.
    pub(crate) fn apply_snapshot(&mut self, snapshot: &AreaSnapshot) -> Vec<AreaEvent> {
        let mut events = Vec::new();

        if self.occupants != snapshot.occupants {
            events.push(AreaEvent::OccupantsChanged(snapshot.occupants.clone()));
        }
        if self.history != snapshot.history {
            events.push(AreaEvent::HistoryUpdated(snapshot.history.clone()));
        }

        let previous_id = self.instance_id().map(str::to_string);
        let previous_status = self.status();
        let next_id = snapshot.game.as_ref().map(|game| game.id.clone());

        if previous_id != next_id {
            events.push(AreaEvent::GameUpdated(next_id.clone()));
        } else if let Some(game) = snapshot.game.as_ref() {
            // Only a transition of the same instance counts as an ending.
            if previous_status != GameStatus::Over && game.state.status() == GameStatus::Over {
                events.push(AreaEvent::GameEnd {
                    winner: game.state.winner().cloned(),
                });
            }
        }

        self.occupants = snapshot.occupants.clone();
        self.history = snapshot.history.clone();
        self.game = snapshot.game.clone();

        events
    }

    pub(crate) async fn send(
        &self,
        command: InteractableCommand,
    ) -> Result<Option<CommandPayload>, ControllerError> {
        tracing::debug!(area_id = %self.area_id, command = command.name(), "sending command");
        self.sender.send_command(&self.area_id, command).await
    }

    pub(crate) fn live_instance_id(&self) -> Result<GameInstanceId, ControllerError> {
        match self.game.as_ref() {
            Some(game) if game.state.status() == GameStatus::InProgress => Ok(game.id.clone()),
            _ => Err(ControllerError::NoGameInProgress),
        }
    }

    pub(crate) fn any_instance_id(&self) -> Result<GameInstanceId, ControllerError> {
        self.instance_id()
            .map(str::to_string)
            .ok_or(ControllerError::NoGameInProgress)
    }

    /// Joins the live game, or a fresh one when none is live. Returns the instance id.
    pub async fn join_game(&self) -> Result<GameInstanceId, ControllerError> {
        match self.send(InteractableCommand::JoinGame).await? {
            Some(CommandPayload::JoinGame { game_id }) => Ok(game_id),
            other => Err(ControllerError::Transport(format!(
                "unexpected join reply: {other:?}"
            ))),
        }
    }

    pub async fn start_game(&self) -> Result<(), ControllerError> {
        let game_id = match self.game.as_ref() {
            Some(game) if game.state.status() == GameStatus::WaitingToStart => game.id.clone(),
            _ => return Err(ControllerError::NoGameStartable),
        };
        self.send(InteractableCommand::StartGame { game_id }).await?;
        Ok(())
    }

    pub async fn leave_game(&self) -> Result<(), ControllerError> {
        let game_id = self.any_instance_id()?;
        self.send(InteractableCommand::LeaveGame { game_id }).await?;
        Ok(())
    }
}
