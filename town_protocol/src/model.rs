// Game state model and area snapshots as seen on the wire.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type PlayerId = String;
pub type GameInstanceId = String;

/// Lifecycle of a single game instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameStatus {
    #[default]
    WaitingForPlayers,
    WaitingToStart,
    InProgress,
    Over,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }
}

/// Paddle movement intent sent by a Pong player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaddleDirection {
    Up,
    Down,
    #[default]
    Still,
}

impl PaddleDirection {
    // Screen coordinates: y grows downwards.
    pub fn sign(self) -> f32 {
        match self {
            PaddleDirection::Up => -1.0,
            PaddleDirection::Down => 1.0,
            PaddleDirection::Still => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PongSide {
    Left,
    Right,
}

impl PongSide {
    pub fn opponent(self) -> Self {
        match self {
            PongSide::Left => PongSide::Right,
            PongSide::Right => PongSide::Left,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShooterSlot {
    Player1,
    Player2,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PongGameState {
    pub status: GameStatus,
    #[serde(default)]
    pub winner: Option<PlayerId>,
    pub left_paddle: Point,
    pub right_paddle: Point,
    pub left_paddle_direction: PaddleDirection,
    pub right_paddle_direction: PaddleDirection,
    pub left_score: u32,
    pub right_score: u32,
    pub ball_position: Point,
    pub ball_velocity: Point,
    #[serde(default)]
    pub left_player: Option<PlayerId>,
    #[serde(default)]
    pub right_player: Option<PlayerId>,
    pub left_ready: bool,
    pub right_ready: bool,
}

impl PongGameState {
    pub fn player_in(&self, side: PongSide) -> Option<&PlayerId> {
        match side {
            PongSide::Left => self.left_player.as_ref(),
            PongSide::Right => self.right_player.as_ref(),
        }
    }

    pub fn side_of(&self, player: &str) -> Option<PongSide> {
        if self.left_player.as_deref() == Some(player) {
            Some(PongSide::Left)
        } else if self.right_player.as_deref() == Some(player) {
            Some(PongSide::Right)
        } else {
            None
        }
    }

    pub fn score_of(&self, side: PongSide) -> u32 {
        match side {
            PongSide::Left => self.left_score,
            PongSide::Right => self.right_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

/// Shots fired and targets hit by one player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Accuracy {
    pub hits: u32,
    pub shots: u32,
}

impl Accuracy {
    pub fn ratio(&self) -> f32 {
        if self.shots == 0 {
            0.0
        } else {
            self.hits as f32 / self.shots as f32
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TargetShooterGameState {
    pub status: GameStatus,
    #[serde(default)]
    pub winner: Option<PlayerId>,
    #[serde(default)]
    pub player1: Option<PlayerId>,
    #[serde(default)]
    pub player2: Option<PlayerId>,
    pub player1_ready: bool,
    pub player2_ready: bool,
    pub player1_score: u32,
    pub player2_score: u32,
    pub current_target: Point,
    pub difficulty: Difficulty,
    pub target_size: f32,
    pub player1_accuracy: Accuracy,
    pub player2_accuracy: Accuracy,
    #[serde(default)]
    pub player1_cursor: Option<Point>,
    #[serde(default)]
    pub player2_cursor: Option<Point>,
}

impl TargetShooterGameState {
    pub fn player_in(&self, slot: ShooterSlot) -> Option<&PlayerId> {
        match slot {
            ShooterSlot::Player1 => self.player1.as_ref(),
            ShooterSlot::Player2 => self.player2.as_ref(),
        }
    }

    pub fn slot_of(&self, player: &str) -> Option<ShooterSlot> {
        if self.player1.as_deref() == Some(player) {
            Some(ShooterSlot::Player1)
        } else if self.player2.as_deref() == Some(player) {
            Some(ShooterSlot::Player2)
        } else {
            None
        }
    }
}

/// State of whichever game an area hosts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "game", content = "state")]
pub enum GameState {
    Pong(PongGameState),
    TargetShooter(TargetShooterGameState),
}

impl GameState {
    pub fn status(&self) -> GameStatus {
        match self {
            GameState::Pong(state) => state.status,
            GameState::TargetShooter(state) => state.status,
        }
    }

    pub fn winner(&self) -> Option<&PlayerId> {
        match self {
            GameState::Pong(state) => state.winner.as_ref(),
            GameState::TargetShooter(state) => state.winner.as_ref(),
        }
    }
}

/// One playthrough of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameInstance {
    pub id: GameInstanceId,
    pub players: Vec<PlayerId>,
    pub state: GameState,
    // Display name to score (1 for the winner, 0 otherwise) once the game is over.
    #[serde(default)]
    pub result: Option<BTreeMap<String, u32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameResult {
    pub game_id: GameInstanceId,
    pub scores: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AreaKind {
    Pong,
    TargetShooter,
    TicketBooth,
}

/// Serialized view of an area pushed to every client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AreaSnapshot {
    pub id: String,
    pub kind: AreaKind,
    pub occupants: Vec<PlayerId>,
    #[serde(default)]
    pub game: Option<GameInstance>,
    #[serde(default)]
    pub history: Vec<GameResult>,
}

impl AreaSnapshot {
    pub fn empty(id: impl Into<String>, kind: AreaKind) -> Self {
        Self {
            id: id.into(),
            kind,
            occupants: Vec::new(),
            game: None,
            history: Vec::new(),
        }
    }
}

/// Player economy: token balance plus cosmetic items.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Wallet {
    pub tokens: u32,
    pub owned: Vec<String>,
    #[serde(default)]
    pub equipped: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketBoothItem {
    pub name: String,
    pub cost: u32,
}
