// Seat bookkeeping shared by the two-player games.

use crate::domain::errors::GameError;
use town_protocol::{GameStatus, PlayerId, PongGameState, TargetShooterGameState};

pub(crate) const SEATS: usize = 2;

/// Access to the seat-related fields of a two-player game state.
pub(crate) trait SeatedState {
    fn seat(&self, index: usize) -> Option<&PlayerId>;
    fn set_seat(&mut self, index: usize, player: Option<PlayerId>);
    fn is_ready(&self, index: usize) -> bool;
    fn set_ready(&mut self, index: usize, ready: bool);
    fn status(&self) -> GameStatus;
    fn set_status(&mut self, status: GameStatus);
    fn winner(&self) -> Option<&PlayerId>;
    fn set_winner(&mut self, winner: Option<PlayerId>);

    fn seat_of(&self, player: &str) -> Option<usize> {
        (0..SEATS).find(|&index| self.seat(index).map(String::as_str) == Some(player))
    }
}

/// Participants of one instance plus the seats they prefer from the previous one.
#[derive(Debug, Clone, Default)]
pub(crate) struct Seating {
    players: Vec<PlayerId>,
    preferred: [Option<PlayerId>; SEATS],
    // Last player to sit in each seat; survives leaves so the next instance can reuse it.
    last_occupants: [Option<PlayerId>; SEATS],
}

impl Seating {
    pub(crate) fn seeded_from(prior: Option<&Seating>) -> Self {
        Self {
            preferred: prior
                .map(|seating| seating.last_occupants.clone())
                .unwrap_or_default(),
            ..Self::default()
        }
    }

    pub(crate) fn players(&self) -> &[PlayerId] {
        &self.players
    }

    pub(crate) fn join<S: SeatedState>(
        &mut self,
        state: &mut S,
        player: &str,
    ) -> Result<usize, GameError> {
        if state.seat_of(player).is_some() {
            return Err(GameError::PlayerAlreadyInGame);
        }
        if state.status() == GameStatus::Over {
            return Err(GameError::InvalidCommand("game is over"));
        }

        let is_open = |index: usize| state.seat(index).is_none();
        let index = self
            .preferred
            .iter()
            .position(|preferred| preferred.as_deref() == Some(player))
            .filter(|&index| is_open(index))
            .or_else(|| (0..SEATS).find(|&index| is_open(index)))
            .ok_or(GameError::GameFull)?;

        state.set_seat(index, Some(player.to_string()));
        self.last_occupants[index] = Some(player.to_string());
        self.players.push(player.to_string());

        if (0..SEATS).all(|index| state.seat(index).is_some()) {
            state.set_status(GameStatus::WaitingToStart);
        }
        Ok(index)
    }

    /// Marks the player ready. Returns true when this call started the game.
    pub(crate) fn ready<S: SeatedState>(
        &self,
        state: &mut S,
        player: &str,
    ) -> Result<bool, GameError> {
        if state.status() != GameStatus::WaitingToStart {
            return Err(GameError::GameNotStartable);
        }
        let index = state.seat_of(player).ok_or(GameError::GameNotStartable)?;

        state.set_ready(index, true);
        if (0..SEATS).all(|index| state.is_ready(index)) {
            state.set_status(GameStatus::InProgress);
            return Ok(true);
        }
        Ok(false)
    }

    /// Resolves the acting seat for a move.
    pub(crate) fn seat_in_progress<S: SeatedState>(
        &self,
        state: &S,
        player: &str,
    ) -> Result<usize, GameError> {
        if state.status() != GameStatus::InProgress {
            return Err(GameError::GameNotInProgress);
        }
        state.seat_of(player).ok_or(GameError::PlayerNotInGame)
    }

    pub(crate) fn leave<S: SeatedState>(
        &mut self,
        state: &mut S,
        player: &str,
    ) -> Result<(), GameError> {
        if state.status() == GameStatus::Over {
            return Ok(());
        }
        let index = state.seat_of(player).ok_or(GameError::PlayerNotInGame)?;

        state.set_seat(index, None);
        self.players.retain(|seated| seated != player);

        if state.status() == GameStatus::InProgress {
            // The remaining occupant wins; a voluntary leave never ties.
            finish(state, 1 - index);
        } else {
            for seat in 0..SEATS {
                state.set_ready(seat, false);
            }
            state.set_status(GameStatus::WaitingForPlayers);
        }
        Ok(())
    }
}

/// Ends the game with the occupant of `winner_seat` as winner. The winner is set once.
pub(crate) fn finish<S: SeatedState>(state: &mut S, winner_seat: usize) {
    if state.status() == GameStatus::Over {
        return;
    }
    if state.winner().is_none() {
        let winner = state.seat(winner_seat).cloned();
        state.set_winner(winner);
    }
    state.set_status(GameStatus::Over);
}

impl SeatedState for PongGameState {
    fn seat(&self, index: usize) -> Option<&PlayerId> {
        match index {
            0 => self.left_player.as_ref(),
            _ => self.right_player.as_ref(),
        }
    }

    fn set_seat(&mut self, index: usize, player: Option<PlayerId>) {
        match index {
            0 => self.left_player = player,
            _ => self.right_player = player,
        }
    }

    fn is_ready(&self, index: usize) -> bool {
        match index {
            0 => self.left_ready,
            _ => self.right_ready,
        }
    }

    fn set_ready(&mut self, index: usize, ready: bool) {
        match index {
            0 => self.left_ready = ready,
            _ => self.right_ready = ready,
        }
    }

    fn status(&self) -> GameStatus {
        self.status
    }

    fn set_status(&mut self, status: GameStatus) {
        self.status = status;
    }

    fn winner(&self) -> Option<&PlayerId> {
        self.winner.as_ref()
    }

    fn set_winner(&mut self, winner: Option<PlayerId>) {
        self.winner = winner;
    }
}

impl SeatedState for TargetShooterGameState {
    fn seat(&self, index: usize) -> Option<&PlayerId> {
        match index {
            0 => self.player1.as_ref(),
            _ => self.player2.as_ref(),
        }
    }

    fn set_seat(&mut self, index: usize, player: Option<PlayerId>) {
        match index {
            0 => self.player1 = player,
            _ => self.player2 = player,
        }
    }

    fn is_ready(&self, index: usize) -> bool {
        match index {
            0 => self.player1_ready,
            _ => self.player2_ready,
        }
    }

    fn set_ready(&mut self, index: usize, ready: bool) {
        match index {
            0 => self.player1_ready = ready,
            _ => self.player2_ready = ready,
        }
    }

    fn status(&self) -> GameStatus {
        self.status
    }

    fn set_status(&mut self, status: GameStatus) {
        self.status = status;
    }

    fn winner(&self) -> Option<&PlayerId> {
        self.winner.as_ref()
    }

    fn set_winner(&mut self, winner: Option<PlayerId>) {
        self.winner = winner;
    }
}
