// Shared fakes for controller tests.

use crate::domain::{CommandSender, ControllerError};
use async_trait::async_trait;
use std::{
    collections::{BTreeMap, VecDeque},
    sync::{Arc, Mutex},
};
use town_protocol::{
    AreaKind, AreaSnapshot, CommandPayload, GameInstance, GameResult, GameState,
    InteractableCommand,
};

type Reply = Result<Option<CommandPayload>, ControllerError>;

/// Records every command and answers with queued replies (`Ok(None)` once drained).
#[derive(Default)]
pub(crate) struct FakeSender {
    sent: Mutex<Vec<(String, InteractableCommand)>>,
    replies: Mutex<VecDeque<Reply>>,
}

impl FakeSender {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn reply_with(&self, reply: Reply) {
        self.replies
            .lock()
            .expect("replies mutex poisoned")
            .push_back(reply);
    }

    pub(crate) fn sent(&self) -> Vec<(String, InteractableCommand)> {
        self.sent.lock().expect("sent mutex poisoned").clone()
    }
}

#[async_trait]
impl CommandSender for FakeSender {
    async fn send_command(&self, area_id: &str, command: InteractableCommand) -> Reply {
        self.sent
            .lock()
            .expect("sent mutex poisoned")
            .push((area_id.to_string(), command));
        self.replies
            .lock()
            .expect("replies mutex poisoned")
            .pop_front()
            .unwrap_or(Ok(None))
    }
}

/// Collects emitted events so tests can assert on them after the fact.
pub(crate) fn recorder<E: Clone + Send + 'static>()
-> (Arc<Mutex<Vec<E>>>, impl FnMut(&E) + Send + Sync + 'static) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let handler = move |event: &E| {
        sink.lock()
            .expect("recorder mutex poisoned")
            .push(event.clone());
    };
    (seen, handler)
}

pub(crate) fn drain<E>(seen: &Arc<Mutex<Vec<E>>>) -> Vec<E> {
    std::mem::take(&mut *seen.lock().expect("recorder mutex poisoned"))
}

pub(crate) fn snapshot(
    area_id: &str,
    kind: AreaKind,
    occupants: &[&str],
    game: Option<GameInstance>,
) -> AreaSnapshot {
    AreaSnapshot {
        id: area_id.to_string(),
        kind,
        occupants: occupants.iter().map(|id| id.to_string()).collect(),
        game,
        history: Vec::new(),
    }
}

pub(crate) fn instance(id: &str, players: &[&str], state: GameState) -> GameInstance {
    GameInstance {
        id: id.to_string(),
        players: players.iter().map(|id| id.to_string()).collect(),
        state,
        result: None,
    }
}

pub(crate) fn result(game_id: &str, scores: &[(&str, u32)]) -> GameResult {
    GameResult {
        game_id: game_id.to_string(),
        scores: scores
            .iter()
            .map(|(name, score)| (name.to_string(), *score))
            .collect::<BTreeMap<_, _>>(),
    }
}
