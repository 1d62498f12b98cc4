use crate::domain::errors::ControllerError;
use async_trait::async_trait;
use town_protocol::{CommandPayload, InteractableCommand};

// Controllers depend on this trait, not on the websocket connection.
// Resolves once the server acknowledged (or rejected) the command.
#[async_trait]
pub trait CommandSender: Send + Sync {
    async fn send_command(
        &self,
        area_id: &str,
        command: InteractableCommand,
    ) -> Result<Option<CommandPayload>, ControllerError>;
}
