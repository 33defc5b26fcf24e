use console_runtime::{ConsoleCommand, ConsoleSnapshot};

/// Modal interrupt raised when the authority reports a lost drone signal.
///
/// The flag is never cleared locally: acknowledging only sends the
/// confirmation, and the gate stays closed until a snapshot says otherwise.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConnectionLossGate {
    signal_lost: bool,
}

impl ConnectionLossGate {
    pub fn from_snapshot(snapshot: &ConsoleSnapshot) -> Self {
        Self {
            signal_lost: snapshot.signal_lost,
        }
    }

    pub fn is_blocking(&self) -> bool {
        self.signal_lost
    }

    /// Whether `command` may leave the console right now.
    pub fn admits(&self, command: &ConsoleCommand) -> bool {
        !self.signal_lost || matches!(command, ConsoleCommand::ConfirmSignalLost)
    }

    pub fn acknowledgement(&self) -> Option<ConsoleCommand> {
        self.signal_lost.then_some(ConsoleCommand::ConfirmSignalLost)
    }
}
