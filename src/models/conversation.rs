/// One-shot pending-input state per chat: a menu action arms a state, the
/// next free-text message consumes it and returns the chat to idle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingInput {
    AwaitingCity,
    AwaitingKeyword,
    AwaitingSalary,
    AwaitingSchedule,
    AwaitingManualPosting,
}
