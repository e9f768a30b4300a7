/// The lifecycle state of a request.
///
/// A request starts `Pending`, becomes `Sent` once its `request` event has
/// fired, and ends `Settled`. The `done` event fires exactly on the
/// transition into `Settled`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    /// Configured but not executed yet.
    #[default]
    Pending,

    /// The pipeline is running.
    Sent,

    /// The pipeline finished, successfully or not.
    Settled(Outcome),
}

/// How a settled request ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Ok,
    Err,
}

impl LoadState {
    pub fn is_settled(self) -> bool {
        matches!(self, LoadState::Settled(_))
    }
}
