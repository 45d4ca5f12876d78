/// A `Result` alias where the `Err` case is `switchboard_editor::Error`.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The draft has no path pattern. The editing surface normally
    /// prevents this before a save is attempted; the compiler checks
    /// anyway.
    #[error("route path must not be empty")]
    EmptyPath,

    /// The draft's target list is empty once blank rows are discarded.
    #[error("at least one target is required")]
    EmptyTargets,

    /// A save is already outstanding on this session.
    #[error("a save is already in flight")]
    SaveInFlight,

    /// The fetch or write round-trip to the registry failed. The
    /// session rolls back any optimistic local change before
    /// returning this.
    #[error("failed to save route")]
    Transport(#[from] TransportError),
}

impl Error {
    /// `true` for errors detected locally, before any registry
    /// interaction.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::EmptyPath | Error::EmptyTargets)
    }
}

/// A failure of a single registry round-trip.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error("registry returned status {status}")]
    Status { status: u16 },
}
