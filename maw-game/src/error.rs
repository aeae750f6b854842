use thiserror::Error;

/// Rule violations surfaced by Maw operations.
///
/// Every variant is a recoverable, caller-visible condition; the `Display`
/// text is the short message shown to the player.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MawError {
    #[error("the Maw is already closed for today")]
    AlreadyClosed,
    #[error("a tier has already been selected today")]
    AlreadySelected,
    #[error("tier {0} does not exist")]
    InvalidTier(u8),
    #[error("tier {0} is locked")]
    TierLocked(u8),
    #[error("no tier selected")]
    NoTierSelected,
    #[error("player salt has not been generated")]
    MissingSalt,
    #[error("no active run")]
    NoActiveRun,
    #[error("choose a boon before continuing")]
    SelectionPending,
    #[error("the run is already complete")]
    RunAlreadyComplete,
    #[error("no boon selection pending")]
    NoPendingSelection,
    #[error("boon {0} was not offered")]
    BoonNotOffered(String),
    #[error("no rewards to claim")]
    NothingToClaim,
    #[error("unknown shop item {0}")]
    UnknownShopItem(String),
    #[error("{0} is out of stock")]
    OutOfStock(String),
    #[error("not enough dregs (need {required}, have {available})")]
    InsufficientDregs { required: u64, available: u64 },
    #[error("save schema {found} is newer than supported {supported}")]
    UnsupportedSchema { found: u32, supported: u32 },
    #[error("catalog has no entry for {0}")]
    CatalogMismatch(String),
}

/// Convenience alias for Maw results.
pub type MawResult<T> = Result<T, MawError>;
