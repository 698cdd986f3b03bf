use holo_governance::GovernanceError;
use holo_ledger::LedgerError;
use holo_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("config error: {0}")]
    Config(String),

    #[error("scenario error: {0}")]
    Scenario(String),

    #[error(transparent)]
    Governance(#[from] GovernanceError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("sequencer task has stopped")]
    SequencerStopped,
}
