//! Backend commands queued from UI to backend worker.

pub enum BackendCommand {
    Connect,
    RefreshStats,
    Mint { amount: u64 },
    Claim,
}
