use thiserror::Error;

use crate::accounts::LedgerError;

/// Rejections issued at submission, before any book state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmitError {
    #[error("quantity must be > 0")]
    ZeroQuantity,
    #[error("limit orders require a price")]
    MissingPrice,
    #[error("limit price must be > 0")]
    ZeroPrice,
    #[error("price * quantity does not fit the minor unit range")]
    NotionalOverflow,
}

/// Operational errors delivered on the engine's error stream.
///
/// Invariant violations are not routed here; those abort.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    #[error("transfer failed for order {order_id}: {source}")]
    TransferFailed {
        order_id: u64,
        #[source]
        source: LedgerError,
    },
}
