//! Virtual operations - the block side-channel event trail.
//!
//! Every financial mutation the betting service performs leaves a typed
//! event here, in exact production order. Indexers and plugins consume the
//! drained trail per block; the order within a transaction and across
//! transactions in a block is guaranteed stable.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::protocol::asset::Asset;
use crate::storage::objects::{AccountName, GameStatus};

/// Which store a cancelled bet was sitting in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CancelledBetKind {
    Pending,
    Matched,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum VirtualOperation {
    BetCancelled {
        game_uuid: Uuid,
        better: AccountName,
        bet_uuid: Uuid,
        stake: Asset,
        kind: CancelledBetKind,
    },
    BetRestored {
        game_uuid: Uuid,
        better: AccountName,
        bet_uuid: Uuid,
        stake: Asset,
    },
    GameStatusChanged {
        game_uuid: Uuid,
        old_status: GameStatus,
        new_status: GameStatus,
    },
}
