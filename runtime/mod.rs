//! Wagerbook Runtime - Block Application
//!
//! The chain's block loop as the betting subsystem sees it: bump head block
//! properties, apply each transaction in its own undo session, run the
//! auto-resolve task, hand the drained event trail to the host.
//!
//! The model is single-threaded cooperative with full serialization: one
//! transaction mutates state at a time and runs to completion without yield
//! points. Hosts that need shared access wrap the chain in `SharedChain`.

pub mod block_tasks;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use crate::betting::apply_operation;
use crate::errors::ChainError;
use crate::events::VirtualOperation;
use crate::protocol::asset::Asset;
use crate::protocol::operations::Operation;
use crate::storage::objects::AccountName;
use crate::storage::Database;

pub use block_tasks::{process_bets_auto_resolving, process_games_startup};

/// Seed state of a fresh chain.
#[derive(Debug, Clone)]
pub struct Genesis {
    pub moderator: AccountName,
    pub genesis_time: DateTime<Utc>,
    pub accounts: Vec<(AccountName, Asset)>,
}

impl Genesis {
    pub fn build(&self) -> Result<Database, ChainError> {
        let mut db = Database::new(self.moderator.clone(), self.genesis_time);
        for (name, balance) in &self.accounts {
            db.create_account(name, *balance)?;
        }
        Ok(db)
    }
}

/// Outcome of applying one block.
#[derive(Debug)]
pub struct BlockResult {
    pub block_num: u64,
    /// Per-transaction results in block order. A failed transaction left no
    /// trace in the state.
    pub tx_results: Vec<Result<(), ChainError>>,
    /// The event trail of the block, in emission order.
    pub virtual_ops: Vec<VirtualOperation>,
}

pub struct Chain {
    db: Database,
}

impl Chain {
    pub fn new(genesis: &Genesis) -> Result<Self, ChainError> {
        Ok(Chain {
            db: genesis.build()?,
        })
    }

    pub fn db(&self) -> &Database {
        &self.db
    }

    /// Direct state access for host components that sit beside the
    /// transaction flow (the matcher delivering match outcomes, indexers).
    pub fn db_mut(&mut self) -> &mut Database {
        &mut self.db
    }

    /// Apply one block of operations at the given block time.
    ///
    /// Each transaction runs in its own undo session: an error rolls that
    /// transaction back completely and the block continues. A failure in the
    /// auto-resolve phase aborts the whole block instead.
    pub fn apply_block(
        &mut self,
        block_time: DateTime<Utc>,
        operations: &[Operation],
    ) -> Result<BlockResult, ChainError> {
        if block_time < self.db.head_block_time() {
            return Err(ChainError::InvariantViolation(format!(
                "block time {} precedes head block time {}",
                block_time,
                self.db.head_block_time()
            )));
        }

        let db = &mut self.db;
        db.begin_undo();
        db.update_dgp(|dgp| {
            dgp.head_block_num += 1;
            dgp.head_block_time = block_time;
        });

        if let Err(e) = process_games_startup(db) {
            db.undo();
            return Err(e);
        }

        let mut tx_results = Vec::with_capacity(operations.len());
        for op in operations {
            db.begin_undo();
            let result = apply_operation(db, op);
            match &result {
                Ok(()) => db.commit_undo(),
                Err(_) => db.undo(),
            }
            tx_results.push(result);
        }

        if let Err(e) = process_bets_auto_resolving(db) {
            db.undo();
            return Err(e);
        }

        db.commit_undo();
        Ok(BlockResult {
            block_num: db.dgp().head_block_num,
            tx_results,
            virtual_ops: db.drain_virtual_ops(),
        })
    }
}

/// Thread-safe chain handle for host embedding.
pub type SharedChain = Arc<RwLock<Chain>>;

pub fn create_chain(genesis: &Genesis) -> Result<SharedChain, ChainError> {
    Ok(Arc::new(RwLock::new(Chain::new(genesis)?)))
}
