//! Simulated chain - An in-memory stand-in for an EVM chain
//!
//! Every state-changing call mines a block and returns a receipt, after an
//! optional confirmation latency. Reads are free. Useful for local runs and
//! tests where no real devnet is available.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use orchestrator::{ChainBackend, TxReceipt};
use sha2::{Digest, Sha256};
use shared::BackendError;
use solve_domain::{Address, ChainId};

#[derive(Debug, Clone)]
struct Contract {
    code: Vec<u8>,
    owner: Address,
}

#[derive(Debug, Default)]
struct ChainState {
    block: u64,
    contracts: HashMap<Address, Contract>,
    /// (contract, caller) pairs allowed to call through the contract
    permissions: HashSet<(Address, Address)>,
    balances: HashMap<Address, u128>,
}

/// In-memory chain
#[derive(Debug)]
pub struct SimulatedChain {
    chain: ChainId,
    sender: Address,
    latency: Duration,
    state: RwLock<ChainState>,
    fault: RwLock<Option<BackendError>>,
    transactions: AtomicUsize,
}

impl SimulatedChain {
    /// Create a chain whose transactions are signed by `sender`
    pub fn new(chain: ChainId, sender: Address) -> Self {
        Self {
            chain,
            sender,
            latency: Duration::ZERO,
            state: RwLock::new(ChainState::default()),
            fault: RwLock::new(None),
            transactions: AtomicUsize::new(0),
        }
    }

    /// Wait this long before confirming each transaction
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Start `account` with `amount` wei
    pub fn with_balance(mut self, account: Address, amount: u128) -> Self {
        let state = self.state.get_mut().unwrap_or_else(PoisonError::into_inner);
        state.balances.insert(account, amount);
        self
    }

    /// Make every subsequent transaction fail with `error`, or clear the fault
    pub fn set_fault(&self, error: Option<BackendError>) -> Result<(), BackendError> {
        let mut fault = self
            .fault
            .write()
            .map_err(|_| BackendError::Transport("Failed to acquire write lock".to_string()))?;
        *fault = error;
        Ok(())
    }

    /// Number of transactions mined so far
    pub fn transactions(&self) -> usize {
        self.transactions.load(Ordering::SeqCst)
    }

    /// Number of deployed contracts
    pub fn contract_count(&self) -> usize {
        self.state.read().map(|s| s.contracts.len()).unwrap_or(0)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, ChainState>, BackendError> {
        self.state
            .read()
            .map_err(|_| BackendError::Transport("Failed to acquire read lock".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, ChainState>, BackendError> {
        self.state
            .write()
            .map_err(|_| BackendError::Transport("Failed to acquire write lock".to_string()))
    }

    /// Submission half of a transaction: injected faults surface here
    fn check_fault(&self) -> Result<(), BackendError> {
        let fault = self
            .fault
            .read()
            .map_err(|_| BackendError::Transport("Failed to acquire read lock".to_string()))?;
        match fault.as_ref() {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }

    /// Confirmation half: wait, then mine a block
    async fn confirm(
        &self,
        state_change: impl FnOnce(&mut ChainState) -> Result<(), BackendError>,
    ) -> Result<TxReceipt, BackendError> {
        self.check_fault()?;
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let mut state = self.write()?;
        state_change(&mut state)?;
        state.block += 1;
        self.transactions.fetch_add(1, Ordering::SeqCst);

        let digest = Sha256::new()
            .chain_update(self.chain.as_u64().to_be_bytes())
            .chain_update(state.block.to_be_bytes())
            .finalize();

        Ok(TxReceipt {
            chain: self.chain,
            block: state.block,
            tx_hash: format!("0x{}", hex::encode(digest)),
        })
    }
}

#[async_trait]
impl ChainBackend for SimulatedChain {
    fn chain_id(&self) -> ChainId {
        self.chain
    }

    async fn code_at(&self, address: Address) -> Result<Option<Vec<u8>>, BackendError> {
        Ok(self.read()?.contracts.get(&address).map(|c| c.code.clone()))
    }

    async fn deploy(&self, address: Address, code: Vec<u8>) -> Result<TxReceipt, BackendError> {
        let owner = self.sender;
        self.confirm(move |state| {
            if state.contracts.contains_key(&address) {
                return Err(BackendError::Reverted {
                    reason: format!("contract already deployed at {}", address),
                });
            }
            state.contracts.insert(address, Contract { code, owner });
            Ok(())
        })
        .await
    }

    async fn is_allowed(&self, contract: Address, caller: Address) -> Result<bool, BackendError> {
        Ok(self.read()?.permissions.contains(&(contract, caller)))
    }

    async fn allow(&self, contract: Address, caller: Address) -> Result<TxReceipt, BackendError> {
        let sender = self.sender;
        self.confirm(move |state| {
            let owner = state
                .contracts
                .get(&contract)
                .map(|c| c.owner)
                .ok_or_else(|| BackendError::Reverted {
                    reason: format!("no contract at {}", contract),
                })?;
            if owner != sender {
                return Err(BackendError::Unauthorized {
                    sender,
                    action: format!("allow calls on {}", contract),
                });
            }
            state.permissions.insert((contract, caller));
            Ok(())
        })
        .await
    }

    async fn balance(&self, account: Address) -> Result<u128, BackendError> {
        Ok(self.read()?.balances.get(&account).copied().unwrap_or(0))
    }

    async fn transfer(&self, to: Address, amount: u128) -> Result<TxReceipt, BackendError> {
        let from = self.sender;
        self.confirm(move |state| {
            let available = state.balances.get(&from).copied().unwrap_or(0);
            if available < amount {
                return Err(BackendError::InsufficientFunds {
                    available,
                    required: amount,
                });
            }
            state.balances.insert(from, available - amount);
            *state.balances.entry(to).or_insert(0) += amount;
            Ok(())
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPLOYER: Address = Address::new([0xd0; 20]);
    const OTHER: Address = Address::new([0x01; 20]);

    fn chain() -> SimulatedChain {
        SimulatedChain::new(ChainId::new(1655), DEPLOYER).with_balance(DEPLOYER, 1_000)
    }

    #[tokio::test]
    async fn test_deploy_then_code_at() {
        let chain = chain();
        let addr = Address::new([0xaa; 20]);

        assert_eq!(chain.code_at(addr).await.unwrap(), None);
        let receipt = chain.deploy(addr, b"inbox".to_vec()).await.unwrap();

        assert_eq!(receipt.block, 1);
        assert!(receipt.tx_hash.starts_with("0x"));
        assert_eq!(chain.code_at(addr).await.unwrap(), Some(b"inbox".to_vec()));
        assert_eq!(chain.contract_count(), 1);
    }

    #[tokio::test]
    async fn test_second_deploy_at_same_address_reverts() {
        let chain = chain();
        let addr = Address::new([0xaa; 20]);
        chain.deploy(addr, b"inbox".to_vec()).await.unwrap();

        let err = chain.deploy(addr, b"inbox".to_vec()).await.unwrap_err();
        assert!(matches!(err, BackendError::Reverted { .. }));
        assert_eq!(chain.transactions(), 1);
    }

    #[tokio::test]
    async fn test_allow_requires_contract_owned_by_sender() {
        let chain = chain();
        let outbox = Address::new([0xbb; 20]);

        let err = chain.allow(outbox, OTHER).await.unwrap_err();
        assert!(matches!(err, BackendError::Reverted { .. }));

        chain.deploy(outbox, b"outbox".to_vec()).await.unwrap();
        chain.allow(outbox, OTHER).await.unwrap();
        assert!(chain.is_allowed(outbox, OTHER).await.unwrap());
        assert!(!chain.is_allowed(outbox, DEPLOYER).await.unwrap());
    }

    #[tokio::test]
    async fn test_transfer_moves_balance() {
        let chain = chain();

        chain.transfer(OTHER, 400).await.unwrap();
        assert_eq!(chain.balance(OTHER).await.unwrap(), 400);
        assert_eq!(chain.balance(DEPLOYER).await.unwrap(), 600);

        let err = chain.transfer(OTHER, 601).await.unwrap_err();
        assert_eq!(
            err,
            BackendError::InsufficientFunds {
                available: 600,
                required: 601
            }
        );
    }

    #[test]
    fn test_set_fault_reports_poisoned_lock() {
        let chain = std::sync::Arc::new(chain());
        let holder = std::sync::Arc::clone(&chain);
        let _ = std::thread::spawn(move || {
            let _fault = holder.fault.write().unwrap();
            panic!("poisoned while injecting a fault");
        })
        .join();

        let err = chain.set_fault(None).unwrap_err();
        assert!(matches!(err, BackendError::Transport(_)));
    }

    #[tokio::test]
    async fn test_fault_fails_transactions_but_not_reads() {
        let chain = chain();
        chain
            .set_fault(Some(BackendError::Transport("connection refused".into())))
            .unwrap();

        assert!(chain.deploy(Address::new([0xaa; 20]), vec![]).await.is_err());
        assert_eq!(chain.balance(DEPLOYER).await.unwrap(), 1_000);
        assert_eq!(chain.transactions(), 0);

        chain.set_fault(None).unwrap();
        assert!(chain.transfer(OTHER, 1).await.is_ok());
    }
}
