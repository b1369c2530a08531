// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Avalanche C-Chain implementation of the chain gateway.
//!
//! All RPC calls run under a bounded timeout: a stalled node fails the
//! in-flight ledger operation instead of wedging the mutation queue.

use std::time::Duration;

use alloy::{
    consensus::Transaction as _,
    network::{Ethereum, EthereumWallet},
    primitives::{Address, TxHash, U256},
    providers::{
        fillers::{
            BlobGasFiller, ChainIdFiller, FillProvider, GasFiller, JoinFill, NonceFiller,
            WalletFiller,
        },
        Identity, Provider, ProviderBuilder, RootProvider,
    },
    rpc::types::TransactionRequest,
};
use async_trait::async_trait;
use tokio::time::timeout;

use super::gateway::{ChainError, ChainGateway, TransferReceipt};

/// Upper bound on a single RPC round trip.
const RPC_TIMEOUT: Duration = Duration::from_secs(15);

/// Upper bound on waiting for an outgoing transfer to confirm.
const CONFIRM_TIMEOUT: Duration = Duration::from_secs(90);

/// Avalanche network configuration.
#[derive(Debug, Clone)]
pub struct NetworkConfig {
    /// Network name for display
    pub name: &'static str,
    /// Chain ID
    pub chain_id: u64,
    /// RPC endpoint URL
    pub rpc_url: String,
    /// Block explorer URL
    pub explorer_url: &'static str,
}

impl NetworkConfig {
    /// Avalanche C-Chain mainnet.
    pub fn mainnet() -> Self {
        Self {
            name: "Avalanche C-Chain",
            chain_id: 43114,
            rpc_url: "https://api.avax.network/ext/bc/C/rpc".to_string(),
            explorer_url: "https://snowtrace.io",
        }
    }

    /// Avalanche Fuji testnet.
    pub fn fuji() -> Self {
        Self {
            name: "Avalanche Fuji Testnet",
            chain_id: 43113,
            rpc_url: "https://api.avax-test.network/ext/bc/C/rpc".to_string(),
            explorer_url: "https://testnet.snowtrace.io",
        }
    }

    /// Look up a network preset by name.
    pub fn for_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "fuji" => Some(Self::fuji()),
            "mainnet" => Some(Self::mainnet()),
            _ => None,
        }
    }

    /// Override the RPC endpoint.
    pub fn with_rpc_url(mut self, rpc_url: impl Into<String>) -> Self {
        self.rpc_url = rpc_url.into();
        self
    }
}

/// Signer-filled HTTP provider type (with all fillers).
type SignerProvider = FillProvider<
    JoinFill<
        JoinFill<
            Identity,
            JoinFill<GasFiller, JoinFill<BlobGasFiller, JoinFill<NonceFiller, ChainIdFiller>>>,
        >,
        WalletFiller<EthereumWallet>,
    >,
    RootProvider<Ethereum>,
>;

/// Chain gateway backed by an Avalanche C-Chain RPC node.
pub struct EvmGateway {
    /// Network configuration
    network: NetworkConfig,
    /// Alloy HTTP provider with the custody signer attached
    provider: SignerProvider,
}

impl EvmGateway {
    /// Create a gateway for `network`, signing outgoing transfers with
    /// `wallet`.
    pub fn new(network: NetworkConfig, wallet: EthereumWallet) -> Result<Self, ChainError> {
        let url: url::Url = network
            .rpc_url
            .parse()
            .map_err(|e: url::ParseError| ChainError::InvalidRpcUrl(e.to_string()))?;

        let provider = ProviderBuilder::new().wallet(wallet).connect_http(url);

        Ok(Self { network, provider })
    }

    /// Get the network configuration.
    pub fn network(&self) -> &NetworkConfig {
        &self.network
    }
}

/// Parse a transaction hash supplied by a caller.
pub(crate) fn parse_tx_hash(raw: &str) -> Result<TxHash, ChainError> {
    raw.parse()
        .map_err(|_| ChainError::InvalidSignature(format!("not a transaction hash: {raw}")))
}

#[async_trait]
impl ChainGateway for EvmGateway {
    async fn native_balance(&self, address: Address) -> Result<U256, ChainError> {
        timeout(RPC_TIMEOUT, self.provider.get_balance(address))
            .await
            .map_err(|_| ChainError::Rpc("balance query timed out".to_string()))?
            .map_err(|e| ChainError::Rpc(e.to_string()))
    }

    async fn verify_credit(
        &self,
        tx_hash: &str,
        expected_recipient: Address,
    ) -> Result<U256, ChainError> {
        let hash = parse_tx_hash(tx_hash)?;

        let tx = timeout(RPC_TIMEOUT, self.provider.get_transaction_by_hash(hash))
            .await
            .map_err(|_| ChainError::Rpc("transaction lookup timed out".to_string()))?
            .map_err(|e| ChainError::Rpc(e.to_string()))?
            .ok_or(ChainError::TxNotFound)?;

        // A receipt only exists once the transaction is included in a block.
        let receipt = timeout(RPC_TIMEOUT, self.provider.get_transaction_receipt(hash))
            .await
            .map_err(|_| ChainError::Rpc("receipt lookup timed out".to_string()))?
            .map_err(|e| ChainError::Rpc(e.to_string()))?
            .ok_or(ChainError::TxUnconfirmed)?;

        if !receipt.status() {
            return Err(ChainError::TxFailed);
        }

        // The credited amount comes from the chain record, never from the
        // caller. Contract creations have no recipient and cannot credit us.
        let recipient = tx.to().ok_or(ChainError::RecipientMismatch)?;
        if recipient != expected_recipient {
            return Err(ChainError::RecipientMismatch);
        }

        let value = tx.value();
        if value.is_zero() {
            return Err(ChainError::NonPositiveCredit);
        }

        Ok(value)
    }

    async fn transfer(&self, to: Address, amount_wei: U256) -> Result<TransferReceipt, ChainError> {
        let tx = TransactionRequest::default().to(to).value(amount_wei);

        let pending = timeout(RPC_TIMEOUT, self.provider.send_transaction(tx))
            .await
            .map_err(|_| ChainError::Rpc("transaction submission timed out".to_string()))?
            .map_err(|e| ChainError::TransferRejected(e.to_string()))?;

        let tx_hash = format!("{:?}", pending.tx_hash());

        let receipt = timeout(CONFIRM_TIMEOUT, pending.get_receipt())
            .await
            .map_err(|_| ChainError::ConfirmationTimeout)?
            .map_err(|e| ChainError::Rpc(e.to_string()))?;

        if !receipt.status() {
            return Err(ChainError::TxFailed);
        }

        Ok(TransferReceipt {
            tx_hash,
            block_number: receipt.block_number.unwrap_or(0),
        })
    }
}
