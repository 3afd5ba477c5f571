use crate::{
    BlockHeader, ChainClient, ChainClientError, ConfirmationDepth, GasEstimateRequest,
    TransactionReceipt,
};

use alloy_eips::BlockNumberOrTag;
use alloy_primitives::{Address, Bytes, B256, U256};
use alloy_provider::Provider;
use alloy_rpc_types_eth::{TransactionInput, TransactionRequest};

/// A [`ChainClient`] backed by an alloy [`Provider`].
#[derive(Debug, Clone)]
pub struct AlloyChainClient<P> {
    /// The underlying provider.
    provider: P,
}

impl<P> AlloyChainClient<P> {
    /// Returns a new [`AlloyChainClient`] from the provided [`Provider`].
    pub const fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl<P: Provider> AlloyChainClient<P> {
    async fn block_number_by_tag(&self, tag: BlockNumberOrTag) -> Result<u64, ChainClientError> {
        tracing::trace!(target: "scroll::providers", %tag, "fetching block number");
        let block = self
            .provider
            .get_block_by_number(tag)
            .await?
            .ok_or_else(|| ChainClientError::MissingBlock(tag.to_string()))?;
        Ok(block.header.number)
    }
}

#[async_trait::async_trait]
impl<P: Provider> ChainClient for AlloyChainClient<P> {
    async fn chain_id(&self) -> Result<u64, ChainClientError> {
        Ok(self.provider.get_chain_id().await?)
    }

    async fn pending_nonce_at(&self, address: Address) -> Result<u64, ChainClientError> {
        Ok(self.provider.get_transaction_count(address).pending().await?)
    }

    async fn suggest_gas_price(&self) -> Result<u128, ChainClientError> {
        Ok(self.provider.get_gas_price().await?)
    }

    async fn suggest_gas_tip_cap(&self) -> Result<u128, ChainClientError> {
        Ok(self.provider.get_max_priority_fee_per_gas().await?)
    }

    async fn balance_at(&self, address: Address) -> Result<U256, ChainClientError> {
        Ok(self.provider.get_balance(address).await?)
    }

    async fn latest_header(&self) -> Result<BlockHeader, ChainClientError> {
        let block = self
            .provider
            .get_block_by_number(BlockNumberOrTag::Latest)
            .await?
            .ok_or_else(|| ChainClientError::MissingBlock(BlockNumberOrTag::Latest.to_string()))?;
        Ok(BlockHeader {
            number: block.header.number,
            base_fee: block.header.base_fee_per_gas.map(Into::into),
        })
    }

    async fn estimate_gas(&self, request: GasEstimateRequest) -> Result<u64, ChainClientError> {
        let tx = TransactionRequest::default()
            .from(request.from)
            .to(request.to)
            .value(request.value)
            .input(TransactionInput::new(request.data));
        Ok(self.provider.estimate_gas(tx).await?)
    }

    async fn send_raw_transaction(&self, raw: Bytes) -> Result<B256, ChainClientError> {
        tracing::trace!(target: "scroll::providers", len = raw.len(), "sending raw transaction");
        let pending = self.provider.send_raw_transaction(&raw).await?;
        Ok(*pending.tx_hash())
    }

    async fn transaction_receipt(
        &self,
        hash: B256,
    ) -> Result<Option<TransactionReceipt>, ChainClientError> {
        tracing::trace!(target: "scroll::providers", ?hash, "fetching transaction receipt");
        let receipt = self.provider.get_transaction_receipt(hash).await?;
        Ok(receipt.and_then(|receipt| {
            // a receipt without a block number belongs to a pending transaction.
            receipt.block_number.map(|block_number| TransactionReceipt {
                tx_hash: receipt.transaction_hash,
                block_number,
                success: receipt.status(),
            })
        }))
    }

    async fn latest_confirmed_block_number(
        &self,
        depth: ConfirmationDepth,
    ) -> Result<u64, ChainClientError> {
        match depth {
            ConfirmationDepth::Finalized => {
                self.block_number_by_tag(BlockNumberOrTag::Finalized).await
            }
            ConfirmationDepth::Safe => self.block_number_by_tag(BlockNumberOrTag::Safe).await,
            ConfirmationDepth::Latest => Ok(self.provider.get_block_number().await?),
            ConfirmationDepth::BlockDepth(depth) => {
                Ok(self.provider.get_block_number().await?.saturating_sub(depth))
            }
        }
    }
}
