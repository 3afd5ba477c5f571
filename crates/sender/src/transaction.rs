use crate::{Account, GasFees, SenderError, TxType};

use alloy_consensus::{
    SignableTransaction, Signed, TxEip1559, TxEip2930, TxEnvelope, TxLegacy,
};
use alloy_eips::{eip2718::Encodable2718, eip2930::AccessList};
use alloy_primitives::{Address, Bytes, Signature, TxKind, B256, U256};
use alloy_signer::SignerSync;
use std::sync::Arc;

/// The kind of rollup unit operation a transaction performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmissionKind {
    /// Commits a batch.
    CommitBatch,
    /// Finalizes a single batch.
    FinalizeBatch,
    /// Finalizes a bundle of batches.
    FinalizeBundle,
}

/// The context of a submission, echoed back on its [`Confirmation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxContext {
    /// The kind of operation.
    pub kind: SubmissionKind,
    /// The hash of the batch or bundle the operation applies to.
    pub unit_hash: B256,
}

/// A request to deliver a transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxRequest {
    /// The correlation id of the submission, unique among in-flight transactions.
    pub id: String,
    /// The context of the submission.
    pub context: TxContext,
    /// The target contract.
    pub to: Address,
    /// The value transferred.
    pub value: U256,
    /// The calldata.
    pub data: Bytes,
    /// The lower bound of the gas limit.
    pub min_gas_limit: u64,
}

/// The terminal outcome of a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Confirmation {
    /// The correlation id of the submission.
    pub id: String,
    /// The context of the submission.
    pub context: TxContext,
    /// Whether the transaction succeeded.
    pub success: bool,
    /// The hash of the included transaction.
    pub tx_hash: B256,
}

/// A submitted transaction awaiting a final receipt.
#[derive(Debug, Clone)]
pub(crate) struct PendingTransaction {
    pub(crate) request: TxRequest,
    pub(crate) account: Arc<Account>,
    pub(crate) nonce: u64,
    pub(crate) gas_limit: u64,
    pub(crate) fees: GasFees,
    pub(crate) tx_hash: B256,
    /// The latest block number when the transaction was last broadcast.
    pub(crate) submit_block: u64,
}

/// The fields of a transaction ahead of signing.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UnsignedFields {
    pub(crate) chain_id: u64,
    pub(crate) tx_type: TxType,
    pub(crate) nonce: u64,
    pub(crate) gas_limit: u64,
    pub(crate) fees: GasFees,
}

/// Builds and signs the transaction, returning its EIP-2718 encoding and hash.
pub(crate) fn sign_transaction(
    account: &Account,
    fields: UnsignedFields,
    to: Address,
    value: U256,
    input: Bytes,
) -> Result<(Bytes, B256), SenderError> {
    let UnsignedFields { chain_id, tx_type, nonce, gas_limit, fees } = fields;
    let envelope = match (tx_type, fees) {
        (_, GasFees::Dynamic { max_priority_fee_per_gas, max_fee_per_gas }) => sign(
            account,
            TxEip1559 {
                chain_id,
                nonce,
                gas_limit,
                max_fee_per_gas,
                max_priority_fee_per_gas,
                to: TxKind::Call(to),
                value,
                access_list: AccessList::default(),
                input,
            },
        )?,
        (TxType::AccessListTx, GasFees::Legacy { gas_price }) => sign(
            account,
            TxEip2930 {
                chain_id,
                nonce,
                gas_price,
                gas_limit,
                to: TxKind::Call(to),
                value,
                access_list: AccessList::default(),
                input,
            },
        )?,
        (_, GasFees::Legacy { gas_price }) => sign(
            account,
            TxLegacy {
                chain_id: Some(chain_id),
                nonce,
                gas_price,
                gas_limit,
                to: TxKind::Call(to),
                value,
                input,
            },
        )?,
    };
    Ok((envelope.encoded_2718().into(), *envelope.tx_hash()))
}

fn sign<T>(account: &Account, tx: T) -> Result<TxEnvelope, SenderError>
where
    T: SignableTransaction<Signature>,
    TxEnvelope: From<Signed<T>>,
{
    let signature = account.signer().sign_hash_sync(&tx.signature_hash())?;
    Ok(tx.into_signed(signature).into())
}
