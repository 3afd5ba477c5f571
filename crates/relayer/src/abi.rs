//! Calls to the rollup contract on L1.

use alloy_sol_types::sol;

sol! {
    #[derive(Debug)]
    function commitBatch(
        uint8 version,
        bytes calldata parent_batch_header,
        bytes[] memory chunks,
        bytes calldata skipped_l1_message_bitmap
    ) external;

    #[derive(Debug)]
    function finalizeBatch(
        bytes calldata batch_header,
        bytes32 prev_state_root,
        bytes32 post_state_root,
        bytes32 withdraw_root
    ) external;

    #[derive(Debug)]
    function finalizeBatchWithProof(
        bytes calldata batch_header,
        bytes32 prev_state_root,
        bytes32 post_state_root,
        bytes32 withdraw_root,
        bytes calldata aggr_proof
    ) external;

    #[derive(Debug)]
    function finalizeBundle(
        bytes calldata batch_header,
        bytes32 post_state_root,
        bytes32 withdraw_root
    ) external;

    #[derive(Debug)]
    function finalizeBundleWithProof(
        bytes calldata batch_header,
        bytes32 post_state_root,
        bytes32 withdraw_root,
        bytes calldata aggr_proof
    ) external;
}
