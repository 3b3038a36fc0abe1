use crate::contracts::Erc20Token;
use crate::task::{BeraClient, TaskContext};
use crate::utils::gas::Fees;
use anyhow::{bail, Context, Result};
use ethers::abi::Detokenize;
use ethers::prelude::*;
use std::sync::Arc;
use tracing::{debug, info};

/// Calldata of a bound contract call, ready to go into a request.
pub fn calldata<M: Middleware, D: Detokenize>(call: &ContractCall<M, D>) -> Result<Bytes> {
    call.calldata().context("Contract call has no calldata")
}

/// Submit `tx`, wait for one confirmation, and turn a status-0 receipt into an
/// error that classifies as a call exception.
pub async fn send_and_confirm(
    ctx: &TaskContext,
    client: &BeraClient,
    tx: Eip1559TransactionRequest,
    label: &str,
) -> Result<TransactionReceipt> {
    let tx = tx.from(client.address());
    let pending = client
        .send_transaction(tx, None)
        .await
        .with_context(|| format!("Failed to send {}", label))?;

    let hash = pending.tx_hash();
    debug!("{} sent: {}", label, ctx.config.chain().tx_link(&format!("{:?}", hash)));

    let receipt = pending
        .await
        .with_context(|| format!("{} dropped before confirmation", label))?
        .with_context(|| format!("No receipt for {}", label))?;

    if receipt.status != Some(U64::from(1)) {
        bail!(
            "CALL_EXCEPTION: {} reverted in tx {:?}",
            label,
            receipt.transaction_hash
        );
    }

    info!(
        "{} confirmed in block {}: {}",
        label,
        receipt.block_number.unwrap_or_default(),
        ctx.config
            .chain()
            .tx_link(&format!("{:?}", receipt.transaction_hash))
    );
    Ok(receipt)
}

pub fn hash_of(receipt: &TransactionReceipt) -> String {
    format!("{:?}", receipt.transaction_hash)
}

/// Approve `spender` for the max amount when the current allowance is below
/// one whole token. Returns whether an approval was sent.
pub async fn approve_if_needed(
    ctx: &TaskContext,
    client: &Arc<BeraClient>,
    token: Address,
    spender: Address,
    fees: Option<Fees>,
) -> Result<bool> {
    let erc20 = Erc20Token::new(token, client.clone());
    let owner = client.address();

    let decimals = erc20.decimals().call().await.unwrap_or(18);
    let one_token = U256::exp10(decimals as usize);

    let allowance = erc20.allowance(owner, spender).call().await?;
    if allowance >= one_token {
        debug!("{:?} already approved for {:?}", token, spender);
        return Ok(false);
    }

    let call = erc20.approve(spender, U256::MAX);
    let mut tx = Eip1559TransactionRequest::new()
        .to(token)
        .data(calldata(&call)?);
    if let Some(fees) = fees {
        tx = fees.apply(tx);
    }

    send_and_confirm(ctx, client, tx, "approve").await?;
    tokio::time::sleep(ctx.config.tx_pacing()).await;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_calldata_of_bound_call() {
        let provider = Provider::<Http>::try_from("http://127.0.0.1:8545").unwrap();
        let token = Erc20Token::new(Address::repeat_byte(0x11), Arc::new(provider));
        let call = token.approve(Address::repeat_byte(0x22), U256::MAX);

        let data = calldata(&call).unwrap();
        // approve(address,uint256)
        assert_eq!(&data[..4], &[0x09, 0x5e, 0xa7, 0xb3]);
        assert_eq!(data.len(), 4 + 32 * 2);
    }
}
