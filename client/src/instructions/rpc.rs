use anyhow::{format_err, Result};
use colorful::Colorful;
use solana_client::{
    client_error::ClientError, rpc_client::RpcClient, rpc_config::RpcSendTransactionConfig,
};
use solana_sdk::{
    commitment_config::CommitmentConfig,
    instruction::Instruction,
    signature::{Keypair, Signature, Signer},
    transaction::{Transaction, TransactionError},
};

fn send_txn(
    client: &RpcClient,
    txn: &Transaction,
    wait_confirm: bool,
) -> std::result::Result<Signature, ClientError> {
    client.send_and_confirm_transaction_with_spinner_and_config(
        txn,
        if wait_confirm {
            CommitmentConfig::confirmed()
        } else {
            CommitmentConfig::processed()
        },
        RpcSendTransactionConfig::default(),
    )
}

/// A program rejection is final; anything else (expired blockhash, dropped
/// transaction, RPC hiccup) is worth another attempt.
fn is_retryable(err: &ClientError) -> bool {
    !matches!(
        err.get_transaction_error(),
        Some(TransactionError::InstructionError(_, _))
    )
}

/// Runs `op` up to `attempts` times, stopping at the first success or at the
/// first error `retryable` refuses.
pub fn with_retries<T, E>(
    attempts: usize,
    retryable: impl Fn(&E) -> bool,
    mut op: impl FnMut(usize) -> std::result::Result<T, E>,
) -> std::result::Result<T, E> {
    let mut attempt = 1;
    loop {
        match op(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if attempt < attempts && retryable(&err) => attempt += 1,
            Err(err) => return Err(err),
        }
    }
}

/// Signs `instructions` with a fresh blockhash on every attempt and sends them.
pub fn send_with_retry(
    client: &RpcClient,
    instructions: &[Instruction],
    payer: &Keypair,
    signers: &[&Keypair],
    attempts: usize,
) -> Result<Signature> {
    with_retries(attempts.max(1), is_retryable, |attempt| {
        if attempt > 1 {
            println!("{} {}", "retrying, attempt".yellow(), attempt);
        }
        let recent_hash = client.get_latest_blockhash()?;
        let txn = Transaction::new_signed_with_payer(
            instructions,
            Some(&payer.pubkey()),
            signers,
            recent_hash,
        );
        send_txn(client, &txn, true)
    })
    .map_err(|err| format_err!("transaction failed: {}", err))
}
