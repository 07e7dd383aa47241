use crate::accounting::ledger;
use crate::instructions::Stake;
use crate::utils::current_timestamp;
use anchor_lang::prelude::*;

/// Stakes `stable_amount` of the stable coin, converted at `token_price`.
///
/// Uses the same accounts as `stake`. The deposit is added to
/// `total_stable_stored` and the converted token amount is staked.
pub fn stake_stable(ctx: Context<Stake>, stable_amount: u64) -> Result<()> {
    let now = current_timestamp()?;
    let accounts = ctx.accounts;
    accounts.record_bumps(&ctx.bumps);

    let staker = accounts.staker.key();
    let talent = accounts.talent.key();
    let receipt = ledger::stake_stable(
        &accounts.staking_config,
        &mut accounts.staking_state,
        &mut accounts.talent_state,
        &mut accounts.stake_position,
        staker,
        talent,
        stable_amount,
        now,
    )?;

    #[cfg(feature = "enable-log")]
    msg!("stake_stable: {} stable for {} tokens", stable_amount, receipt.tokens);
    accounts.publish(&receipt, now);
    Ok(())
}
