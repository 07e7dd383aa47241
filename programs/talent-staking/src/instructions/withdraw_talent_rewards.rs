use crate::accounting::ledger;
use crate::states::*;
use crate::utils::current_timestamp;
use anchor_lang::prelude::*;

/// Accounts context for `withdraw_talent_rewards`.
#[derive(Accounts)]
pub struct WithdrawTalentRewards<'info> {
    /// The talent itself.
    pub talent: Signer<'info>,

    #[account(
        seeds = [STAKING_CONFIG_SEED.as_bytes()],
        bump = staking_config.bump,
    )]
    pub staking_config: Account<'info, StakingConfig>,

    #[account(
        mut,
        seeds = [TALENT_STATE_SEED.as_bytes(), talent.key().as_ref()],
        bump = talent_state.bump,
    )]
    pub talent_state: Account<'info, TalentState>,
}

/// Pays the talent its realized share of supporter rewards.
///
/// Only already-settled amounts are withdrawn; supporters' pending rewards are
/// credited to the talent when their positions next settle.
pub fn withdraw_talent_rewards(ctx: Context<WithdrawTalentRewards>) -> Result<()> {
    let now = current_timestamp()?;
    let accounts = ctx.accounts;

    let payout = ledger::withdraw_talent_rewards(&accounts.staking_config, &mut accounts.talent_state)?;

    emit!(RewardClaimEvent {
        staker: accounts.talent.key(),
        talent: accounts.talent.key(),
        amount: payout,
        timestamp: now,
    });
    Ok(())
}
