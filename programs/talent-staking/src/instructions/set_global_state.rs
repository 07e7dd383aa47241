use crate::accounting::ledger;
use crate::error::ErrorCode;
use crate::states::*;
use anchor_lang::prelude::*;

/// Accounts context for the raw global-state writes used during migration.
#[derive(Accounts)]
pub struct SetGlobalState<'info> {
    #[account(
        constraint = staking_config.is_admin(&owner.key()) @ ErrorCode::Unauthorized
    )]
    pub owner: Signer<'info>,

    #[account(
        seeds = [STAKING_CONFIG_SEED.as_bytes()],
        bump = staking_config.bump,
    )]
    pub staking_config: Account<'info, StakingConfig>,

    #[account(
        mut,
        seeds = [STAKING_STATE_SEED.as_bytes()],
        bump = staking_state.bump,
    )]
    pub staking_state: Account<'info, StakingState>,
}

/// Overwrites the accumulated counters with values carried over from
/// another deployment.
pub fn set_accumulated_state(
    ctx: Context<SetGlobalState>,
    active_stakes: u64,
    total_stable_stored: u64,
    total_tokens_staked: u64,
    rewards_given: u64,
) -> Result<()> {
    let accounts = ctx.accounts;
    ledger::set_accumulated_state(
        &accounts.staking_config,
        &mut accounts.staking_state,
        active_stakes,
        total_stable_stored,
        total_tokens_staked,
        rewards_given,
    )?;

    emit!(AccumulatedStateSet {
        active_stakes,
        total_stable_stored,
        total_tokens_staked,
        rewards_given,
    });
    Ok(())
}

/// Overwrites the accumulator `S`, its timestamp and the share total.
pub fn set_realtime_state(
    ctx: Context<SetGlobalState>,
    s: u128,
    s_at: u64,
    total_adjusted_shares: u128,
) -> Result<()> {
    let accounts = ctx.accounts;
    ledger::set_realtime_state(
        &accounts.staking_config,
        &mut accounts.staking_state,
        s,
        s_at,
        total_adjusted_shares,
    )?;

    emit!(RealtimeStateSet {
        s,
        s_at,
        total_adjusted_shares,
    });
    Ok(())
}
