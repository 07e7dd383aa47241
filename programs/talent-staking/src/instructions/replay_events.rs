use crate::accounting::ledger;
use crate::error::ErrorCode;
use crate::states::*;
use anchor_lang::prelude::*;

/// Accounts context for replaying historical events.
#[derive(Accounts)]
pub struct ReplayEvent<'info> {
    #[account(
        constraint = staking_config.is_admin(&owner.key()) @ ErrorCode::Unauthorized
    )]
    pub owner: Signer<'info>,

    /// Holds the replay counters.
    #[account(
        mut,
        seeds = [STAKING_CONFIG_SEED.as_bytes()],
        bump = staking_config.bump,
    )]
    pub staking_config: Account<'info, StakingConfig>,
}

/// Re-emits a historical `StakeEvent` exactly as given.
///
/// No accounting state changes. `stake_events_replayed` counts the calls so an
/// interrupted replay can resume where it stopped.
pub fn emit_stake_event(
    ctx: Context<ReplayEvent>,
    staker: Pubkey,
    talent: Pubkey,
    amount: u64,
    timestamp: u64,
) -> Result<()> {
    let replayed = ledger::replay_stake_event(&mut ctx.accounts.staking_config)?;
    msg!("Replayed stake event #{}", replayed);

    emit!(StakeEvent {
        staker,
        talent,
        amount,
        timestamp,
    });
    Ok(())
}

/// Re-emits a historical `RewardClaimEvent` exactly as given.
pub fn emit_rewards_claim_event(
    ctx: Context<ReplayEvent>,
    staker: Pubkey,
    talent: Pubkey,
    amount: u64,
    timestamp: u64,
) -> Result<()> {
    let replayed = ledger::replay_claim_event(&mut ctx.accounts.staking_config)?;
    msg!("Replayed claim event #{}", replayed);

    emit!(RewardClaimEvent {
        staker,
        talent,
        amount,
        timestamp,
    });
    Ok(())
}
