use crate::accounting::ledger;
use crate::states::*;
use crate::utils::current_timestamp;
use anchor_lang::prelude::*;

/// Accounts context for `claim`.
#[derive(Accounts)]
pub struct Claim<'info> {
    pub staker: Signer<'info>,

    /// CHECK: Talent identity, bound through the PDA seeds below.
    pub talent: UncheckedAccount<'info>,

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

    #[account(
        mut,
        seeds = [TALENT_STATE_SEED.as_bytes(), talent.key().as_ref()],
        bump = talent_state.bump,
    )]
    pub talent_state: Account<'info, TalentState>,

    #[account(
        mut,
        seeds = [
            STAKE_POSITION_SEED.as_bytes(),
            staker.key().as_ref(),
            talent.key().as_ref()
        ],
        bump = stake_position.bump,
    )]
    pub stake_position: Account<'info, StakePosition>,
}

/// Settles the caller's position and pays out everything claimable.
pub fn claim(ctx: Context<Claim>) -> Result<()> {
    let now = current_timestamp()?;
    let accounts = ctx.accounts;

    let payout = ledger::claim(
        &accounts.staking_config,
        &mut accounts.staking_state,
        &mut accounts.talent_state,
        &mut accounts.stake_position,
        now,
    )?;

    #[cfg(feature = "enable-log")]
    msg!("claim: paid {}", payout);
    emit!(RewardClaimEvent {
        staker: accounts.staker.key(),
        talent: accounts.talent.key(),
        amount: payout,
        timestamp: now,
    });
    Ok(())
}
