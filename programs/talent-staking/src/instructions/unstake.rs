use crate::accounting::ledger;
use crate::states::*;
use crate::utils::current_timestamp;
use anchor_lang::prelude::*;

/// Accounts context for `unstake`.
#[derive(Accounts)]
pub struct Unstake<'info> {
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

/// Withdraws `amount` token units from the caller's position.
///
/// Allowed at any time, including after the window closed. The pending reward
/// is settled into `claimable` before the shares shrink.
pub fn unstake(ctx: Context<Unstake>, amount: u64) -> Result<()> {
    let now = current_timestamp()?;
    let accounts = ctx.accounts;

    let receipt = ledger::unstake(
        &accounts.staking_config,
        &mut accounts.staking_state,
        &mut accounts.talent_state,
        &mut accounts.stake_position,
        amount,
        now,
    )?;

    #[cfg(feature = "enable-log")]
    msg!(
        "unstake: tokens {}, talent tokens released {}, settled {}",
        receipt.tokens,
        receipt.talent_released,
        receipt.settlement.reward
    );
    emit!(UnstakeEvent {
        staker: accounts.staker.key(),
        talent: accounts.talent.key(),
        amount: receipt.tokens,
        timestamp: now,
    });
    Ok(())
}
