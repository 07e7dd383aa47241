use crate::accounting::ledger;
use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::current_timestamp;
use anchor_lang::prelude::*;

/// Accounts context for `transfer_stake`.
#[derive(Accounts)]
pub struct TransferStake<'info> {
    /// Admin; pays rent if the destination position does not exist yet.
    #[account(
        mut,
        constraint = staking_config.is_admin(&owner.key()) @ ErrorCode::Unauthorized
    )]
    pub owner: Signer<'info>,

    /// CHECK: Current owner of the position, used as a seed only.
    pub from_staker: UncheckedAccount<'info>,

    /// CHECK: New owner of the position, used as a seed only.
    pub to_staker: UncheckedAccount<'info>,

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
            from_staker.key().as_ref(),
            talent.key().as_ref()
        ],
        bump = from_position.bump,
    )]
    pub from_position: Account<'info, StakePosition>,

    #[account(
        init_if_needed,
        seeds = [
            STAKE_POSITION_SEED.as_bytes(),
            to_staker.key().as_ref(),
            talent.key().as_ref()
        ],
        bump,
        payer = owner,
        space = StakePosition::LEN
    )]
    pub to_position: Account<'info, StakePosition>,

    pub system_program: Program<'info, System>,
}

/// Moves a whole position to another supporter on the same talent.
///
/// Both positions are settled at the current `S` first, so accrued rewards
/// travel with the stake and the destination's own rewards are preserved.
pub fn transfer_stake(ctx: Context<TransferStake>) -> Result<()> {
    let now = current_timestamp()?;
    let accounts = ctx.accounts;
    accounts.to_position.bump = ctx.bumps.to_position;

    let to_staker = accounts.to_staker.key();
    let moved = ledger::transfer_stake(
        &accounts.staking_config,
        &mut accounts.staking_state,
        &mut accounts.talent_state,
        &mut accounts.from_position,
        &mut accounts.to_position,
        to_staker,
        now,
    )?;

    #[cfg(feature = "enable-log")]
    msg!("transfer_stake: moved {}", moved);
    emit!(StakeTransferred {
        from: accounts.from_staker.key(),
        to: to_staker,
        talent: accounts.talent.key(),
        amount: moved,
    });
    Ok(())
}
