use crate::accounting::ledger;
use crate::error::ErrorCode;
use crate::states::*;
use anchor_lang::prelude::*;

/// Accounts context for `import_stake`.
#[derive(Accounts)]
pub struct ImportStake<'info> {
    /// Admin; pays rent for the imported position.
    #[account(
        mut,
        constraint = staking_config.is_admin(&owner.key()) @ ErrorCode::Unauthorized
    )]
    pub owner: Signer<'info>,

    /// CHECK: Supporter identity, used as a seed only.
    pub staker: UncheckedAccount<'info>,

    /// CHECK: Talent identity, used as a seed only.
    pub talent: UncheckedAccount<'info>,

    #[account(
        seeds = [STAKING_CONFIG_SEED.as_bytes()],
        bump = staking_config.bump,
    )]
    pub staking_config: Account<'info, StakingConfig>,

    #[account(
        init_if_needed,
        seeds = [TALENT_STATE_SEED.as_bytes(), talent.key().as_ref()],
        bump,
        payer = owner,
        space = TalentState::LEN
    )]
    pub talent_state: Account<'info, TalentState>,

    #[account(
        init_if_needed,
        seeds = [
            STAKE_POSITION_SEED.as_bytes(),
            staker.key().as_ref(),
            talent.key().as_ref()
        ],
        bump,
        payer = owner,
        space = StakePosition::LEN
    )]
    pub stake_position: Account<'info, StakePosition>,

    pub system_program: Program<'info, System>,
}

/// Writes one position verbatim from another deployment.
///
/// Global totals arrive separately through `set_accumulated_state` and
/// `set_realtime_state`; the talent's stake and supply totals are summed up
/// from the imported positions.
pub fn import_stake(
    ctx: Context<ImportStake>,
    amount: u64,
    shares: u128,
    s_snapshot: u128,
    claimable: u64,
    total_claimed: u64,
    talent_amount: u64,
) -> Result<()> {
    let accounts = ctx.accounts;
    accounts.talent_state.bump = ctx.bumps.talent_state;
    accounts.stake_position.bump = ctx.bumps.stake_position;

    let staker = accounts.staker.key();
    let talent = accounts.talent.key();
    ledger::import_stake(
        &accounts.staking_config,
        &mut accounts.talent_state,
        &mut accounts.stake_position,
        staker,
        talent,
        amount,
        shares,
        s_snapshot,
        claimable,
        total_claimed,
        talent_amount,
    )?;

    emit!(StakeImported {
        staker,
        talent,
        amount,
        shares,
    });
    Ok(())
}
