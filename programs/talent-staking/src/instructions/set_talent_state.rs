use crate::accounting::ledger;
use crate::error::ErrorCode;
use crate::states::*;
use anchor_lang::prelude::*;

/// Accounts context for `set_talent_state`.
#[derive(Accounts)]
pub struct SetTalentState<'info> {
    #[account(
        mut,
        constraint = staking_config.is_admin(&owner.key()) @ ErrorCode::Unauthorized
    )]
    pub owner: Signer<'info>,

    /// CHECK: Talent identity, used as a seed and recorded in the talent state.
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

    pub system_program: Program<'info, System>,
}

/// Writes a talent's redeemable rewards and accrual cap.
///
/// Stake and supply totals are left alone; they are rebuilt by `import_stake`.
pub fn set_talent_state(
    ctx: Context<SetTalentState>,
    talent_redeemable_rewards: u64,
    max_s_for_talent: u128,
) -> Result<()> {
    let accounts = ctx.accounts;
    accounts.talent_state.bump = ctx.bumps.talent_state;

    let talent = accounts.talent.key();
    ledger::set_talent_state(
        &accounts.staking_config,
        &mut accounts.talent_state,
        talent,
        talent_redeemable_rewards,
        max_s_for_talent,
    )?;

    emit!(TalentStateSet {
        talent,
        talent_redeemable_rewards,
        max_s_for_talent,
    });
    Ok(())
}
