use crate::accounting::ledger;
use crate::error::ErrorCode;
use crate::states::*;
use anchor_lang::prelude::*;

/// Accounts context for `finish_migration`.
#[derive(Accounts)]
pub struct FinishMigration<'info> {
    #[account(
        constraint = staking_config.is_admin(&owner.key()) @ ErrorCode::Unauthorized
    )]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [STAKING_CONFIG_SEED.as_bytes()],
        bump = staking_config.bump,
    )]
    pub staking_config: Account<'info, StakingConfig>,
}

/// Closes the migration window. It cannot be reopened.
pub fn finish_migration(ctx: Context<FinishMigration>) -> Result<()> {
    let staking_config = &mut ctx.accounts.staking_config;
    ledger::finish_migration(staking_config)?;
    msg!("Migration finished, staking is open");

    emit!(MigrationFinished {
        stake_events_replayed: staking_config.stake_events_replayed,
        claim_events_replayed: staking_config.claim_events_replayed,
    });
    Ok(())
}
