use crate::error::ErrorCode;
use crate::states::{ConfigUpdated, StakingConfig, BPS_DENOMINATOR, STAKING_CONFIG_SEED};
use anchor_lang::prelude::*;

/// Accounts context for the `update_config` instruction.
#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    /// Stored admin or the program-level admin.
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

/// Updates one configuration field.
///
/// # Param Mapping
/// - `0`: **admin** from `remaining_accounts[0]`.
/// - `1`: **token_price** (non-zero).
/// - `2`: **talent_price** (non-zero).
/// - `3`: **talent_reward_bps** (at most `10_000`).
/// - `4`: **talent_supply_max** (`0` = unlimited).
///
/// The window, budget and decimals are fixed at initialization because the
/// emission rate and accumulator scale are derived from them.
pub fn update_config(ctx: Context<UpdateConfig>, param: u8, value: u64) -> Result<()> {
    let staking_config = &mut ctx.accounts.staking_config;
    match param {
        0 => {
            let new_admin = *ctx
                .remaining_accounts
                .iter()
                .next()
                .ok_or(error!(ErrorCode::MissingRemainingAccount))?
                .key;
            require_keys_neq!(new_admin, Pubkey::default());
            staking_config.admin = new_admin;
        }
        1 => {
            require!(value > 0, ErrorCode::InvalidParam);
            staking_config.token_price = value;
        }
        2 => {
            require!(value > 0, ErrorCode::InvalidParam);
            staking_config.talent_price = value;
        }
        3 => {
            require!(value <= BPS_DENOMINATOR, ErrorCode::InvalidParam);
            staking_config.talent_reward_bps = value;
        }
        4 => {
            staking_config.talent_supply_max = value;
        }
        _ => return Err(error!(ErrorCode::InvalidParam)),
    }

    emit!(ConfigUpdated {
        admin: staking_config.admin,
        token_price: staking_config.token_price,
        talent_price: staking_config.talent_price,
        talent_reward_bps: staking_config.talent_reward_bps,
        talent_supply_max: staking_config.talent_supply_max,
    });
    Ok(())
}
