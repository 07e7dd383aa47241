use crate::accounting::RewardCalculator;
use crate::error::ErrorCode;
use crate::states::*;
use anchor_lang::prelude::*;
use anchor_spl::token_interface::Mint;
use std::ops::DerefMut;

/// Accounts context for `initialise_configs`.
///
/// Creates the two singleton accounts of the program: the staking
/// configuration and the global accounting state.
#[derive(Accounts)]
pub struct InitialiseConfigs<'info> {
    /// Program-level admin; funds both accounts.
    #[account(
        mut,
        address = crate::admin::id() @ ErrorCode::Unauthorized
    )]
    pub owner: Signer<'info>,

    #[account(
        init,
        seeds = [STAKING_CONFIG_SEED.as_bytes()],
        bump,
        payer = owner,
        space = StakingConfig::LEN
    )]
    pub staking_config: Account<'info, StakingConfig>,

    #[account(
        init,
        seeds = [STAKING_STATE_SEED.as_bytes()],
        bump,
        payer = owner,
        space = StakingState::LEN
    )]
    pub staking_state: Account<'info, StakingState>,

    /// Stable coin accepted by `stake_stable`. Only its address is recorded.
    pub stable_coin: Box<InterfaceAccount<'info, Mint>>,

    pub system_program: Program<'info, System>,
}

/// Writes the staking window, budget and pricing, and derives the emission rate.
///
/// With `migration` set the instance starts closed to the public so that an
/// existing deployment can be transplanted into it first.
///
/// # Errors
/// - `InvalidWindow`: `end <= start`.
/// - `InvalidParam`: zero budget or price, `talent_reward_bps > 10_000`, or
///   `token_decimals > 18`.
pub fn initialise_configs(
    ctx: Context<InitialiseConfigs>,
    admin: Pubkey,
    factory: Pubkey,
    start: u64,
    end: u64,
    rewards_max: u64,
    token_price: u64,
    talent_price: u64,
    token_decimals: u8,
    talent_reward_bps: u64,
    talent_supply_max: u64,
    migration: bool,
) -> Result<()> {
    require!(start < end, ErrorCode::InvalidWindow);
    require!(rewards_max > 0, ErrorCode::InvalidParam);
    require!(token_price > 0 && talent_price > 0, ErrorCode::InvalidParam);
    require!(talent_reward_bps <= BPS_DENOMINATOR, ErrorCode::InvalidParam);
    require!(token_decimals <= MAX_TOKEN_DECIMALS, ErrorCode::InvalidParam);
    require_keys_neq!(admin, Pubkey::default());

    let s_precision = 10u128.pow(u32::from(token_decimals));
    let reward_rate = RewardCalculator::reward_rate(rewards_max, s_precision, end - start)
        .ok_or(ErrorCode::MathOverflow)?;

    let staking_config = ctx.accounts.staking_config.deref_mut();
    staking_config.bump = ctx.bumps.staking_config;
    staking_config.admin = admin;
    staking_config.stable_coin = ctx.accounts.stable_coin.key();
    staking_config.factory = factory;
    staking_config.start = start;
    staking_config.end = end;
    staking_config.rewards_max = rewards_max;
    staking_config.reward_rate = reward_rate;
    staking_config.token_price = token_price;
    staking_config.talent_price = talent_price;
    staking_config.token_decimals = token_decimals;
    staking_config.s_precision = s_precision;
    staking_config.talent_reward_bps = talent_reward_bps;
    staking_config.talent_supply_max = talent_supply_max;
    staking_config.migration_open = migration;
    msg!("Staking config initialized");

    let staking_state = ctx.accounts.staking_state.deref_mut();
    staking_state.bump = ctx.bumps.staking_state;
    staking_state.s_at = start;

    emit!(StakingConfigInitialized {
        admin,
        stable_coin: ctx.accounts.stable_coin.key(),
        factory,
        start,
        end,
        rewards_max,
        reward_rate,
        token_price,
        talent_price,
        token_decimals,
        talent_reward_bps,
        talent_supply_max,
        migration_open: migration,
    });
    Ok(())
}
