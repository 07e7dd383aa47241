#![allow(clippy::result_large_err)]
#![allow(clippy::too_many_arguments)]

use anchor_lang::prelude::*;

#[cfg(not(feature = "no-entrypoint"))]
solana_security_txt::security_txt! {
    name: "Talent Staking",
    project_url: "https://github.com/talent-protocol/talent-staking",
    contacts: "email:security@talentprotocol.com",
    policy: "",
    preferred_languages: "en",
    auditors: ""
}

declare_id!("EU7vtYAygw2PNEA5kZ9GG7KLLvAuru1RAEEDJYjSv9po");

pub mod admin {
    use anchor_lang::prelude::declare_id;
    declare_id!("2wPXxPFqodES6KbYmvjz8AAhAyzDv9MmVyrW7Aguchtu");
}

pub mod accounting;
pub mod error;
pub mod instructions;
pub mod states;
pub mod utils;

use instructions::*;

#[program]
pub mod talent_staking {

    use super::*;

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
        instructions::initialise_configs(
            ctx,
            admin,
            factory,
            start,
            end,
            rewards_max,
            token_price,
            talent_price,
            token_decimals,
            talent_reward_bps,
            talent_supply_max,
            migration,
        )
    }

    pub fn update_config(ctx: Context<UpdateConfig>, param: u8, value: u64) -> Result<()> {
        instructions::update_config(ctx, param, value)
    }

    pub fn stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
        instructions::stake(ctx, amount)
    }

    pub fn stake_stable(ctx: Context<Stake>, stable_amount: u64) -> Result<()> {
        instructions::stake_stable(ctx, stable_amount)
    }

    pub fn unstake(ctx: Context<Unstake>, amount: u64) -> Result<()> {
        instructions::unstake(ctx, amount)
    }

    pub fn claim(ctx: Context<Claim>) -> Result<()> {
        instructions::claim(ctx)
    }

    pub fn withdraw_talent_rewards(ctx: Context<WithdrawTalentRewards>) -> Result<()> {
        instructions::withdraw_talent_rewards(ctx)
    }

    // migration instructions
    pub fn set_accumulated_state(
        ctx: Context<SetGlobalState>,
        active_stakes: u64,
        total_stable_stored: u64,
        total_tokens_staked: u64,
        rewards_given: u64,
    ) -> Result<()> {
        instructions::set_accumulated_state(
            ctx,
            active_stakes,
            total_stable_stored,
            total_tokens_staked,
            rewards_given,
        )
    }

    pub fn set_realtime_state(
        ctx: Context<SetGlobalState>,
        s: u128,
        s_at: u64,
        total_adjusted_shares: u128,
    ) -> Result<()> {
        instructions::set_realtime_state(ctx, s, s_at, total_adjusted_shares)
    }

    pub fn set_talent_state(
        ctx: Context<SetTalentState>,
        talent_redeemable_rewards: u64,
        max_s_for_talent: u128,
    ) -> Result<()> {
        instructions::set_talent_state(ctx, talent_redeemable_rewards, max_s_for_talent)
    }

    pub fn import_stake(
        ctx: Context<ImportStake>,
        amount: u64,
        shares: u128,
        s_snapshot: u128,
        claimable: u64,
        total_claimed: u64,
        talent_amount: u64,
    ) -> Result<()> {
        instructions::import_stake(
            ctx,
            amount,
            shares,
            s_snapshot,
            claimable,
            total_claimed,
            talent_amount,
        )
    }

    pub fn transfer_stake(ctx: Context<TransferStake>) -> Result<()> {
        instructions::transfer_stake(ctx)
    }

    pub fn emit_stake_event(
        ctx: Context<ReplayEvent>,
        staker: Pubkey,
        talent: Pubkey,
        amount: u64,
        timestamp: u64,
    ) -> Result<()> {
        instructions::emit_stake_event(ctx, staker, talent, amount, timestamp)
    }

    pub fn emit_rewards_claim_event(
        ctx: Context<ReplayEvent>,
        staker: Pubkey,
        talent: Pubkey,
        amount: u64,
        timestamp: u64,
    ) -> Result<()> {
        instructions::emit_rewards_claim_event(ctx, staker, talent, amount, timestamp)
    }

    pub fn finish_migration(ctx: Context<FinishMigration>) -> Result<()> {
        instructions::finish_migration(ctx)
    }
}
