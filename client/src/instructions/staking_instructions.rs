use anchor_lang::prelude::AccountMeta;
use anyhow::Result;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, system_program};

use talent_staking::accounts as staking_accounts;
use talent_staking::instruction as staking_instructions;

use crate::instructions::utils::{
    get_stake_position_address, get_staking_config_address, get_staking_state_address,
    get_talent_state_address, program_for,
};

use super::super::ClientConfig;

pub fn initialise_configs_instr(
    config: &ClientConfig,
    admin: Pubkey,
    stable_coin: Pubkey,
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
) -> Result<Vec<Instruction>> {
    // The program-level admin creates the singleton accounts.
    let program = program_for(config, config.talent_staking_program, &config.admin_path)?;

    let instructions = program
        .request()
        .accounts(staking_accounts::InitialiseConfigs {
            owner: program.payer(),
            staking_config: get_staking_config_address(&program.id()),
            staking_state: get_staking_state_address(&program.id()),
            stable_coin,
            system_program: system_program::id(),
        })
        .args(staking_instructions::InitialiseConfigs {
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
        })
        .instructions()?;
    Ok(instructions)
}

pub fn update_config_instr(
    config: &ClientConfig,
    param: u8,
    value: u64,
    new_admin: Option<Pubkey>,
) -> Result<Vec<Instruction>> {
    let program = program_for(config, config.talent_staking_program, &config.admin_path)?;

    let mut ixs = program
        .request()
        .accounts(staking_accounts::UpdateConfig {
            owner: program.payer(),
            staking_config: get_staking_config_address(&program.id()),
        })
        .args(staking_instructions::UpdateConfig { param, value })
        .instructions()?;

    if let Some(admin) = new_admin {
        ixs[0]
            .accounts
            .push(AccountMeta::new_readonly(admin, false));
    }

    Ok(ixs)
}

fn stake_accounts(program_id: &Pubkey, staker: Pubkey, talent: Pubkey) -> staking_accounts::Stake {
    staking_accounts::Stake {
        staker,
        talent,
        staking_config: get_staking_config_address(program_id),
        staking_state: get_staking_state_address(program_id),
        talent_state: get_talent_state_address(&talent, program_id),
        stake_position: get_stake_position_address(&staker, &talent, program_id),
        system_program: system_program::id(),
    }
}

pub fn stake_instr(config: &ClientConfig, talent: Pubkey, amount: u64) -> Result<Vec<Instruction>> {
    let program = program_for(config, config.talent_staking_program, &config.payer_path)?;

    let ixs = program
        .request()
        .accounts(stake_accounts(&program.id(), program.payer(), talent))
        .args(staking_instructions::Stake { amount })
        .instructions()?;
    Ok(ixs)
}

pub fn stake_stable_instr(
    config: &ClientConfig,
    talent: Pubkey,
    stable_amount: u64,
) -> Result<Vec<Instruction>> {
    let program = program_for(config, config.talent_staking_program, &config.payer_path)?;

    let ixs = program
        .request()
        .accounts(stake_accounts(&program.id(), program.payer(), talent))
        .args(staking_instructions::StakeStable { stable_amount })
        .instructions()?;
    Ok(ixs)
}

pub fn unstake_instr(config: &ClientConfig, talent: Pubkey, amount: u64) -> Result<Vec<Instruction>> {
    let program = program_for(config, config.talent_staking_program, &config.payer_path)?;
    let staker = program.payer();

    let ixs = program
        .request()
        .accounts(staking_accounts::Unstake {
            staker,
            talent,
            staking_config: get_staking_config_address(&program.id()),
            staking_state: get_staking_state_address(&program.id()),
            talent_state: get_talent_state_address(&talent, &program.id()),
            stake_position: get_stake_position_address(&staker, &talent, &program.id()),
        })
        .args(staking_instructions::Unstake { amount })
        .instructions()?;
    Ok(ixs)
}

pub fn claim_instr(config: &ClientConfig, talent: Pubkey) -> Result<Vec<Instruction>> {
    let program = program_for(config, config.talent_staking_program, &config.payer_path)?;
    let staker = program.payer();

    let ixs = program
        .request()
        .accounts(staking_accounts::Claim {
            staker,
            talent,
            staking_config: get_staking_config_address(&program.id()),
            staking_state: get_staking_state_address(&program.id()),
            talent_state: get_talent_state_address(&talent, &program.id()),
            stake_position: get_stake_position_address(&staker, &talent, &program.id()),
        })
        .args(staking_instructions::Claim {})
        .instructions()?;
    Ok(ixs)
}

/// The payer keypair acts as the talent.
pub fn withdraw_talent_rewards_instr(config: &ClientConfig) -> Result<Vec<Instruction>> {
    let program = program_for(config, config.talent_staking_program, &config.payer_path)?;
    let talent = program.payer();

    let ixs = program
        .request()
        .accounts(staking_accounts::WithdrawTalentRewards {
            talent,
            staking_config: get_staking_config_address(&program.id()),
            talent_state: get_talent_state_address(&talent, &program.id()),
        })
        .args(staking_instructions::WithdrawTalentRewards {})
        .instructions()?;
    Ok(ixs)
}
