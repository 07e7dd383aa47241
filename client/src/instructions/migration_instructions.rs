use anchor_client::Program;
use anyhow::Result;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, signature::Keypair, system_program};
use std::rc::Rc;

use talent_staking::accounts as staking_accounts;
use talent_staking::instruction as staking_instructions;

use crate::instructions::utils::{
    get_stake_position_address, get_staking_config_address, get_staking_state_address,
    get_talent_state_address,
};
use crate::snapshot::{GlobalSnapshot, PositionSnapshot, TalentSnapshot};

/// Admin-signed handle on the program being migrated into.
pub type AdminProgram = Program<Rc<Keypair>>;

fn global_state_accounts(program: &AdminProgram) -> staking_accounts::SetGlobalState {
    staking_accounts::SetGlobalState {
        owner: program.payer(),
        staking_config: get_staking_config_address(&program.id()),
        staking_state: get_staking_state_address(&program.id()),
    }
}

pub fn set_accumulated_state_instr(
    program: &AdminProgram,
    global: &GlobalSnapshot,
) -> Result<Vec<Instruction>> {
    let ixs = program
        .request()
        .accounts(global_state_accounts(program))
        .args(staking_instructions::SetAccumulatedState {
            active_stakes: global.active_stakes,
            total_stable_stored: global.total_stable_stored,
            total_tokens_staked: global.total_tokens_staked,
            rewards_given: global.rewards_given,
        })
        .instructions()?;
    Ok(ixs)
}

pub fn set_realtime_state_instr(
    program: &AdminProgram,
    global: &GlobalSnapshot,
) -> Result<Vec<Instruction>> {
    let ixs = program
        .request()
        .accounts(global_state_accounts(program))
        .args(staking_instructions::SetRealtimeState {
            s: global.s,
            s_at: global.s_at,
            total_adjusted_shares: global.total_adjusted_shares,
        })
        .instructions()?;
    Ok(ixs)
}

pub fn set_talent_state_instr(
    program: &AdminProgram,
    talent: &TalentSnapshot,
) -> Result<Vec<Instruction>> {
    let ixs = program
        .request()
        .accounts(staking_accounts::SetTalentState {
            owner: program.payer(),
            talent: talent.talent,
            staking_config: get_staking_config_address(&program.id()),
            talent_state: get_talent_state_address(&talent.talent, &program.id()),
            system_program: system_program::id(),
        })
        .args(staking_instructions::SetTalentState {
            talent_redeemable_rewards: talent.talent_redeemable_rewards,
            max_s_for_talent: talent.max_s_for_talent,
        })
        .instructions()?;
    Ok(ixs)
}

pub fn import_stake_instr(
    program: &AdminProgram,
    position: &PositionSnapshot,
) -> Result<Vec<Instruction>> {
    let ixs = program
        .request()
        .accounts(staking_accounts::ImportStake {
            owner: program.payer(),
            staker: position.staker,
            talent: position.talent,
            staking_config: get_staking_config_address(&program.id()),
            talent_state: get_talent_state_address(&position.talent, &program.id()),
            stake_position: get_stake_position_address(
                &position.staker,
                &position.talent,
                &program.id(),
            ),
            system_program: system_program::id(),
        })
        .args(staking_instructions::ImportStake {
            amount: position.amount,
            shares: position.shares,
            s_snapshot: position.s_snapshot,
            claimable: position.claimable,
            total_claimed: position.total_claimed,
            talent_amount: position.talent_amount,
        })
        .instructions()?;
    Ok(ixs)
}

pub fn transfer_stake_instr(
    program: &AdminProgram,
    from_staker: Pubkey,
    to_staker: Pubkey,
    talent: Pubkey,
) -> Result<Vec<Instruction>> {
    let ixs = program
        .request()
        .accounts(staking_accounts::TransferStake {
            owner: program.payer(),
            from_staker,
            to_staker,
            talent,
            staking_config: get_staking_config_address(&program.id()),
            staking_state: get_staking_state_address(&program.id()),
            talent_state: get_talent_state_address(&talent, &program.id()),
            from_position: get_stake_position_address(&from_staker, &talent, &program.id()),
            to_position: get_stake_position_address(&to_staker, &talent, &program.id()),
            system_program: system_program::id(),
        })
        .args(staking_instructions::TransferStake {})
        .instructions()?;
    Ok(ixs)
}

fn replay_accounts(program: &AdminProgram) -> staking_accounts::ReplayEvent {
    staking_accounts::ReplayEvent {
        owner: program.payer(),
        staking_config: get_staking_config_address(&program.id()),
    }
}

pub fn emit_stake_event_instr(
    program: &AdminProgram,
    staker: Pubkey,
    talent: Pubkey,
    amount: u64,
    timestamp: u64,
) -> Result<Vec<Instruction>> {
    let ixs = program
        .request()
        .accounts(replay_accounts(program))
        .args(staking_instructions::EmitStakeEvent {
            staker,
            talent,
            amount,
            timestamp,
        })
        .instructions()?;
    Ok(ixs)
}

pub fn emit_rewards_claim_event_instr(
    program: &AdminProgram,
    staker: Pubkey,
    talent: Pubkey,
    amount: u64,
    timestamp: u64,
) -> Result<Vec<Instruction>> {
    let ixs = program
        .request()
        .accounts(replay_accounts(program))
        .args(staking_instructions::EmitRewardsClaimEvent {
            staker,
            talent,
            amount,
            timestamp,
        })
        .instructions()?;
    Ok(ixs)
}

pub fn finish_migration_instr(program: &AdminProgram) -> Result<Vec<Instruction>> {
    let ixs = program
        .request()
        .accounts(staking_accounts::FinishMigration {
            owner: program.payer(),
            staking_config: get_staking_config_address(&program.id()),
        })
        .args(staking_instructions::FinishMigration {})
        .instructions()?;
    Ok(ixs)
}
