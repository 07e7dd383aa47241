use anyhow::{format_err, Result};
use clap::Parser;
use colorful::Colorful;
use configparser::ini::Ini;
use solana_client::rpc_client::RpcClient;
use solana_sdk::{
    instruction::Instruction,
    pubkey::Pubkey,
    signature::{Keypair, Signature, Signer},
};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};
use talent_staking::accounting::{ledger, RewardCalculator, RewardSplit};
use talent_staking::states::{StakePosition, StakingConfig, StakingState, TalentState};

mod instructions;
mod replay;
mod snapshot;
use instructions::migration_instructions::*;
use instructions::rpc::*;
use instructions::staking_instructions::*;
use instructions::utils::*;
use snapshot::{ConfigSnapshot, Snapshot};

const DEFAULT_SEND_RETRIES: usize = 3;

#[derive(Clone, Debug, PartialEq)]
pub struct ClientConfig {
    http_url: String,
    ws_url: String,
    payer_path: String,
    admin_path: String,
    talent_staking_program: Pubkey,
    /// Program receiving a migration; defaults to `talent_staking_program`.
    migration_target_program: Option<Pubkey>,
    send_retries: usize,
}

impl ClientConfig {
    fn migration_program(&self) -> Pubkey {
        self.migration_target_program
            .unwrap_or(self.talent_staking_program)
    }
}

fn required(config: &Ini, key: &str) -> Result<String> {
    match config.get("Global", key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(format_err!("{} must not be empty", key)),
    }
}

fn parse_pubkey(key: &str, value: &str) -> Result<Pubkey> {
    Pubkey::from_str(value).map_err(|_| format_err!("{} is not a valid pubkey: {}", key, value))
}

fn parse_cfg(config: &Ini) -> Result<ClientConfig> {
    let talent_staking_program = parse_pubkey(
        "talent_staking_program",
        &required(config, "talent_staking_program")?,
    )?;
    let migration_target_program = match config.get("Global", "migration_target_program") {
        Some(value) if !value.is_empty() => {
            Some(parse_pubkey("migration_target_program", &value)?)
        }
        _ => None,
    };
    let send_retries = match config.get("Global", "send_retries") {
        Some(value) if !value.is_empty() => value
            .parse()
            .map_err(|_| format_err!("send_retries must be a number: {}", value))?,
        _ => DEFAULT_SEND_RETRIES,
    };

    Ok(ClientConfig {
        http_url: required(config, "http_url")?,
        ws_url: required(config, "ws_url")?,
        payer_path: required(config, "payer_path")?,
        admin_path: required(config, "admin_path")?,
        talent_staking_program,
        migration_target_program,
        send_retries,
    })
}

fn load_cfg(client_config: &str) -> Result<ClientConfig> {
    let mut config = Ini::new();
    config
        .load(client_config)
        .map_err(|err| format_err!("failed to load {}: {}", client_config, err))?;
    parse_cfg(&config)
}

fn read_keypair_file(s: &str) -> Result<Keypair> {
    solana_sdk::signature::read_keypair_file(s)
        .map_err(|_| format_err!("failed to read keypair from {}", s))
}

fn unix_now() -> Result<u64> {
    Ok(SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs())
}

/// Reward the position would realize at `now`, split into the staker's and
/// the talent's part.
fn pending_split(
    config: &StakingConfig,
    state: &StakingState,
    talent: &TalentState,
    position: &StakePosition,
    now: u64,
) -> Result<RewardSplit> {
    let pending = ledger::pending_rewards(config, state, talent, position, now)
        .map_err(|err| format_err!("{}", err))?;
    RewardCalculator::split_reward(pending, config.talent_reward_bps)
        .ok_or_else(|| format_err!("invalid talent reward share"))
}

#[derive(Debug, Parser)]
pub struct Opts {
    /// Path to the INI configuration.
    #[arg(long, default_value = "client_config.ini")]
    pub config: String,
    #[clap(subcommand)]
    pub command: TalentStakingCommands,
}

#[derive(Debug, Parser)]
pub enum TalentStakingCommands {
    InitialiseConfigs {
        #[arg(long)]
        admin: Pubkey,
        #[arg(long)]
        stable_coin: Pubkey,
        #[arg(long)]
        factory: Pubkey,
        #[arg(long)]
        start: u64,
        #[arg(long)]
        end: u64,
        #[arg(long)]
        rewards_max: u64,
        #[arg(long)]
        token_price: u64,
        #[arg(long)]
        talent_price: u64,
        #[arg(long, default_value_t = 6)]
        token_decimals: u8,
        #[arg(long, default_value_t = 0)]
        talent_reward_bps: u64,
        #[arg(long, default_value_t = 0)]
        talent_supply_max: u64,
        /// Start closed to the public, ready to receive a transplant.
        #[arg(long)]
        migration: bool,
    },
    UpdateConfig {
        #[arg(long)]
        param: u8,
        #[arg(long)]
        value: u64,
        #[arg(long)]
        admin: Option<Pubkey>,
    },
    Stake {
        #[arg(long)]
        talent: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    StakeStable {
        #[arg(long)]
        talent: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    Unstake {
        #[arg(long)]
        talent: Pubkey,
        #[arg(long)]
        amount: u64,
    },
    Claim {
        #[arg(long)]
        talent: Pubkey,
    },
    WithdrawTalentRewards {},
    /// Claimable plus not yet settled rewards of a position.
    Pending {
        #[arg(long)]
        talent: Pubkey,
        /// Defaults to the payer.
        #[arg(long)]
        staker: Option<Pubkey>,
    },
    /// Writes the full accounting state of `talent_staking_program` to a JSON file.
    Snapshot {
        #[arg(long)]
        out: PathBuf,
    },
    /// Writes a snapshot into the migration target.
    Transplant {
        #[arg(long)]
        snapshot: PathBuf,
    },
    /// Re-emits historical events on the migration target, resuming after the
    /// last event it already replayed.
    ReplayEvents {
        #[arg(long)]
        events: PathBuf,
    },
    TransferStake {
        #[arg(long)]
        from: Pubkey,
        #[arg(long)]
        to: Pubkey,
        #[arg(long)]
        talent: Pubkey,
    },
    FinishMigration {},
}

fn signers_for<'a>(payer: &'a Keypair, admin: &'a Keypair) -> Vec<&'a Keypair> {
    if payer.pubkey() == admin.pubkey() {
        vec![payer]
    } else {
        vec![payer, admin]
    }
}

struct Sender<'a> {
    rpc_client: &'a RpcClient,
    payer: &'a Keypair,
    signers: Vec<&'a Keypair>,
    retries: usize,
}

impl Sender<'_> {
    fn send(&self, instructions: &[Instruction]) -> Result<Signature> {
        send_with_retry(
            self.rpc_client,
            instructions,
            self.payer,
            &self.signers,
            self.retries,
        )
    }
}

fn main() -> Result<()> {
    let opts = Opts::parse();
    let client_config = load_cfg(&opts.config)?;
    let payer = read_keypair_file(&client_config.payer_path)?;
    let admin = read_keypair_file(&client_config.admin_path)?;
    let rpc_client = RpcClient::new(client_config.http_url.to_string());

    let user = Sender {
        rpc_client: &rpc_client,
        payer: &payer,
        signers: vec![&payer],
        retries: client_config.send_retries,
    };
    let operator = Sender {
        rpc_client: &rpc_client,
        payer: &payer,
        signers: signers_for(&payer, &admin),
        retries: client_config.send_retries,
    };

    match opts.command {
        TalentStakingCommands::InitialiseConfigs {
            admin,
            stable_coin,
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
        } => {
            let initialise_ix = initialise_configs_instr(
                &client_config,
                admin,
                stable_coin,
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
            )?;
            let signature = operator.send(&initialise_ix)?;
            println!("{}", signature);
        }
        TalentStakingCommands::UpdateConfig {
            param,
            value,
            admin,
        } => {
            let update_config_ix = update_config_instr(&client_config, param, value, admin)?;
            let signature = operator.send(&update_config_ix)?;
            println!("{}", signature);
        }
        TalentStakingCommands::Stake { talent, amount } => {
            let stake_ix = stake_instr(&client_config, talent, amount)?;
            let signature = user.send(&stake_ix)?;
            println!("{}", signature);
        }
        TalentStakingCommands::StakeStable { talent, amount } => {
            let stake_ix = stake_stable_instr(&client_config, talent, amount)?;
            let signature = user.send(&stake_ix)?;
            println!("{}", signature);
        }
        TalentStakingCommands::Unstake { talent, amount } => {
            let unstake_ix = unstake_instr(&client_config, talent, amount)?;
            let signature = user.send(&unstake_ix)?;
            println!("{}", signature);
        }
        TalentStakingCommands::Claim { talent } => {
            let claim_ix = claim_instr(&client_config, talent)?;
            let signature = user.send(&claim_ix)?;
            println!("{}", signature);
        }
        TalentStakingCommands::WithdrawTalentRewards {} => {
            let withdraw_ix = withdraw_talent_rewards_instr(&client_config)?;
            let signature = user.send(&withdraw_ix)?;
            println!("{}", signature);
        }
        TalentStakingCommands::Pending { talent, staker } => {
            let program_id = client_config.talent_staking_program;
            let staker = staker.unwrap_or_else(|| payer.pubkey());
            let addresses = [
                get_staking_config_address(&program_id),
                get_staking_state_address(&program_id),
                get_talent_state_address(&talent, &program_id),
                get_stake_position_address(&staker, &talent, &program_id),
            ];
            let accounts = rpc_client.get_multiple_accounts(&addresses)?;
            let fetched = |index: usize| {
                accounts[index]
                    .as_ref()
                    .ok_or_else(|| format_err!("account {} not found", addresses[index]))
            };
            let config: StakingConfig = deserialize_anchor_account(fetched(0)?)?;
            let state: StakingState = deserialize_anchor_account(fetched(1)?)?;
            let talent_state: TalentState = deserialize_anchor_account(fetched(2)?)?;
            let position: StakePosition = deserialize_anchor_account(fetched(3)?)?;

            let split = pending_split(&config, &state, &talent_state, &position, unix_now()?)?;
            println!("staked:     {}", position.amount);
            println!("claimable:  {}", position.claimable);
            println!("pending:    {}", split.staker_reward);
            println!("talent cut: {}", split.talent_reward);
        }
        TalentStakingCommands::Snapshot { out } => {
            let program = program_for(
                &client_config,
                client_config.talent_staking_program,
                &client_config.payer_path,
            )?;
            let snapshot = Snapshot::capture(&rpc_client, &program)?;
            snapshot.verify()?;
            snapshot.save(&out)?;
            println!(
                "{} {} talents, {} positions at slot {}",
                "snapshot".green(),
                snapshot.talents.len(),
                snapshot.positions.len(),
                snapshot.slot
            );
        }
        TalentStakingCommands::Transplant { snapshot } => {
            let snapshot = Snapshot::load(&snapshot)?;
            snapshot.verify()?;
            let program = program_for(
                &client_config,
                client_config.migration_program(),
                &client_config.admin_path,
            )?;
            let target: StakingConfig =
                program.account(get_staking_config_address(&program.id()))?;
            if !target.migration_open {
                return Err(format_err!("target {} is not in migration mode", program.id()));
            }
            let mismatches = snapshot.config.mismatches(&ConfigSnapshot::from(&target));
            if !mismatches.is_empty() {
                return Err(format_err!(
                    "target config differs from snapshot: {}",
                    mismatches.join(", ")
                ));
            }

            let mut global_ixs = set_accumulated_state_instr(&program, &snapshot.global)?;
            global_ixs.extend(set_realtime_state_instr(&program, &snapshot.global)?);
            let signature = operator.send(&global_ixs)?;
            println!("{} {}", "global state".green(), signature);

            for talent in &snapshot.talents {
                let talent_ix = set_talent_state_instr(&program, talent)?;
                operator.send(&talent_ix)?;
            }
            println!("{} {}", "talents".green(), snapshot.talents.len());

            let existing: BTreeSet<(Pubkey, Pubkey)> = program
                .accounts::<StakePosition>(vec![])?
                .into_iter()
                .filter(|(_, position)| !position.is_empty())
                .map(|(_, position)| (position.staker, position.talent))
                .collect();
            let skipped = snapshot.positions_already_imported(&existing);
            let mut imported = 0;
            for position in snapshot.positions_to_import(&existing) {
                let import_ix = import_stake_instr(&program, position)?;
                operator.send(&import_ix)?;
                imported += 1;
            }
            println!(
                "{} {} imported, {} already present",
                "positions".green(),
                imported,
                skipped
            );
        }
        TalentStakingCommands::ReplayEvents { events } => {
            let events = replay::load_events(&events)?;
            let program = program_for(
                &client_config,
                client_config.migration_program(),
                &client_config.admin_path,
            )?;
            let target: StakingConfig =
                program.account(get_staking_config_address(&program.id()))?;
            let pending = replay::pending_events(
                &events,
                target.stake_events_replayed,
                target.claim_events_replayed,
            )?;
            println!(
                "{} {} of {} events left to replay",
                "replay".green(),
                pending.len(),
                events.len()
            );
            for event in pending {
                let replay_ix = match event.kind {
                    replay::EventKind::Stake => emit_stake_event_instr(
                        &program,
                        event.staker()?,
                        event.talent()?,
                        event.amount,
                        event.timestamp,
                    )?,
                    replay::EventKind::RewardClaim => emit_rewards_claim_event_instr(
                        &program,
                        event.staker()?,
                        event.talent()?,
                        event.amount,
                        event.timestamp,
                    )?,
                };
                operator.send(&replay_ix)?;
            }
        }
        TalentStakingCommands::TransferStake { from, to, talent } => {
            let program = program_for(
                &client_config,
                client_config.migration_program(),
                &client_config.admin_path,
            )?;
            let transfer_ix = transfer_stake_instr(&program, from, to, talent)?;
            let signature = operator.send(&transfer_ix)?;
            println!("{}", signature);
        }
        TalentStakingCommands::FinishMigration {} => {
            let program = program_for(
                &client_config,
                client_config.migration_program(),
                &client_config.admin_path,
            )?;
            let finish_ix = finish_migration_instr(&program)?;
            let signature = operator.send(&finish_ix)?;
            println!("{} {}", "migration finished".green(), signature);
        }
    }
    Ok(())
}
