use anchor_client::{Client, Cluster, Program};
use anchor_lang::AccountDeserialize;
use anyhow::Result;
use solana_sdk::{account::Account, pubkey::Pubkey, signature::Keypair};
use std::rc::Rc;
use talent_staking::states::{
    STAKE_POSITION_SEED, STAKING_CONFIG_SEED, STAKING_STATE_SEED, TALENT_STATE_SEED,
};

use super::super::{read_keypair_file, ClientConfig};

pub fn deserialize_anchor_account<T: AccountDeserialize>(account: &Account) -> Result<T> {
    let mut data: &[u8] = &account.data;
    T::try_deserialize(&mut data).map_err(Into::into)
}

/// Anchor program handle for `program_id` whose payer is the keypair at `signer_path`.
pub fn program_for(
    config: &ClientConfig,
    program_id: Pubkey,
    signer_path: &str,
) -> Result<Program<Rc<Keypair>>> {
    let signer = read_keypair_file(signer_path)?;
    let url = Cluster::Custom(config.http_url.clone(), config.ws_url.clone());
    let client = Client::new(url, Rc::new(signer));
    Ok(client.program(program_id)?)
}

pub fn get_staking_config_address(program_id: &Pubkey) -> Pubkey {
    let (staking_config, _bump) =
        Pubkey::find_program_address(&[STAKING_CONFIG_SEED.as_bytes()], program_id);
    staking_config
}

pub fn get_staking_state_address(program_id: &Pubkey) -> Pubkey {
    let (staking_state, _bump) =
        Pubkey::find_program_address(&[STAKING_STATE_SEED.as_bytes()], program_id);
    staking_state
}

pub fn get_talent_state_address(talent: &Pubkey, program_id: &Pubkey) -> Pubkey {
    let (talent_state, _bump) = Pubkey::find_program_address(
        &[TALENT_STATE_SEED.as_bytes(), talent.as_ref()],
        program_id,
    );
    talent_state
}

pub fn get_stake_position_address(staker: &Pubkey, talent: &Pubkey, program_id: &Pubkey) -> Pubkey {
    let (stake_position, _bump) = Pubkey::find_program_address(
        &[
            STAKE_POSITION_SEED.as_bytes(),
            staker.as_ref(),
            talent.as_ref(),
        ],
        program_id,
    );
    stake_position
}
