pub mod initialise_configs;
pub use initialise_configs::*;

pub mod update_configs;
pub use update_configs::*;

pub mod stake;
pub use stake::*;

pub mod stake_stable;
pub use stake_stable::*;

pub mod unstake;
pub use unstake::*;

pub mod claim;
pub use claim::*;

pub mod withdraw_talent_rewards;
pub use withdraw_talent_rewards::*;

pub mod set_global_state;
pub use set_global_state::*;

pub mod set_talent_state;
pub use set_talent_state::*;

pub mod import_stake;
pub use import_stake::*;

pub mod transfer_stake;
pub use transfer_stake::*;

pub mod replay_events;
pub use replay_events::*;

pub mod finish_migration;
pub use finish_migration::*;
