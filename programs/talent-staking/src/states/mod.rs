pub mod events;
pub use events::*;

pub mod staking_config;
pub use staking_config::*;

pub mod staking_state;
pub use staking_state::*;

pub mod talent_state;
pub use talent_state::*;

pub mod stake_position;
pub use stake_position::*;
