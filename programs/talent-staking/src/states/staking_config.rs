use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// Staking Configuration Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive the staking configuration account.
pub const STAKING_CONFIG_SEED: &str = "staking_config";

/// Upper bound for `token_decimals`; keeps `s_precision` inside `u64` range.
pub const MAX_TOKEN_DECIMALS: u8 = 18;

/// Denominator for `talent_reward_bps`.
pub const BPS_DENOMINATOR: u64 = 10_000;

/// Protocol-wide configuration, created once by `initialise_configs`.
///
/// Holds the staking window, the reward budget and the derived emission rate,
/// the pricing parameters used to convert stable coin into staked tokens and
/// staked tokens into talent tokens, and the migration gate.
#[account]
#[derive(Default, Debug)]
pub struct StakingConfig {
    /// PDA bump for this account.
    pub bump: u8,

    /// Identity allowed to run privileged (migration and config) instructions.
    pub admin: Pubkey,

    /// Stable coin mint used for `stake_stable` deposits.
    pub stable_coin: Pubkey,

    /// Talent/token registry reference.
    pub factory: Pubkey,

    /// First UNIX timestamp (seconds) at which staking is accepted.
    pub start: u64,

    /// Last UNIX timestamp (seconds) at which staking is accepted. Accrual stops here.
    pub end: u64,

    /// Total reward budget distributed over `[start, end]` (base units).
    pub rewards_max: u64,

    /// Reward units emitted per second, scaled by `s_precision`.
    pub reward_rate: u128,

    /// Stable coin base units per whole staked token.
    pub token_price: u64,

    /// Staked token base units per whole talent token.
    pub talent_price: u64,

    /// Decimals of the staked token; fixes the accumulator scale.
    pub token_decimals: u8,

    /// `10^token_decimals`, fixed-point scale of `S`.
    pub s_precision: u128,

    /// Share of every realized reward credited to the talent, in basis points.
    pub talent_reward_bps: u64,

    /// Maximum talent token supply per talent (`0` = unlimited).
    pub talent_supply_max: u64,

    /// While `true` only privileged migration instructions are accepted.
    pub migration_open: bool,

    /// Number of historical stake events replayed so far.
    pub stake_events_replayed: u64,

    /// Number of historical reward claim events replayed so far.
    pub claim_events_replayed: u64,
}

impl StakingConfig {
    /// Fixed serialized size of the account (for allocation at initialization).
    ///
    /// Breakdown:
    /// - 8: account discriminator
    /// - 1: bump
    /// - 32 * 3: three Pubkeys
    /// - 8 * 9: nine `u64` fields
    /// - 16 * 2: two `u128` fields
    /// - 1: token decimals
    /// - 1: migration flag
    pub const LEN: usize = 8 + 1 + 32 * 3 + 8 * 9 + 16 * 2 + 1 + 1;

    /// The stored admin or the program-level admin.
    pub fn is_admin(&self, key: &Pubkey) -> bool {
        *key == self.admin || *key == crate::admin::id()
    }

    /// Whether `now` lies inside the inclusive staking window.
    pub fn is_window_open(&self, now: u64) -> bool {
        self.start <= now && now <= self.end
    }

    /// Clamps `now` into `[start, end]`, the interval over which rewards accrue.
    pub fn accrual_time(&self, now: u64) -> u64 {
        now.clamp(self.start, self.end)
    }

    /// One whole token in base units.
    pub fn token_unit(&self) -> u128 {
        self.s_precision
    }
}
