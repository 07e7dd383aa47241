use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    #[msg("Operation attempted outside the staking window")]
    OutOfWindow,

    #[msg("Amount must be greater than zero")]
    InvalidAmount,

    #[msg("Amount exceeds the staked balance of the position")]
    InsufficientStake,

    #[msg("No rewards available to claim")]
    NothingToClaim,

    #[msg("Signer is not the staking admin")]
    Unauthorized,

    #[msg("Rewards would exceed the configured reward budget")]
    BudgetExceeded,

    #[msg("Math operation overflowed or underflowed")]
    MathOverflow,

    #[msg("Invalid timestamp conversion")]
    InvalidTimestamp,

    #[msg("Invalid parameter provided")]
    InvalidParam,

    #[msg("Missing remaining account")]
    MissingRemainingAccount,

    #[msg("Staking is closed until the migration is finished")]
    MigrationInProgress,

    #[msg("Migration window is closed")]
    MigrationClosed,

    #[msg("Stake would exceed the talent token supply")]
    TalentSupplyExceeded,

    #[msg("Talent account does not match the position")]
    InvalidTalent,

    #[msg("Staker account does not match the position")]
    InvalidStaker,

    #[msg("Staking window end must be after its start")]
    InvalidWindow,

    #[msg("Destination position is already in use")]
    PositionNotEmpty,
}
