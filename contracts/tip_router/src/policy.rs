//! Split arithmetic and cause-share selection.
//!
//! Nothing in here touches storage or the host environment, so the rules that
//! decide how much of a tip reaches a cause can be reasoned about (and tested)
//! on their own.
//!
//! ```text
//! cause_amount   = floor(amount × percentage / 100)
//! creator_amount = amount − cause_amount          (rounding dust → creator)
//! ```

pub type Balance = u128;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Cause share applied when the tipper does not name one (10%).
pub const DEFAULT_CAUSE_PERCENTAGE: u8 = 10;

/// Smallest explicit cause share a tipper may choose (1%).
pub const MIN_CAUSE_PERCENTAGE: u8 = 1;

/// Largest explicit cause share a tipper may choose (100%: the whole tip).
pub const MAX_CAUSE_PERCENTAGE: u8 = 100;

/// Denominator for all percentage calculations.
pub const PERCENT_DENOMINATOR: u128 = 100;

/// Capacity of the cause registry fixed at deployment.
pub const MAX_CAUSES: u32 = 16;

// =============================================================================
// TYPES
// =============================================================================

/// How the cause's share of a tip is selected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CauseShare {
    /// Use [`DEFAULT_CAUSE_PERCENTAGE`].
    Implicit,
    /// Caller-supplied percentage, bounded by
    /// [`MIN_CAUSE_PERCENTAGE`]`..=`[`MAX_CAUSE_PERCENTAGE`].
    Explicit(u8),
}

/// Result of splitting one tip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, scale::Encode, scale::Decode)]
#[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
pub struct TipSplit {
    pub amount: Balance,
    pub cause_percentage: u8,
    pub cause_amount: Balance,
    pub creator_amount: Balance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyError {
    /// Explicit share outside the accepted bounds.
    PercentageOutOfRange(u8),
    Overflow,
}

// =============================================================================
// OPERATIONS
// =============================================================================

impl CauseShare {
    /// Percentage of the tip routed to the cause.
    pub fn resolve(self) -> Result<u8, PolicyError> {
        match self {
            CauseShare::Implicit => Ok(DEFAULT_CAUSE_PERCENTAGE),
            CauseShare::Explicit(p) if is_valid_percentage(p) => Ok(p),
            CauseShare::Explicit(p) => Err(PolicyError::PercentageOutOfRange(p)),
        }
    }
}

pub fn is_valid_percentage(percentage: u8) -> bool {
    (MIN_CAUSE_PERCENTAGE..=MAX_CAUSE_PERCENTAGE).contains(&percentage)
}

/// Split `amount` so that `percentage`% (rounded down) goes to the cause and
/// the remainder goes to the creator.
pub fn split_tip(amount: Balance, percentage: u8) -> Result<TipSplit, PolicyError> {
    if !is_valid_percentage(percentage) {
        return Err(PolicyError::PercentageOutOfRange(percentage));
    }

    let cause_amount = amount
        .checked_mul(percentage as u128)
        .ok_or(PolicyError::Overflow)?
        / PERCENT_DENOMINATOR;

    // Creator takes the remainder so no value is lost to rounding.
    let creator_amount = amount
        .checked_sub(cause_amount)
        .ok_or(PolicyError::Overflow)?;

    Ok(TipSplit {
        amount,
        cause_percentage: percentage,
        cause_amount,
        creator_amount,
    })
}

// =============================================================================
// UNIT TESTS
// =============================================================================
