#![cfg_attr(not(feature = "std"), no_std, no_main)]

pub mod policy;

/// # Tip Router — cause-splitting tip ledger
///
/// **Role:** Accepts a native-currency tip addressed to a creator and, in the
/// same call, splits it between the creator and one of the causes registered
/// at deployment.  Keeps running totals and leaderboards over every tip it
/// has routed, and exposes an owner-controlled on/off switch.
///
/// ## Cause share selection
///
/// ```text
///   tip(creator, cause_id)                         → 10% to cause (implicit)
///   tip_with_percentage(creator, cause_id, pct)    → pct% to cause, 1 ≤ pct ≤ 100
///
///   cause_amount   = floor(value × pct / 100)
///   creator_amount = value − cause_amount          (dust → creator)
/// ```
///
/// ## Call lifecycle
///
/// ```text
///   validate ──► split ──► stage stats ──► transfer cause ──► transfer creator ──► commit + emit
///                                               │                   │
///                                               └──── TransferFailed (whole call reverts)
/// ```
///
/// The contract never holds value between calls: whatever arrives with a tip
/// leaves with it.  The cause list is fixed for the lifetime of the contract.
#[ink::contract]
mod tip_router {
    use crate::policy::{
        self, CauseShare, PolicyError, TipSplit, DEFAULT_CAUSE_PERCENTAGE, MAX_CAUSES,
        MAX_CAUSE_PERCENTAGE, MIN_CAUSE_PERCENTAGE,
    };
    use ink::prelude::string::String;
    use ink::prelude::vec::Vec;
    use ink::storage::Mapping;

    /// Index of a cause in the registry.
    pub type CauseId = u32;

    pub type Result<T> = core::result::Result<T, Error>;

    // =========================================================================
    // TYPES
    // =========================================================================

    /// A third party that receives a share of tips.
    #[derive(Debug, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(
        feature = "std",
        derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
    )]
    pub struct Cause {
        pub name: String,
        pub account: AccountId,
    }

    /// Snapshot of a single routed tip, kept for the "largest tip" record.
    #[derive(Debug, Clone, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(
        feature = "std",
        derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
    )]
    pub struct TipRecord {
        pub tipper: AccountId,
        pub creator: AccountId,
        pub cause_id: CauseId,
        pub amount: Balance,
        pub cause_percentage: u8,
        pub cause_amount: Balance,
        pub block: BlockNumber,
    }

    /// Aggregates over every tip routed since deployment.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(
        feature = "std",
        derive(scale_info::TypeInfo, ink::storage::traits::StorageLayout)
    )]
    pub struct LedgerStats {
        pub tip_count: u64,
        /// Tips that used the default cause share.
        pub implicit_tips: u64,
        /// Tips that named their own cause share.
        pub explicit_tips: u64,
        pub total_tipped: Balance,
        pub total_to_causes: Balance,
        pub total_to_creators: Balance,
    }

    /// Every storage write a tip makes, computed up front so the commit is a
    /// single step after both transfers succeed.
    struct StagedTip {
        stats: LedgerStats,
        cause_raised: Balance,
        cause_tips: u64,
        creator_received: Balance,
        tipper_given: Balance,
        largest_tip: Option<TipRecord>,
        top_cause: Option<(CauseId, Balance)>,
        top_creator: Option<(AccountId, Balance)>,
        top_tipper: Option<(AccountId, Balance)>,
    }

    // =========================================================================
    // STORAGE
    // =========================================================================

    #[ink(storage)]
    pub struct TipRouter {
        // ── Access control ────────────────────────────────────────────────
        owner: AccountId,
        /// The on/off switch.  Tips are rejected while `false`.
        enabled: bool,

        // ── Registry (immutable after construction) ──────────────────────
        causes: Vec<Cause>,

        // ── Aggregates ────────────────────────────────────────────────────
        stats: LedgerStats,
        raised_by_cause: Mapping<CauseId, Balance>,
        tips_per_cause: Mapping<CauseId, u64>,
        received_by_creator: Mapping<AccountId, Balance>,
        given_by_tipper: Mapping<AccountId, Balance>,

        // ── Superlatives ─────────────────────────────────────────────────
        largest_tip: Option<TipRecord>,
        top_cause: Option<(CauseId, Balance)>,
        top_creator: Option<(AccountId, Balance)>,
        top_tipper: Option<(AccountId, Balance)>,
    }

    // =========================================================================
    // EVENTS
    // =========================================================================

    #[ink(event)]
    pub struct CauseRegistered {
        #[ink(topic)]
        cause_id: CauseId,
        #[ink(topic)]
        account: AccountId,
        name: String,
    }

    /// Emitted once per successful tip.
    ///
    /// | Field              | Meaning                                        |
    /// |--------------------|------------------------------------------------|
    /// | `tip_index`        | 1-indexed position in the tip history          |
    /// | `explicit`         | `true` if the tipper chose the cause share     |
    /// | `cause_percentage` | Share routed to the cause                      |
    /// | `cause_amount`     | Value sent to the cause account                |
    /// | `creator_amount`   | Value sent to the creator (includes dust)      |
    #[ink(event)]
    pub struct TipRouted {
        #[ink(topic)]
        tipper: AccountId,
        #[ink(topic)]
        creator: AccountId,
        #[ink(topic)]
        cause_id: CauseId,
        tip_index: u64,
        explicit: bool,
        amount: Balance,
        cause_percentage: u8,
        cause_amount: Balance,
        creator_amount: Balance,
    }

    #[ink(event)]
    pub struct NewLargestTip {
        #[ink(topic)]
        tipper: AccountId,
        previous: Balance,
        amount: Balance,
    }

    #[ink(event)]
    pub struct EnabledChanged {
        enabled: bool,
        #[ink(topic)]
        by: AccountId,
    }

    #[ink(event)]
    pub struct OwnershipTransferred {
        #[ink(topic)]
        previous: Option<AccountId>,
        #[ink(topic)]
        new: AccountId,
    }

    // =========================================================================
    // ERRORS
    // =========================================================================

    #[derive(Debug, PartialEq, Eq, scale::Encode, scale::Decode)]
    #[cfg_attr(feature = "std", derive(scale_info::TypeInfo))]
    pub enum Error {
        /// Caller is not the contract owner.
        NotOwner,
        /// Tipping is switched off.
        Disabled,
        /// No value was attached to the tip.
        ZeroAmount,
        /// `cause_id` does not index a registered cause.
        UnknownCause,
        /// Explicit cause share outside `MIN_CAUSE_PERCENTAGE..=MAX_CAUSE_PERCENTAGE`.
        PercentageOutOfRange,
        /// The creator account is the chosen cause's account.
        CreatorIsCause,
        /// An account argument is the all-zero address.
        ZeroAddress,
        /// Constructor received an empty cause list.
        NoCauses,
        /// Constructor received more than `MAX_CAUSES` causes.
        TooManyCauses,
        /// The same account was registered as two causes.
        DuplicateCause,
        /// An arithmetic operation overflowed.
        Overflow,
        /// A native value transfer failed.
        TransferFailed,
    }

    impl From<PolicyError> for Error {
        fn from(e: PolicyError) -> Self {
            match e {
                PolicyError::PercentageOutOfRange(_) => Error::PercentageOutOfRange,
                PolicyError::Overflow => Error::Overflow,
            }
        }
    }

    // =========================================================================
    // IMPLEMENTATION
    // =========================================================================

    impl TipRouter {
        // ---------------------------------------------------------------------
        // Constructor
        // ---------------------------------------------------------------------

        /// Deploy the router with its permanent cause registry.
        ///
        /// Cause ids are the positions in `causes`.  The caller becomes owner
        /// and tipping starts enabled.
        ///
        /// # Errors
        /// - [`Error::NoCauses`]       — `causes` is empty.
        /// - [`Error::TooManyCauses`]  — more than `MAX_CAUSES`.
        /// - [`Error::ZeroAddress`]    — a cause account is all zeroes.
        /// - [`Error::DuplicateCause`] — an account appears twice.
        #[ink(constructor)]
        pub fn new(causes: Vec<Cause>) -> core::result::Result<Self, Error> {
            if causes.is_empty() {
                return Err(Error::NoCauses);
            }
            if causes.len() > MAX_CAUSES as usize {
                return Err(Error::TooManyCauses);
            }
            for (i, cause) in causes.iter().enumerate() {
                if cause.account == zero_address() {
                    return Err(Error::ZeroAddress);
                }
                if causes[..i].iter().any(|c| c.account == cause.account) {
                    return Err(Error::DuplicateCause);
                }
            }

            let caller = Self::env().caller();

            for (i, cause) in causes.iter().enumerate() {
                Self::env().emit_event(CauseRegistered {
                    cause_id: i as CauseId,
                    account: cause.account,
                    name: cause.name.clone(),
                });
            }
            Self::env().emit_event(OwnershipTransferred {
                previous: None,
                new: caller,
            });

            Ok(Self {
                owner: caller,
                enabled: true,
                causes,
                stats: LedgerStats::default(),
                raised_by_cause: Mapping::default(),
                tips_per_cause: Mapping::default(),
                received_by_creator: Mapping::default(),
                given_by_tipper: Mapping::default(),
                largest_tip: None,
                top_cause: None,
                top_creator: None,
                top_tipper: None,
            })
        }

        // =====================================================================
        // TIPPING
        // =====================================================================

        /// Tip `creator`, routing the default 10% share to `cause_id`.
        #[ink(message, payable)]
        pub fn tip(&mut self, creator: AccountId, cause_id: CauseId) -> Result<TipSplit> {
            self.route_tip(creator, cause_id, CauseShare::Implicit)
                .map_err(trace_rejection)
        }

        /// Tip `creator`, routing `percentage`% to `cause_id`.
        ///
        /// `percentage` must lie in `1..=100`; at 100 the creator receives
        /// nothing.
        #[ink(message, payable)]
        pub fn tip_with_percentage(
            &mut self,
            creator: AccountId,
            cause_id: CauseId,
            percentage: u8,
        ) -> Result<TipSplit> {
            self.route_tip(creator, cause_id, CauseShare::Explicit(percentage))
                .map_err(trace_rejection)
        }

        /// Split that `tip` would produce for `amount`.
        #[ink(message)]
        pub fn preview_tip(&self, amount: Balance) -> Result<TipSplit> {
            self.preview(amount, CauseShare::Implicit)
        }

        /// Split that `tip_with_percentage` would produce for `amount`.
        #[ink(message)]
        pub fn preview_tip_with_percentage(
            &self,
            amount: Balance,
            percentage: u8,
        ) -> Result<TipSplit> {
            self.preview(amount, CauseShare::Explicit(percentage))
        }

        /// The single state transition behind both tip messages.
        ///
        /// Statistics are staged in memory, both transfers are made, and only
        /// then is the staged state written.  A failed transfer returns
        /// `TransferFailed` before any write, and the returned `Err` reverts
        /// the value already moved.
        fn route_tip(
            &mut self,
            creator: AccountId,
            cause_id: CauseId,
            share: CauseShare,
        ) -> Result<TipSplit> {
            if !self.enabled {
                return Err(Error::Disabled);
            }

            let tipper = self.env().caller();
            let amount = self.env().transferred_value();
            if amount == 0 {
                return Err(Error::ZeroAmount);
            }

            let cause_account = self.cause_account(cause_id)?;
            if creator == zero_address() {
                return Err(Error::ZeroAddress);
            }
            if creator == cause_account {
                return Err(Error::CreatorIsCause);
            }

            let split = policy::split_tip(amount, share.resolve()?)?;

            let record = TipRecord {
                tipper,
                creator,
                cause_id,
                amount,
                cause_percentage: split.cause_percentage,
                cause_amount: split.cause_amount,
                block: self.env().block_number(),
            };
            let explicit = matches!(share, CauseShare::Explicit(_));
            let staged = self.stage(&record, &split, explicit)?;

            if split.cause_amount > 0 {
                self.env()
                    .transfer(cause_account, split.cause_amount)
                    .map_err(|_| Error::TransferFailed)?;
            }
            if split.creator_amount > 0 {
                self.env()
                    .transfer(creator, split.creator_amount)
                    .map_err(|_| Error::TransferFailed)?;
            }

            let previous_largest = self.largest_tip.as_ref().map(|t| t.amount).unwrap_or(0);
            let new_largest = staged.largest_tip.is_some();
            self.commit(tipper, creator, cause_id, staged);

            self.env().emit_event(TipRouted {
                tipper,
                creator,
                cause_id,
                tip_index: self.stats.tip_count,
                explicit,
                amount,
                cause_percentage: split.cause_percentage,
                cause_amount: split.cause_amount,
                creator_amount: split.creator_amount,
            });
            if new_largest {
                self.env().emit_event(NewLargestTip {
                    tipper,
                    previous: previous_largest,
                    amount,
                });
            }

            Ok(split)
        }

        /// Compute every write `route_tip` will make, without making it.
        fn stage(&self, record: &TipRecord, split: &TipSplit, explicit: bool) -> Result<StagedTip> {
            let mut stats = self.stats;
            stats.tip_count = stats.tip_count.checked_add(1).ok_or(Error::Overflow)?;
            if explicit {
                stats.explicit_tips = stats.explicit_tips.checked_add(1).ok_or(Error::Overflow)?;
            } else {
                stats.implicit_tips = stats.implicit_tips.checked_add(1).ok_or(Error::Overflow)?;
            }
            stats.total_tipped = stats
                .total_tipped
                .checked_add(split.amount)
                .ok_or(Error::Overflow)?;
            stats.total_to_causes = stats
                .total_to_causes
                .checked_add(split.cause_amount)
                .ok_or(Error::Overflow)?;
            stats.total_to_creators = stats
                .total_to_creators
                .checked_add(split.creator_amount)
                .ok_or(Error::Overflow)?;

            let cause_raised = self
                .raised_by_cause(record.cause_id)
                .checked_add(split.cause_amount)
                .ok_or(Error::Overflow)?;
            let cause_tips = self
                .tips_for_cause(record.cause_id)
                .checked_add(1)
                .ok_or(Error::Overflow)?;
            let creator_received = self
                .received_by_creator(record.creator)
                .checked_add(split.creator_amount)
                .ok_or(Error::Overflow)?;
            let tipper_given = self
                .given_by_tipper(record.tipper)
                .checked_add(split.amount)
                .ok_or(Error::Overflow)?;

            let largest_tip = match &self.largest_tip {
                Some(current) if current.amount >= record.amount => None,
                _ => Some(record.clone()),
            };

            Ok(StagedTip {
                stats,
                cause_raised,
                cause_tips,
                creator_received,
                tipper_given,
                largest_tip,
                top_cause: overtakes(self.top_cause, record.cause_id, cause_raised),
                top_creator: overtakes(self.top_creator, record.creator, creator_received),
                top_tipper: overtakes(self.top_tipper, record.tipper, tipper_given),
            })
        }

        fn commit(
            &mut self,
            tipper: AccountId,
            creator: AccountId,
            cause_id: CauseId,
            staged: StagedTip,
        ) {
            self.stats = staged.stats;
            if staged.cause_raised > 0 {
                self.raised_by_cause.insert(cause_id, &staged.cause_raised);
            }
            self.tips_per_cause.insert(cause_id, &staged.cause_tips);
            if staged.creator_received > 0 {
                self.received_by_creator.insert(creator, &staged.creator_received);
            }
            self.given_by_tipper.insert(tipper, &staged.tipper_given);

            if let Some(record) = staged.largest_tip {
                self.largest_tip = Some(record);
            }
            if staged.top_cause.is_some() {
                self.top_cause = staged.top_cause;
            }
            if staged.top_creator.is_some() {
                self.top_creator = staged.top_creator;
            }
            if staged.top_tipper.is_some() {
                self.top_tipper = staged.top_tipper;
            }
        }

        fn preview(&self, amount: Balance, share: CauseShare) -> Result<TipSplit> {
            if amount == 0 {
                return Err(Error::ZeroAmount);
            }
            let pct = share.resolve()?;
            Ok(policy::split_tip(amount, pct)?)
        }

        // =====================================================================
        // VIEW FUNCTIONS
        // =====================================================================

        #[ink(message)]
        pub fn owner(&self) -> AccountId { self.owner }

        #[ink(message)]
        pub fn is_enabled(&self) -> bool { self.enabled }

        #[ink(message)]
        pub fn causes(&self) -> Vec<Cause> { self.causes.clone() }

        #[ink(message)]
        pub fn cause(&self, cause_id: CauseId) -> Option<Cause> {
            self.causes.get(cause_id as usize).cloned()
        }

        #[ink(message)]
        pub fn cause_count(&self) -> u32 { self.causes.len() as u32 }

        #[ink(message)]
        pub fn default_cause_percentage(&self) -> u8 { DEFAULT_CAUSE_PERCENTAGE }

        /// Inclusive `(min, max)` bounds for `tip_with_percentage`.
        #[ink(message)]
        pub fn percentage_bounds(&self) -> (u8, u8) {
            (MIN_CAUSE_PERCENTAGE, MAX_CAUSE_PERCENTAGE)
        }

        #[ink(message)]
        pub fn stats(&self) -> LedgerStats { self.stats }

        #[ink(message)]
        pub fn raised_by_cause(&self, cause_id: CauseId) -> Balance {
            self.raised_by_cause.get(cause_id).unwrap_or(0)
        }

        #[ink(message)]
        pub fn tips_for_cause(&self, cause_id: CauseId) -> u64 {
            self.tips_per_cause.get(cause_id).unwrap_or(0)
        }

        #[ink(message)]
        pub fn received_by_creator(&self, creator: AccountId) -> Balance {
            self.received_by_creator.get(creator).unwrap_or(0)
        }

        #[ink(message)]
        pub fn given_by_tipper(&self, tipper: AccountId) -> Balance {
            self.given_by_tipper.get(tipper).unwrap_or(0)
        }

        #[ink(message)]
        pub fn largest_tip(&self) -> Option<TipRecord> { self.largest_tip.clone() }

        /// Cause with the most value raised, and that amount.
        #[ink(message)]
        pub fn top_cause(&self) -> Option<(CauseId, Balance)> { self.top_cause }

        /// Creator with the most value received, and that amount.
        #[ink(message)]
        pub fn top_creator(&self) -> Option<(AccountId, Balance)> { self.top_creator }

        /// Tipper with the most value given, and that amount.
        #[ink(message)]
        pub fn top_tipper(&self) -> Option<(AccountId, Balance)> { self.top_tipper }

        // =====================================================================
        // ADMIN
        // =====================================================================

        /// Switch tipping on or off.  Views and previews keep working while off.
        #[ink(message)]
        pub fn set_enabled(&mut self, enabled: bool) -> Result<()> {
            self.only_owner()?;
            if self.enabled != enabled {
                self.enabled = enabled;
                self.env().emit_event(EnabledChanged {
                    enabled,
                    by: self.env().caller(),
                });
            }
            Ok(())
        }

        #[ink(message)]
        pub fn transfer_ownership(&mut self, new_owner: AccountId) -> Result<()> {
            self.only_owner()?;
            if new_owner == zero_address() {
                return Err(Error::ZeroAddress);
            }
            let previous = self.owner;
            self.owner = new_owner;
            self.env().emit_event(OwnershipTransferred {
                previous: Some(previous),
                new: new_owner,
            });
            Ok(())
        }

        // =====================================================================
        // INTERNAL HELPERS
        // =====================================================================

        fn cause_account(&self, cause_id: CauseId) -> Result<AccountId> {
            self.causes
                .get(cause_id as usize)
                .map(|c| c.account)
                .ok_or(Error::UnknownCause)
        }

        fn only_owner(&self) -> Result<()> {
            if self.env().caller() != self.owner {
                return Err(Error::NotOwner);
            }
            Ok(())
        }
    }

    fn zero_address() -> AccountId {
        AccountId::from([0x0; 32])
    }

    /// `Some((id, total))` if `total` strictly beats the current leader.
    /// Ties keep the earlier leader; a zero total never leads.
    fn overtakes<T: Copy>(
        leader: Option<(T, Balance)>,
        id: T,
        total: Balance,
    ) -> Option<(T, Balance)> {
        let best = leader.map(|(_, best)| best).unwrap_or(0);
        if total > best {
            Some((id, total))
        } else {
            None
        }
    }

    fn trace_rejection(e: Error) -> Error {
        ink::env::debug_println!("tip rejected: {:?}", e);
        e
    }

    // =========================================================================
    // UNIT TESTS
    // =========================================================================

}
