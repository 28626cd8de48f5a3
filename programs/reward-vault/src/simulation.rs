//! In-memory host for the vault and its controller.
//!
//! The controller side runs the controller crate's own state methods the way its
//! mint_to_address handler does; the vault side runs the same planning and
//! booking as the instruction handlers. Every entry point is atomic.

use std::collections::BTreeMap;

use anchor_lang::error::ErrorCode;
use anchor_lang::prelude::*;
use mint_lock_controller::{AccrualConfig, Controller, FailsafeConfig, LockPosition, ReentrancyState};

use crate::errors::VaultError;
use crate::instructions::harvestable;
use crate::state::*;

#[derive(Clone)]
struct Ledger {
    controller: Controller,
    positions: BTreeMap<Pubkey, LockPosition>,
    vault: RewardVault,
    depositors: BTreeMap<Pubkey, Depositor>,
    /// Derived-token balances; the pool's tokens sit under the vault key
    tokens: BTreeMap<Pubkey, u64>,
    /// Derived tokens each holder has approved the vault to move
    allowances: BTreeMap<Pubkey, u64>,
}

pub struct Simulation {
    pub block: u64,
    pub vault_key: Pubkey,
    pub controller_key: Pubkey,
    ledger: Ledger,
}

impl Simulation {
    pub fn new(accrual: AccrualConfig, block: u64) -> Self {
        let controller_key = Pubkey::new_unique();
        let controller = Controller {
            authority: Pubkey::new_unique(),
            collateral_mint: Pubkey::new_unique(),
            derived_mint: Pubkey::new_unique(),
            collateral_vault: Pubkey::new_unique(),
            accrual,
            failsafe: FailsafeConfig {
                window_blocks: 0,
                max_locked_amount: 0,
            },
            deployed_block: block,
            global_burned_amount: 0,
            global_locked_amount: 0,
            total_minted: 0,
            lock_count: 0,
            reentrancy: ReentrancyState::Idle,
            bump: 255,
            collateral_vault_bump: 255,
        };
        let vault = RewardVault {
            authority: Pubkey::new_unique(),
            controller: controller_key,
            derived_mint: controller.derived_mint,
            vault_tokens: Pubkey::new_unique(),
            pool: Pool::default(),
            last_harvest_block: 0,
            harvest_count: 0,
            total_harvested: 0,
            total_jackpots: 0,
            bump: 255,
            vault_tokens_bump: 255,
        };

        Self {
            block,
            vault_key: Pubkey::new_unique(),
            controller_key,
            ledger: Ledger {
                controller,
                positions: BTreeMap::new(),
                vault,
                depositors: BTreeMap::new(),
                tokens: BTreeMap::new(),
                allowances: BTreeMap::new(),
            },
        }
    }

    pub fn advance(&mut self, blocks: u64) {
        self.block += blocks;
    }

    /// Lock `amount` for `owner` at the current block
    pub fn lock(&mut self, owner: Pubkey, delegated_minter: Pubkey, amount: u64) -> Result<()> {
        self.atomic(|sim| {
            let block = sim.block;
            let mut position = sim.position(&owner).cloned().unwrap_or_default();
            position.bind(sim.controller_key, owner, 255);
            position.apply_lock(delegated_minter, amount, block)?;
            sim.ledger.positions.insert(owner, position);
            sim.ledger.controller.record_lock(amount)
        })
    }

    /// Burn credit for `target` without modelling the burner's balance
    pub fn credit_burn(&mut self, target: Pubkey, amount: u64) -> Result<()> {
        self.atomic(|sim| {
            let mut position = sim.position(&target).cloned().unwrap_or_default();
            position.bind(sim.controller_key, target, 255);
            sim.ledger.controller.record_burn(&mut position, amount)?;
            sim.ledger.positions.insert(target, position);
            Ok(())
        })
    }

    pub fn fund(&mut self, holder: Pubkey, amount: u64) {
        *self.ledger.tokens.entry(holder).or_default() += amount;
    }

    pub fn approve(&mut self, holder: Pubkey, amount: u64) {
        self.ledger.allowances.insert(holder, amount);
    }

    pub fn vault(&self) -> &RewardVault {
        &self.ledger.vault
    }

    pub fn depositor(&self, owner: &Pubkey) -> Option<&Depositor> {
        self.ledger.depositors.get(owner)
    }

    /// `None` until the controller has created the owner's lock position
    pub fn position(&self, owner: &Pubkey) -> Option<&LockPosition> {
        self.ledger.positions.get(owner)
    }

    pub fn balance_of(&self, holder: &Pubkey) -> u64 {
        self.ledger.tokens.get(holder).copied().unwrap_or(0)
    }

    /// Returns the shares issued
    pub fn deposit(
        &mut self,
        owner: Pubkey,
        amount: u64,
        rewards_percent_bps: u16,
        min_block_number: u64,
        min_burn_amount: u64,
    ) -> Result<u64> {
        self.atomic(|sim| {
            let mut depositor = sim.depositor_entry(owner);
            depositor.configure(rewards_percent_bps, min_block_number, min_burn_amount)?;

            let mut shares = 0;
            if amount > 0 {
                require!(
                    sim.ledger.allowances.get(&owner).copied().unwrap_or(0) >= amount,
                    VaultError::NotOperator
                );
                require!(
                    sim.balance_of(&owner) >= amount,
                    VaultError::InsufficientBalance
                );

                shares = sim.ledger.vault.pool.deposit(amount)?;
                depositor.share_balance = depositor
                    .share_balance
                    .checked_add(shares)
                    .ok_or(VaultError::ArithmeticOverflow)?;

                if let Some(allowance) = sim.ledger.allowances.get_mut(&owner) {
                    *allowance -= amount;
                }
                let vault_key = sim.vault_key;
                sim.move_tokens(owner, vault_key, amount)?;
            }

            sim.ledger.depositors.insert(owner, depositor);
            Ok(shares)
        })
    }

    /// Returns the amount paid out
    pub fn withdraw_all(&mut self, owner: Pubkey) -> Result<u64> {
        self.atomic(|sim| {
            let mut depositor = sim
                .ledger
                .depositors
                .get(&owner)
                .cloned()
                .ok_or(ErrorCode::AccountNotInitialized)?;
            let shares = depositor.share_balance;
            require!(shares > 0, VaultError::NothingToWithdraw);

            let amount = sim.ledger.vault.pool.withdraw(shares)?;
            depositor.share_balance = 0;
            sim.ledger.depositors.insert(owner, depositor);

            let vault_key = sim.vault_key;
            sim.move_tokens(vault_key, owner, amount)?;
            Ok(amount)
        })
    }

    pub fn set_paused(&mut self, owner: Pubkey, paused: bool) {
        let mut depositor = self.depositor_entry(owner);
        depositor.paused = paused;
        self.ledger.depositors.insert(owner, depositor);
    }

    pub fn preview_withdraw(&self, owner: &Pubkey) -> Result<u64> {
        let depositor = self
            .ledger
            .depositors
            .get(owner)
            .ok_or(ErrorCode::AccountNotInitialized)?;
        self.ledger.vault.pool.value_of(depositor.share_balance)
    }

    pub fn burn_tokens(
        &mut self,
        caller: Pubkey,
        amount_to_burn: u64,
        burn_to_address: Pubkey,
    ) -> Result<HarvestOutcome> {
        self.atomic(|sim| {
            sim.require_registered(&caller)?;
            sim.harvest(
                caller,
                BurnRequest {
                    amount_to_burn,
                    burn_to_address,
                },
            )
        })
    }

    pub fn burn_tokens_from_addresses(
        &mut self,
        caller: Pubkey,
        requests: &[BurnRequest],
    ) -> Result<Vec<HarvestOutcome>> {
        self.atomic(|sim| {
            sim.require_registered(&caller)?;
            requests
                .iter()
                .map(|request| sim.harvest(caller, *request))
                .collect()
        })
    }

    /// The caller's depositor account is a plain `Account` in both harvest
    /// instructions, so it must exist
    fn require_registered(&self, caller: &Pubkey) -> Result<()> {
        if self.ledger.depositors.contains_key(caller) {
            Ok(())
        } else {
            Err(ErrorCode::AccountNotInitialized.into())
        }
    }

    fn harvest(&mut self, caller: Pubkey, request: BurnRequest) -> Result<HarvestOutcome> {
        let block = self.block;

        // Target accounts are read like load_or_default: absent means default
        let target = self
            .ledger
            .depositors
            .get(&request.burn_to_address)
            .cloned()
            .unwrap_or_default();
        let position = self
            .ledger
            .positions
            .get(&request.burn_to_address)
            .cloned()
            .unwrap_or_default();

        let pending = harvestable(&self.vault_key, &self.ledger.controller, &position, block)?;
        let plan = match self.ledger.vault.plan_harvest(
            &target,
            pending,
            request.amount_to_burn,
            block,
        )? {
            HarvestDecision::Proceed(plan) => plan,
            HarvestDecision::Skip(outcome) => return Ok(outcome),
        };

        let minted = self.controller_mint(request.burn_to_address, block)?;
        assert_eq!(minted, plan.pending);

        let mut caller_depositor = self
            .ledger
            .depositors
            .get(&caller)
            .cloned()
            .ok_or(ErrorCode::AccountNotInitialized)?;
        self.ledger
            .vault
            .apply_harvest(&plan, &mut caller_depositor, block)?;
        self.ledger.depositors.insert(caller, caller_depositor);

        Ok(HarvestOutcome::Success)
    }

    /// The controller's mint_to_address with the vault as minter and recipient
    fn controller_mint(&mut self, source: Pubkey, target_block: u64) -> Result<u64> {
        let vault_key = self.vault_key;
        let mut position = self
            .ledger
            .positions
            .get(&source)
            .cloned()
            .ok_or(ErrorCode::AccountNotInitialized)?;
        position.check_mint(&vault_key, target_block, self.block)?;

        let amount = self.ledger.controller.mintable(&position, target_block)?;

        self.ledger.controller.enter()?;
        *self.ledger.tokens.entry(vault_key).or_default() += amount;
        position.advance_mint(target_block);
        self.ledger.positions.insert(source, position);
        self.ledger.controller.record_mint(amount);
        self.ledger.controller.leave();
        Ok(amount)
    }

    fn depositor_entry(&self, owner: Pubkey) -> Depositor {
        let mut depositor = self
            .ledger
            .depositors
            .get(&owner)
            .cloned()
            .unwrap_or_default();
        depositor.bind(self.vault_key, owner, 255);
        depositor
    }

    fn move_tokens(&mut self, from: Pubkey, to: Pubkey, amount: u64) -> Result<()> {
        let balance = self.ledger.tokens.entry(from).or_default();
        require!(*balance >= amount, VaultError::InsufficientBalance);
        *balance -= amount;
        *self.ledger.tokens.entry(to).or_default() += amount;
        Ok(())
    }

    fn atomic<T>(&mut self, op: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.ledger.clone();
        let result = op(self);
        if result.is_err() {
            self.ledger = snapshot;
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mint_lock_controller::config::SCALE;

    const START: u64 = 1_000;

    /// Flat accrual: one token per locked token per block
    fn flat() -> AccrualConfig {
        AccrualConfig {
            time_bonus_start_blocks: 0,
            time_bonus_end_blocks: 1_000,
            max_time_multiplier: SCALE,
            max_burn_multiplier: SCALE,
        }
    }

    /// A vault seeded with 1_000_000 tokens from one depositor
    fn seeded() -> (Simulation, Pubkey) {
        let mut sim = Simulation::new(flat(), START);
        let lp = Pubkey::new_unique();
        sim.fund(lp, 1_000_000);
        sim.approve(lp, 1_000_000);
        assert_eq!(sim.deposit(lp, 1_000_000, 0, 0, 0).unwrap(), 1_000_000);
        (sim, lp)
    }

    /// A validator who delegated minting to the vault and tips `bps`
    fn validator(sim: &mut Simulation, locked: u64, bps: u16) -> Pubkey {
        let validator = Pubkey::new_unique();
        let vault_key = sim.vault_key;
        sim.lock(validator, vault_key, locked).unwrap();
        sim.deposit(validator, 0, bps, 0, 0).unwrap();
        validator
    }

    /// A keeper registered with default settings and no shares
    fn harvester(sim: &mut Simulation) -> Pubkey {
        let harvester = Pubkey::new_unique();
        sim.deposit(harvester, 0, 0, 0, 0).unwrap();
        harvester
    }

    #[test]
    fn test_deposit_withdraw_round_trip() {
        let (mut sim, lp) = seeded();
        assert_eq!(sim.balance_of(&lp), 0);
        assert_eq!(sim.preview_withdraw(&lp).unwrap(), 1_000_000);

        assert_eq!(sim.withdraw_all(lp).unwrap(), 1_000_000);
        assert_eq!(sim.balance_of(&lp), 1_000_000);
        assert_eq!(sim.vault().pool, Pool::default());

        assert_eq!(
            sim.withdraw_all(lp).unwrap_err(),
            VaultError::NothingToWithdraw.into()
        );
    }

    #[test]
    fn test_deposit_requires_approval_and_valid_settings() {
        let mut sim = Simulation::new(flat(), START);
        let owner = Pubkey::new_unique();
        sim.fund(owner, 100);

        assert_eq!(
            sim.deposit(owner, 100, 0, 0, 0).unwrap_err(),
            VaultError::NotOperator.into()
        );

        sim.approve(owner, 500);
        assert_eq!(
            sim.deposit(owner, 500, 0, 0, 0).unwrap_err(),
            VaultError::InsufficientBalance.into()
        );
        assert_eq!(
            sim.deposit(owner, 100, 10_001, 0, 0).unwrap_err(),
            VaultError::RewardsPercentTooHigh.into()
        );
        assert!(sim.depositor(&owner).is_none());
        assert_eq!(sim.balance_of(&owner), 100);

        assert_eq!(sim.deposit(owner, 100, 10_000, 7, 8).unwrap(), 100);
        let depositor = sim.depositor(&owner).unwrap();
        assert_eq!(depositor.share_balance, 100);
        assert_eq!(depositor.rewards_percent_bps, 10_000);
        assert_eq!(depositor.min_block_number, 7);
        assert_eq!(depositor.min_burn_amount, 8);
    }

    #[test]
    fn test_first_harvest_in_block_takes_full_jackpot() {
        let (mut sim, lp) = seeded();
        let first = validator(&mut sim, 1_000, 500);
        let second = validator(&mut sim, 1_000, 500);
        sim.advance(10);

        let alice = harvester(&mut sim);
        let bob = harvester(&mut sim);

        // 10 blocks x 1_000 locked, 5% tip, all of it to alice
        assert_eq!(
            sim.burn_tokens(alice, 0, first).unwrap(),
            HarvestOutcome::Success
        );
        assert_eq!(sim.balance_of(&sim.vault_key), 1_010_000);
        assert_eq!(sim.vault().pool.total_value, 1_010_000);
        assert_eq!(sim.depositor(&alice).unwrap().share_balance, 495);

        // same block, different target: half the tip
        assert_eq!(
            sim.burn_tokens(bob, 0, second).unwrap(),
            HarvestOutcome::Success
        );
        assert_eq!(sim.depositor(&bob).unwrap().share_balance, 245);
        assert_eq!(sim.vault().total_jackpots, 750);
        assert_eq!(sim.vault().harvest_count, 2);
        assert_eq!(sim.vault().total_harvested, 20_000);

        // the retained half of bob's tip accrues to everyone
        assert_eq!(sim.preview_withdraw(&lp).unwrap(), 1_019_245);

        sim.advance(1);
        assert_eq!(
            sim.burn_tokens(bob, 0, second).unwrap(),
            HarvestOutcome::Success
        );
        assert_eq!(sim.vault().total_jackpots, 800);
        assert_eq!(sim.vault().last_harvest_block, START + 11);
    }

    #[test]
    fn test_harvest_skips_leave_state_untouched() {
        let (mut sim, _) = seeded();
        let target = validator(&mut sim, 1_000, 500);
        let caller = harvester(&mut sim);
        sim.deposit(target, 0, 500, START + 20, 5_000).unwrap();

        sim.advance(10);
        let before = sim.vault().pool;

        assert_eq!(
            sim.burn_tokens(caller, 0, target).unwrap(),
            HarvestOutcome::ValidatorMinBlockNotMet
        );

        sim.advance(10);
        assert_eq!(
            sim.burn_tokens(caller, 4_999, target).unwrap(),
            HarvestOutcome::ValidatorMinBurnAmountNotMet
        );

        sim.set_paused(target, true);
        assert_eq!(
            sim.burn_tokens(caller, 0, target).unwrap(),
            HarvestOutcome::ValidatorPaused
        );

        assert_eq!(sim.vault().pool, before);
        assert_eq!(sim.vault().harvest_count, 0);
        assert_eq!(sim.position(&target).unwrap().last_mint_block, START);

        sim.set_paused(target, false);
        assert_eq!(
            sim.burn_tokens(caller, 5_000, target).unwrap(),
            HarvestOutcome::Success
        );
        // burn amount only sizes the tip; the whole pending amount is minted
        assert_eq!(sim.vault().total_harvested, 20_000);
        assert_eq!(sim.vault().total_jackpots, 250);
    }

    #[test]
    fn test_nothing_to_mint() {
        let (mut sim, _) = seeded();
        let caller = harvester(&mut sim);

        // no depositor and no lock position
        let unknown = Pubkey::new_unique();

        // registered but never locked
        let idle = Pubkey::new_unique();
        sim.deposit(idle, 0, 500, 0, 0).unwrap();

        // locked with a minter other than the vault
        let independent = Pubkey::new_unique();
        sim.lock(independent, independent, 1_000).unwrap();
        sim.deposit(independent, 0, 500, 0, 0).unwrap();

        let target = validator(&mut sim, 1_000, 500);
        sim.advance(5);

        assert_eq!(
            sim.burn_tokens(caller, 0, unknown).unwrap(),
            HarvestOutcome::NothingToMint
        );
        assert!(sim.position(&unknown).is_none());
        assert!(sim.depositor(&unknown).is_none());
        assert_eq!(
            sim.burn_tokens(caller, 0, idle).unwrap(),
            HarvestOutcome::NothingToMint
        );
        assert_eq!(
            sim.burn_tokens(caller, 0, independent).unwrap(),
            HarvestOutcome::NothingToMint
        );
        assert_eq!(
            sim.burn_tokens(caller, 0, target).unwrap(),
            HarvestOutcome::Success
        );
        // already minted through this block
        assert_eq!(
            sim.burn_tokens(caller, 0, target).unwrap(),
            HarvestOutcome::NothingToMint
        );
    }

    #[test]
    fn test_empty_pool_cannot_pay_tip() {
        let mut sim = Simulation::new(flat(), START);
        let target = validator(&mut sim, 1_000, 500);
        let caller = harvester(&mut sim);
        sim.advance(10);

        assert_eq!(
            sim.burn_tokens(caller, 0, target).unwrap(),
            HarvestOutcome::InsufficientContractBalance
        );
        assert_eq!(sim.balance_of(&sim.vault_key), 0);

        // a zero tip needs no balance
        sim.deposit(target, 0, 0, 0, 0).unwrap();
        assert_eq!(
            sim.burn_tokens(caller, 0, target).unwrap(),
            HarvestOutcome::Success
        );
        assert_eq!(sim.vault().pool.total_value, 10_000);
        assert_eq!(sim.depositor(&caller).unwrap().share_balance, 0);
    }

    #[test]
    fn test_burn_credit_raises_harvest() {
        let mut accrual = flat();
        accrual.max_burn_multiplier = 2 * SCALE;
        let mut sim = Simulation::new(accrual, START);
        let target = validator(&mut sim, 1_000, 0);
        sim.credit_burn(target, 50).unwrap();
        sim.advance(10);

        let caller = harvester(&mut sim);
        assert_eq!(
            sim.burn_tokens(caller, 0, target).unwrap(),
            HarvestOutcome::Success
        );
        assert_eq!(sim.vault().total_harvested, 20_000);
    }

    #[test]
    fn test_batch_isolates_failed_entries() {
        let (mut sim, _) = seeded();
        let paused = validator(&mut sim, 1_000, 500);
        sim.set_paused(paused, true);
        let active = validator(&mut sim, 1_000, 500);
        let idle = Pubkey::new_unique();
        sim.deposit(idle, 0, 500, 0, 0).unwrap();
        sim.advance(10);

        let caller = harvester(&mut sim);
        let request = |burn_to_address| BurnRequest {
            amount_to_burn: 0,
            burn_to_address,
        };

        let outcomes = sim
            .burn_tokens_from_addresses(
                caller,
                &[request(paused), request(active), request(idle), request(active)],
            )
            .unwrap();
        assert_eq!(
            outcomes,
            vec![
                HarvestOutcome::ValidatorPaused,
                HarvestOutcome::Success,
                HarvestOutcome::NothingToMint,
                HarvestOutcome::NothingToMint,
            ]
        );
        assert_eq!(sim.vault().harvest_count, 1);
        assert_eq!(sim.depositor(&caller).unwrap().share_balance, 495);
        assert_eq!(sim.position(&paused).unwrap().last_mint_block, START);
    }

    #[test]
    fn test_batch_skips_targets_without_accounts() {
        let (mut sim, _) = seeded();
        let active = validator(&mut sim, 1_000, 500);
        // locked with the vault as minter but never registered: default settings
        let stranger = Pubkey::new_unique();
        let vault_key = sim.vault_key;
        sim.lock(stranger, vault_key, 1_000).unwrap();
        let unknown = Pubkey::new_unique();
        sim.advance(10);

        let caller = harvester(&mut sim);
        let request = |burn_to_address| BurnRequest {
            amount_to_burn: 0,
            burn_to_address,
        };

        let outcomes = sim
            .burn_tokens_from_addresses(
                caller,
                &[request(unknown), request(stranger), request(active)],
            )
            .unwrap();
        assert_eq!(
            outcomes,
            vec![
                HarvestOutcome::NothingToMint,
                HarvestOutcome::Success,
                HarvestOutcome::Success,
            ]
        );
        assert_eq!(sim.vault().harvest_count, 2);
        assert_eq!(sim.vault().total_harvested, 20_000);
        // stranger tips nothing; active's 5% lands in the same block at half
        assert_eq!(sim.vault().total_jackpots, 250);
        assert!(sim.depositor(&stranger).is_none());
        assert!(sim.depositor(&unknown).is_none());
        assert_eq!(sim.position(&stranger).unwrap().last_mint_block, START + 10);
        assert_eq!(sim.position(&active).unwrap().last_mint_block, START + 10);
    }

    #[test]
    fn test_unregistered_caller_cannot_harvest() {
        let (mut sim, _) = seeded();
        let active = validator(&mut sim, 1_000, 500);
        sim.advance(10);

        let caller = Pubkey::new_unique();
        let requests = [BurnRequest {
            amount_to_burn: 0,
            burn_to_address: active,
        }];

        assert_eq!(
            sim.burn_tokens(caller, 0, active).unwrap_err(),
            ErrorCode::AccountNotInitialized.into()
        );
        assert_eq!(
            sim.burn_tokens_from_addresses(caller, &requests).unwrap_err(),
            ErrorCode::AccountNotInitialized.into()
        );
        assert_eq!(sim.vault().harvest_count, 0);
        assert_eq!(sim.position(&active).unwrap().last_mint_block, START);
        assert!(sim.depositor(&caller).is_none());
    }
}
