// 💳 Account Entity - a named balance with validated deposit, withdraw, transfer
//
// "Account UUID is IDENTITY (never changes), name is the label, balance is the value"
//
// Rules enforced here:
// - Deposits must be strictly positive
// - Withdrawals must be strictly positive and never exceed the balance
// - Transfers validate both legs before touching either balance

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;
use uuid::Uuid;

use crate::error::{AccountError, AccountResult, RegistryError, RegistryResult};

// ============================================================================
// ACCOUNT ENTITY
// ============================================================================

/// Account Entity
///
/// Identity: UUID and opening time (never change)
/// Label: name (fixed at creation)
/// Value: balance (changes only through deposit / withdraw / transfer)
#[derive(Debug, Clone, Serialize)]
pub struct Account {
    id: Uuid,
    name: String,
    balance: f64,
    opened_at: DateTime<Utc>,
}

impl Account {
    /// Create an account holding `initial_balance`.
    ///
    /// The opening balance is taken as given; only the operations below are
    /// validated.
    pub fn new(name: impl Into<String>, initial_balance: f64) -> Self {
        Account {
            id: Uuid::new_v4(),
            name: name.into(),
            balance: initial_balance,
            opened_at: Utc::now(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn balance(&self) -> f64 {
        self.balance
    }

    pub fn opened_at(&self) -> DateTime<Utc> {
        self.opened_at
    }

    /// Add `amount` to the balance.
    ///
    /// Fails with "Deposit amount must be positive" when `amount <= 0`.
    pub fn deposit(&mut self, amount: f64) -> AccountResult<()> {
        Self::check_deposit(amount)?;
        self.balance += amount;
        Ok(())
    }

    /// Take `amount` out of the balance.
    ///
    /// Fails with "Insufficient funds" when `amount` exceeds the balance, and
    /// with "Withdrawal amount must be positive" when `amount <= 0`.
    pub fn withdraw(&mut self, amount: f64) -> AccountResult<()> {
        self.check_withdrawal(amount)?;
        self.balance -= amount;
        Ok(())
    }

    /// Move `amount` from this account into `other`.
    ///
    /// Behaves as `withdraw` followed by `other.deposit`, but both legs are
    /// checked first: on error neither balance has moved.
    pub fn transfer(&mut self, other: &mut Account, amount: f64) -> AccountResult<()> {
        self.check_withdrawal(amount)?;
        Self::check_deposit(amount)?;

        self.balance -= amount;
        other.balance += amount;
        Ok(())
    }

    fn check_deposit(amount: f64) -> AccountResult<()> {
        if amount <= 0.0 {
            return Err(AccountError::NonPositiveDeposit { amount });
        }
        if !amount.is_finite() {
            return Err(AccountError::NonFiniteAmount { amount });
        }
        Ok(())
    }

    fn check_withdrawal(&self, amount: f64) -> AccountResult<()> {
        if amount <= 0.0 {
            return Err(AccountError::NonPositiveWithdrawal { amount });
        }
        if !amount.is_finite() {
            return Err(AccountError::NonFiniteAmount { amount });
        }
        if amount > self.balance {
            return Err(AccountError::InsufficientFunds {
                requested: amount,
                available: self.balance,
            });
        }
        Ok(())
    }
}

// ============================================================================
// ACCOUNT REGISTRY
// ============================================================================

/// Registry of open accounts, in opening order.
///
/// Cloning the registry shares the same accounts. Names are unique
/// (case-insensitive) so operations can address accounts by name.
#[derive(Clone, Default)]
pub struct AccountRegistry {
    accounts: Arc<RwLock<Vec<Account>>>,
}

impl AccountRegistry {
    /// Create new empty registry
    pub fn new() -> Self {
        AccountRegistry {
            accounts: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Open a new account and return its id.
    pub fn open(&self, name: &str, initial_balance: f64) -> RegistryResult<Uuid> {
        self.register(Account::new(name, initial_balance))
    }

    /// Add a prebuilt account. Names must be unique.
    pub fn register(&self, account: Account) -> RegistryResult<Uuid> {
        let mut accounts = self.write();
        if position_by_name(&accounts, &account.name).is_some() {
            return Err(RegistryError::DuplicateAccount(account.name));
        }

        let id = account.id;
        debug!(
            %id,
            name = %account.name,
            balance = account.balance,
            "account opened"
        );
        accounts.push(account);
        Ok(id)
    }

    /// Find account by UUID
    pub fn find_by_id(&self, id: Uuid) -> Option<Account> {
        self.read().iter().find(|a| a.id == id).cloned()
    }

    /// Find account by name (case-insensitive)
    pub fn find_by_name(&self, name: &str) -> Option<Account> {
        let accounts = self.read();
        let idx = position_by_name(&accounts, name)?;
        Some(accounts[idx].clone())
    }

    pub fn balance_of(&self, name: &str) -> RegistryResult<f64> {
        self.find_by_name(name)
            .map(|a| a.balance)
            .ok_or_else(|| RegistryError::AccountNotFound(name.to_string()))
    }

    /// Deposit into the named account, returning the new balance.
    pub fn deposit(&self, name: &str, amount: f64) -> RegistryResult<f64> {
        let mut accounts = self.write();
        let account = lookup_mut(&mut accounts, name)?;

        account.deposit(amount).inspect_err(|err| {
            debug!(account = name, amount, %err, "deposit rejected");
        })?;

        debug!(
            account = name,
            amount,
            balance = account.balance,
            "deposit applied"
        );
        Ok(account.balance)
    }

    /// Withdraw from the named account, returning the new balance.
    pub fn withdraw(&self, name: &str, amount: f64) -> RegistryResult<f64> {
        let mut accounts = self.write();
        let account = lookup_mut(&mut accounts, name)?;

        account.withdraw(amount).inspect_err(|err| {
            debug!(account = name, amount, %err, "withdrawal rejected");
        })?;

        debug!(
            account = name,
            amount,
            balance = account.balance,
            "withdrawal applied"
        );
        Ok(account.balance)
    }

    /// Transfer between two named accounts under one lock.
    pub fn transfer(&self, from: &str, to: &str, amount: f64) -> RegistryResult<()> {
        let mut accounts = self.write();
        let source_idx = position_by_name(&accounts, from)
            .ok_or_else(|| RegistryError::AccountNotFound(from.to_string()))?;
        let target_idx = position_by_name(&accounts, to)
            .ok_or_else(|| RegistryError::AccountNotFound(to.to_string()))?;
        if source_idx == target_idx {
            return Err(RegistryError::SelfTransfer);
        }

        let (source, target) = pair_mut(&mut accounts, source_idx, target_idx);
        source.transfer(target, amount).inspect_err(|err| {
            debug!(from, to, amount, %err, "transfer rejected");
        })?;

        debug!(
            from,
            to,
            amount,
            from_balance = source.balance,
            to_balance = target.balance,
            "transfer applied"
        );
        Ok(())
    }

    /// All accounts in opening order
    pub fn all_accounts(&self) -> Vec<Account> {
        self.read().clone()
    }

    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Sum of every balance. Unchanged by any successful transfer.
    pub fn total_balance(&self) -> f64 {
        self.read().iter().map(|a| a.balance).sum()
    }

    // A panic while holding the lock cannot leave an account half-updated,
    // since every mutation is validated before it is applied.
    fn read(&self) -> RwLockReadGuard<'_, Vec<Account>> {
        self.accounts.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, Vec<Account>> {
        self.accounts.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn position_by_name(accounts: &[Account], name: &str) -> Option<usize> {
    let lower_name = name.to_lowercase();
    accounts
        .iter()
        .position(|a| a.name.to_lowercase() == lower_name)
}

fn lookup_mut<'a>(accounts: &'a mut [Account], name: &str) -> RegistryResult<&'a mut Account> {
    let idx = position_by_name(accounts, name)
        .ok_or_else(|| RegistryError::AccountNotFound(name.to_string()))?;
    Ok(&mut accounts[idx])
}

/// Borrow two distinct accounts mutably. `a != b` is required.
fn pair_mut(accounts: &mut [Account], a: usize, b: usize) -> (&mut Account, &mut Account) {
    if a < b {
        let (left, right) = accounts.split_at_mut(b);
        (&mut left[a], &mut right[0])
    } else {
        let (left, right) = accounts.split_at_mut(a);
        (&mut right[0], &mut left[b])
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_creation() {
        let account = Account::new("Alice", 1000.0);

        assert!(!account.id().is_nil());
        assert_eq!(account.name(), "Alice");
        assert_eq!(account.balance(), 1000.0);
        assert!(account.opened_at() <= Utc::now());
    }

    #[test]
    fn test_accounts_get_distinct_ids() {
        let a = Account::new("Alice", 0.0);
        let b = Account::new("Alice", 0.0);
        assert_ne!(a.id(), b.id());
    }

    #[test]
    fn test_deposit_increases_balance() {
        let mut account = Account::new("Alice", 1000.0);
        account.deposit(200.0).unwrap();
        assert_eq!(account.balance(), 1200.0);
    }

    #[test]
    fn test_deposit_rejects_zero_and_negative() {
        let mut account = Account::new("Alice", 1000.0);

        for amount in [0.0, -100.0, f64::NEG_INFINITY] {
            let err = account.deposit(amount).unwrap_err();
            assert_eq!(err.to_string(), "Deposit amount must be positive");
        }
        assert_eq!(account.balance(), 1000.0);
    }

    #[test]
    fn test_deposit_rejects_non_finite() {
        let mut account = Account::new("Alice", 1000.0);

        assert!(matches!(
            account.deposit(f64::NAN),
            Err(AccountError::NonFiniteAmount { .. })
        ));
        assert!(matches!(
            account.deposit(f64::INFINITY),
            Err(AccountError::NonFiniteAmount { .. })
        ));
        assert_eq!(account.balance(), 1000.0);
    }

    #[test]
    fn test_withdraw_decreases_balance() {
        let mut account = Account::new("Alice", 1000.0);
        account.withdraw(300.0).unwrap();
        assert_eq!(account.balance(), 700.0);
    }

    #[test]
    fn test_withdraw_entire_balance() {
        let mut account = Account::new("Alice", 1000.0);
        account.withdraw(1000.0).unwrap();
        assert_eq!(account.balance(), 0.0);
    }

    #[test]
    fn test_withdraw_insufficient_funds() {
        let mut account = Account::new("Alice", 1000.0);

        let err = account.withdraw(2000.0).unwrap_err();
        assert_eq!(err.to_string(), "Insufficient funds");
        assert_eq!(
            err,
            AccountError::InsufficientFunds {
                requested: 2000.0,
                available: 1000.0,
            }
        );
        assert_eq!(account.balance(), 1000.0);
    }

    #[test]
    fn test_withdraw_rejects_non_positive() {
        let mut account = Account::new("Alice", 1000.0);

        for amount in [0.0, -50.0] {
            let err = account.withdraw(amount).unwrap_err();
            assert_eq!(err.to_string(), "Withdrawal amount must be positive");
        }
        assert!(matches!(
            account.withdraw(f64::NAN),
            Err(AccountError::NonFiniteAmount { .. })
        ));
        assert_eq!(account.balance(), 1000.0);
    }

    #[test]
    fn test_transfer_moves_funds() {
        let mut alice = Account::new("Alice", 1000.0);
        let mut bob = Account::new("Bob", 500.0);

        alice.transfer(&mut bob, 200.0).unwrap();

        assert_eq!(alice.balance(), 800.0);
        assert_eq!(bob.balance(), 700.0);
    }

    #[test]
    fn test_transfer_insufficient_leaves_both_untouched() {
        let mut alice = Account::new("Alice", 1000.0);
        let mut bob = Account::new("Bob", 500.0);

        let err = alice.transfer(&mut bob, 2000.0).unwrap_err();

        assert_eq!(err.to_string(), "Insufficient funds");
        assert_eq!(alice.balance(), 1000.0);
        assert_eq!(bob.balance(), 500.0);
    }

    #[test]
    fn test_transfer_rejects_negative_amount() {
        let mut alice = Account::new("Alice", 1000.0);
        let mut bob = Account::new("Bob", 500.0);

        let err = alice.transfer(&mut bob, -200.0).unwrap_err();

        assert_eq!(err, AccountError::NonPositiveWithdrawal { amount: -200.0 });
        assert_eq!(alice.balance(), 1000.0);
        assert_eq!(bob.balance(), 500.0);
    }

    #[test]
    fn test_transfer_rejects_zero_amount() {
        let mut alice = Account::new("Alice", 1000.0);
        let mut bob = Account::new("Bob", 500.0);

        let err = alice.transfer(&mut bob, 0.0).unwrap_err();

        assert_eq!(err.to_string(), "Withdrawal amount must be positive");
        assert_eq!(alice.balance(), 1000.0);
        assert_eq!(bob.balance(), 500.0);
    }

    #[test]
    fn test_transfer_rejects_non_finite_amounts() {
        let mut alice = Account::new("Alice", 1000.0);
        let mut bob = Account::new("Bob", 500.0);

        for amount in [f64::NAN, f64::INFINITY] {
            let err = alice.transfer(&mut bob, amount).unwrap_err();
            assert_eq!(err.to_string(), "Amount must be a finite number");
            assert_eq!(alice.balance(), 1000.0);
            assert_eq!(bob.balance(), 500.0);
        }
    }

    #[test]
    fn test_account_serializes_snapshot() {
        let account = Account::new("Alice", 1000.0);
        let json = serde_json::to_value(&account).unwrap();

        assert_eq!(json["name"], "Alice");
        assert_eq!(json["balance"], 1000.0);
        assert_eq!(json["id"], account.id().to_string());
        assert!(json["opened_at"].is_string());
    }

    #[test]
    fn test_registry_open_and_find() {
        let registry = AccountRegistry::new();
        let id = registry.open("Alice", 1000.0).unwrap();

        assert_eq!(registry.count(), 1);
        assert_eq!(registry.find_by_id(id).unwrap().name(), "Alice");
        assert_eq!(registry.find_by_name("alice").unwrap().id(), id);
        assert!(registry.find_by_name("Bob").is_none());
        assert!(registry.find_by_id(Uuid::new_v4()).is_none());
    }

    #[test]
    fn test_registry_rejects_duplicate_names() {
        let registry = AccountRegistry::new();
        registry.open("Alice", 1000.0).unwrap();

        let err = registry.open("ALICE", 5.0).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateAccount("ALICE".to_string()));
        assert_eq!(registry.count(), 1);
    }

    #[test]
    fn test_registry_deposit_and_withdraw() {
        let registry = AccountRegistry::new();
        registry.open("Alice", 1000.0).unwrap();

        assert_eq!(registry.deposit("Alice", 200.0).unwrap(), 1200.0);
        assert_eq!(registry.withdraw("Alice", 300.0).unwrap(), 900.0);
        assert_eq!(registry.balance_of("Alice").unwrap(), 900.0);
    }

    #[test]
    fn test_registry_propagates_account_errors() {
        let registry = AccountRegistry::new();
        registry.open("Alice", 1000.0).unwrap();

        let err = registry.withdraw("Alice", 2000.0).unwrap_err();
        assert_eq!(err.to_string(), "Insufficient funds");

        let err = registry.deposit("Alice", -1.0).unwrap_err();
        assert_eq!(
            err,
            RegistryError::Account(AccountError::NonPositiveDeposit { amount: -1.0 })
        );
        assert_eq!(registry.balance_of("Alice").unwrap(), 1000.0);
    }

    #[test]
    fn test_registry_unknown_account() {
        let registry = AccountRegistry::new();

        assert_eq!(
            registry.deposit("Nobody", 10.0).unwrap_err(),
            RegistryError::AccountNotFound("Nobody".to_string())
        );
        assert!(registry.balance_of("Nobody").is_err());
    }

    #[test]
    fn test_registry_transfer_both_directions() {
        let registry = AccountRegistry::new();
        registry.open("Alice", 1000.0).unwrap();
        registry.open("Bob", 500.0).unwrap();

        registry.transfer("Alice", "Bob", 200.0).unwrap();
        assert_eq!(registry.balance_of("Alice").unwrap(), 800.0);
        assert_eq!(registry.balance_of("Bob").unwrap(), 700.0);

        // target opened before source exercises the other split branch
        registry.transfer("Bob", "Alice", 100.0).unwrap();
        assert_eq!(registry.balance_of("Alice").unwrap(), 900.0);
        assert_eq!(registry.balance_of("Bob").unwrap(), 600.0);

        assert_eq!(registry.total_balance(), 1500.0);
    }

    #[test]
    fn test_registry_transfer_rejections() {
        let registry = AccountRegistry::new();
        registry.open("Alice", 1000.0).unwrap();
        registry.open("Bob", 500.0).unwrap();

        assert_eq!(
            registry.transfer("Alice", "alice", 10.0).unwrap_err(),
            RegistryError::SelfTransfer
        );
        assert_eq!(
            registry.transfer("Alice", "Carol", 10.0).unwrap_err(),
            RegistryError::AccountNotFound("Carol".to_string())
        );
        let err = registry.transfer("Alice", "Bob", 2000.0).unwrap_err();
        assert!(err.is_invalid_argument());
        assert_eq!(err.to_string(), "Insufficient funds");

        assert_eq!(registry.balance_of("Alice").unwrap(), 1000.0);
        assert_eq!(registry.balance_of("Bob").unwrap(), 500.0);
    }

    #[test]
    fn test_registry_clones_share_accounts() {
        let registry = AccountRegistry::new();
        let shared = registry.clone();

        registry.open("Alice", 1000.0).unwrap();
        shared.deposit("Alice", 1.0).unwrap();

        assert_eq!(registry.balance_of("Alice").unwrap(), 1001.0);
    }

    #[test]
    fn test_registry_all_accounts_in_opening_order() {
        let registry = AccountRegistry::new();
        registry.open("C", 300.0).unwrap();
        registry.open("A", 1000.0).unwrap();
        registry.open("B", 500.0).unwrap();

        let names: Vec<String> = registry
            .all_accounts()
            .iter()
            .map(|a| a.name().to_string())
            .collect();
        assert_eq!(names, vec!["C", "A", "B"]);
    }
}
