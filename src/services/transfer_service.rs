//! Transfer coordinator - moves funds between two accounts.
//!
//! # Flow
//!
//! 1. Fetch sender and recipient concurrently; the first failure cancels the other fetch
//! 2. Reject if the sender's balance is below the amount
//! 3. Compute both new balances in memory
//! 4. Persist both records according to the `CommitStrategy`
//!
//! # Commit Strategies
//!
//! - `Atomic`: both records go out in one conditional `put_all`. If either
//!   record changed since it was read, nothing is written and the whole
//!   transfer (fetch included) runs again, up to the repository's attempt limit.
//! - `Sequential`: sender update, then recipient update, both last-writer-wins.
//!   If the recipient update fails the sender stays debited and the caller gets
//!   `PartialTransferFailure`. Concurrent transfers on the same account may
//!   overwrite each other's balance.
//!
//! `amount > 0` and `sender != recipient` are the caller's responsibility.

use crate::{
    config::CommitStrategy,
    error::AccountError,
    models::account::Account,
    services::account_service::AccountRepository,
};

/// Both records as persisted by a committed transfer.
#[derive(Debug, Clone)]
pub struct TransferReceipt {
    pub sender: Account,
    pub recipient: Account,

    /// Number of fetch-validate-commit rounds it took
    pub attempts: u32,
}

/// Result of one fetch-validate-commit round.
enum Round {
    Committed(Account, Account),
    LostRace,
}

#[derive(Clone)]
pub struct TransferCoordinator {
    accounts: AccountRepository,
    strategy: CommitStrategy,
}

impl TransferCoordinator {
    pub fn new(accounts: AccountRepository, strategy: CommitStrategy) -> Self {
        Self { accounts, strategy }
    }

    pub fn strategy(&self) -> CommitStrategy {
        self.strategy
    }

    /// Move `amount` from `sender_id` to `recipient_id`.
    ///
    /// # Errors
    ///
    /// - `NotFound`: either account is missing (nothing written)
    /// - `InsufficientBalance`: sender balance below `amount` (nothing written)
    /// - `BalanceOverflow`: either new balance would overflow (nothing written)
    /// - `StoreUnavailable`: a fetch or write failed before anything was committed
    /// - `Contention`: atomic commit lost every version race (nothing written)
    /// - `PartialTransferFailure`: sequential commit debited the sender but
    ///   failed to credit the recipient
    #[tracing::instrument(skip(self), fields(strategy = ?self.strategy))]
    pub async fn transfer(
        &self,
        sender_id: &str,
        recipient_id: &str,
        amount: i64,
    ) -> Result<TransferReceipt, AccountError> {
        let max_attempts = match self.strategy {
            CommitStrategy::Atomic => self.accounts.max_attempts(),
            CommitStrategy::Sequential => 1,
        };

        for attempt in 1..=max_attempts {
            match self.run_round(sender_id, recipient_id, amount).await? {
                Round::Committed(sender, recipient) => {
                    tracing::info!(
                        attempt,
                        sender_balance = sender.balance,
                        recipient_balance = recipient.balance,
                        "transfer committed"
                    );
                    return Ok(TransferReceipt {
                        sender,
                        recipient,
                        attempts: attempt,
                    });
                }
                Round::LostRace => {
                    tracing::warn!(attempt, "transfer lost a version race, retrying");
                }
            }
        }

        Err(AccountError::Contention {
            attempts: max_attempts,
        })
    }

    async fn run_round(
        &self,
        sender_id: &str,
        recipient_id: &str,
        amount: i64,
    ) -> Result<Round, AccountError> {
        let (mut sender, mut recipient) = self.fetch_both(sender_id, recipient_id).await?;

        if sender.balance < amount {
            return Err(AccountError::InsufficientBalance {
                identifier: sender.identifier,
                balance: sender.balance,
                requested: amount,
            });
        }

        sender.balance = sender
            .balance
            .checked_sub(amount)
            .ok_or_else(|| AccountError::BalanceOverflow(sender.identifier.clone()))?;
        recipient.balance = recipient
            .balance
            .checked_add(amount)
            .ok_or_else(|| AccountError::BalanceOverflow(recipient.identifier.clone()))?;

        match self.strategy {
            CommitStrategy::Atomic => Ok(self
                .accounts
                .update_pair_if_unchanged(&sender, &recipient)
                .await?
                .map_or(Round::LostRace, |(sender, recipient)| {
                    Round::Committed(sender, recipient)
                })),
            CommitStrategy::Sequential => {
                let sender = self.accounts.update(&sender).await?;

                match self.accounts.update(&recipient).await {
                    Ok(recipient) => Ok(Round::Committed(sender, recipient)),
                    Err(cause) => {
                        tracing::error!(
                            sender = %sender.identifier,
                            recipient = %recipient.identifier,
                            amount,
                            error = %cause,
                            "recipient credit failed after sender debit was committed"
                        );
                        Err(AccountError::PartialTransferFailure {
                            sender: sender.identifier,
                            recipient: recipient.identifier,
                            cause: Box::new(cause),
                        })
                    }
                }
            }
        }
    }

    /// Fan out both reads and join them.
    ///
    /// `try_join!` polls both fetches concurrently and returns as soon as one
    /// fails, dropping the other one still in flight.
    async fn fetch_both(
        &self,
        sender_id: &str,
        recipient_id: &str,
    ) -> Result<(Account, Account), AccountError> {
        tokio::try_join!(self.accounts.get(sender_id), self.accounts.get(recipient_id))
    }
}
