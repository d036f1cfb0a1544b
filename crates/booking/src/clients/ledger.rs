//! Ledger client trait and in-memory implementation.

use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use common::{BookingId, Money, OperationToken, UserId};

use super::ClientError;

/// Client for the ledger's token reservation and withdrawal operations.
///
/// Withdrawals always carry a token the caller reserved first; retries of
/// the same withdrawal reuse the token and collapse to one effect.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Reserves an idempotency token for the user. Reserving a token that
    /// already exists is a no-op, so this call is safe to repeat.
    async fn reserve_token(&self, user_id: UserId, token: OperationToken)
    -> Result<(), ClientError>;

    /// Asks the ledger to withdraw `amount` under the given token.
    ///
    /// The acknowledgment only confirms the request was delivered; the
    /// outcome arrives through the payment callback.
    async fn withdraw(
        &self,
        user_id: UserId,
        token: OperationToken,
        amount: Money,
        booking_id: BookingId,
    ) -> Result<(), ClientError>;
}

#[async_trait]
impl<T: LedgerClient + ?Sized> LedgerClient for std::sync::Arc<T> {
    async fn reserve_token(
        &self,
        user_id: UserId,
        token: OperationToken,
    ) -> Result<(), ClientError> {
        (**self).reserve_token(user_id, token).await
    }

    async fn withdraw(
        &self,
        user_id: UserId,
        token: OperationToken,
        amount: Money,
        booking_id: BookingId,
    ) -> Result<(), ClientError> {
        (**self).withdraw(user_id, token, amount, booking_id).await
    }
}

#[derive(Debug, Default)]
struct InMemoryLedgerState {
    reserved_tokens: Vec<(UserId, OperationToken)>,
    withdraw_calls: Vec<(UserId, OperationToken, Money, BookingId)>,
    fail_on_reserve: bool,
    fail_on_withdraw: bool,
}

/// In-memory ledger client for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerClient {
    state: Arc<RwLock<InMemoryLedgerState>>,
}

impl InMemoryLedgerClient {
    /// Creates a new in-memory ledger client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the client to fail reserve calls.
    pub fn set_fail_on_reserve(&self, fail: bool) {
        self.state.write().unwrap().fail_on_reserve = fail;
    }

    /// Configures the client to fail withdraw calls.
    pub fn set_fail_on_withdraw(&self, fail: bool) {
        self.state.write().unwrap().fail_on_withdraw = fail;
    }

    /// Returns the number of withdraw calls made.
    pub fn withdraw_count(&self) -> usize {
        self.state.read().unwrap().withdraw_calls.len()
    }

    /// Returns the tokens used by withdraw calls for the booking.
    pub fn withdraw_tokens(&self, booking_id: BookingId) -> Vec<OperationToken> {
        self.state
            .read()
            .unwrap()
            .withdraw_calls
            .iter()
            .filter(|(_, _, _, b)| *b == booking_id)
            .map(|(_, t, _, _)| *t)
            .collect()
    }

    /// Returns true if the token was reserved before any withdraw used it.
    pub fn token_reserved(&self, user_id: UserId, token: OperationToken) -> bool {
        self.state
            .read()
            .unwrap()
            .reserved_tokens
            .contains(&(user_id, token))
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedgerClient {
    async fn reserve_token(
        &self,
        user_id: UserId,
        token: OperationToken,
    ) -> Result<(), ClientError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_reserve {
            return Err(ClientError("ledger unreachable".to_string()));
        }
        if !state.reserved_tokens.contains(&(user_id, token)) {
            state.reserved_tokens.push((user_id, token));
        }
        Ok(())
    }

    async fn withdraw(
        &self,
        user_id: UserId,
        token: OperationToken,
        amount: Money,
        booking_id: BookingId,
    ) -> Result<(), ClientError> {
        let mut state = self.state.write().unwrap();
        if state.fail_on_withdraw {
            return Err(ClientError("ledger unreachable".to_string()));
        }
        state
            .withdraw_calls
            .push((user_id, token, amount, booking_id));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_reserve_and_withdraw() {
        let client = InMemoryLedgerClient::new();
        let user = UserId::new();
        let booking_id = BookingId::new();
        let token = OperationToken::for_booking(booking_id);

        client.reserve_token(user, token).await.unwrap();
        client
            .withdraw(user, token, Money::from_cents(2000), booking_id)
            .await
            .unwrap();

        assert!(client.token_reserved(user, token));
        assert_eq!(client.withdraw_count(), 1);
        assert_eq!(client.withdraw_tokens(booking_id), vec![token]);
    }

    #[tokio::test]
    async fn test_fail_toggles() {
        let client = InMemoryLedgerClient::new();
        client.set_fail_on_withdraw(true);

        let booking_id = BookingId::new();
        let result = client
            .withdraw(
                UserId::new(),
                OperationToken::for_booking(booking_id),
                Money::from_cents(100),
                booking_id,
            )
            .await;
        assert!(result.is_err());
        assert_eq!(client.withdraw_count(), 0);
    }
}
