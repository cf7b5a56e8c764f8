//! Settlement domain types.

use chrono::{DateTime, Utc};
use divvy_shared::types::{GroupId, MemberId, Money, SettlementId};
use serde::Serialize;

/// A recorded payment between two members reducing a net balance.
///
/// Created by the debtor (`from`) paying the creditor (`to`). The
/// amount stays editable by the payer, and the record deletable, until
/// the receiver approves it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settlement {
    /// The settlement ID.
    pub id: SettlementId,
    /// The group this settlement belongs to.
    pub group: GroupId,
    /// The paying member (the debtor).
    pub from: MemberId,
    /// The receiving member (the creditor).
    pub to: MemberId,
    /// The amount paid, in cents.
    pub amount: Money,
    /// When the settlement was recorded.
    pub created_at: DateTime<Utc>,
    /// Whether the receiver has approved the payment.
    pub approved: bool,
}
