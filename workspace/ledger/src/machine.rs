//! Per-entity transition tables.
//!
//! Each workflow entity has a small, fixed state machine expressed as an
//! explicit match -- no configurable workflow engine. A `None` result means
//! the action is not legal from the given state and the coordinator turns it
//! into an `InvalidTransition` error. Any balance effect implied by a
//! transition is executed by the coordinator in the same transaction as the
//! status write.

use model::entities::budget_proposal::ProposalStatus;
use model::entities::charge_out::ChargeOutStatus;
use model::entities::expense::ExpenseStatus;
use model::entities::purchase_order::PurchaseOrderStatus;

/// Actions on a budget proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProposalAction {
    Submit,
    Approve,
    Reject,
    RequestMoreInfo,
}

impl ProposalAction {
    /// Action name handed to the authorization collaborator.
    pub fn name(&self) -> &'static str {
        match self {
            ProposalAction::Submit => "submit",
            ProposalAction::Approve => "approve",
            ProposalAction::Reject => "reject",
            ProposalAction::RequestMoreInfo => "request_more_info",
        }
    }

    /// Tag written to the history log.
    pub fn history_tag(&self) -> &'static str {
        match self {
            ProposalAction::Submit => "SUBMITTED",
            ProposalAction::Approve => "APPROVED",
            ProposalAction::Reject => "REJECTED",
            ProposalAction::RequestMoreInfo => "MORE_INFO_REQUIRED",
        }
    }
}

/// Legal proposal transitions. A proposal sent back for more information can
/// be resubmitted; Approved and Rejected are terminal.
pub fn proposal_next(from: ProposalStatus, action: ProposalAction) -> Option<ProposalStatus> {
    use ProposalAction::*;
    use ProposalStatus::*;
    match (from, action) {
        (Draft, Submit) => Some(PendingApproval),
        (MoreInfoRequired, Submit) => Some(PendingApproval),
        (PendingApproval, Approve) => Some(Approved),
        (PendingApproval, Reject) => Some(Rejected),
        (PendingApproval, RequestMoreInfo) => Some(MoreInfoRequired),
        _ => None,
    }
}

/// Actions on a purchase order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PurchaseOrderAction {
    Submit,
    Approve,
}

impl PurchaseOrderAction {
    pub fn name(&self) -> &'static str {
        match self {
            PurchaseOrderAction::Submit => "submit",
            PurchaseOrderAction::Approve => "approve",
        }
    }

    pub fn history_tag(&self) -> &'static str {
        match self {
            PurchaseOrderAction::Submit => "SUBMITTED",
            PurchaseOrderAction::Approve => "APPROVED",
        }
    }
}

/// Legal purchase order transitions. Approval is an informational gate
/// before expenses can be recorded; it carries no ledger effect.
pub fn purchase_order_next(
    from: PurchaseOrderStatus,
    action: PurchaseOrderAction,
) -> Option<PurchaseOrderStatus> {
    use PurchaseOrderAction::*;
    use PurchaseOrderStatus::*;
    match (from, action) {
        (Draft, Submit) => Some(Submitted),
        (Submitted, Approve) => Some(Approved),
        _ => None,
    }
}

/// Actions on an expense record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpenseAction {
    Submit,
    Approve,
    Reject,
    MarkPaid,
}

impl ExpenseAction {
    pub fn name(&self) -> &'static str {
        match self {
            ExpenseAction::Submit => "submit",
            ExpenseAction::Approve => "approve",
            ExpenseAction::Reject => "reject",
            ExpenseAction::MarkPaid => "mark_paid",
        }
    }

    pub fn history_tag(&self) -> &'static str {
        match self {
            ExpenseAction::Submit => "SUBMITTED",
            ExpenseAction::Approve => "APPROVED",
            ExpenseAction::Reject => "REJECTED",
            ExpenseAction::MarkPaid => "PAID",
        }
    }
}

/// Legal expense transitions. Approve carries the ledger effect (category
/// used amount). There is deliberately no edge out of Approved other than
/// MarkPaid: once an expense has consumed budget it cannot be rejected, so
/// the used-amount contribution never needs reversing.
pub fn expense_next(from: ExpenseStatus, action: ExpenseAction) -> Option<ExpenseStatus> {
    use ExpenseAction::*;
    use ExpenseStatus::*;
    match (from, action) {
        (Draft, Submit) => Some(Submitted),
        (Submitted, Approve) => Some(Approved),
        (Submitted, Reject) => Some(Rejected),
        (Approved, MarkPaid) => Some(Paid),
        _ => None,
    }
}

/// Actions on a charge-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeOutAction {
    Submit,
    Confirm,
    Reject,
    MarkPaid,
    Revert,
}

impl ChargeOutAction {
    pub fn name(&self) -> &'static str {
        match self {
            ChargeOutAction::Submit => "submit",
            ChargeOutAction::Confirm => "confirm",
            ChargeOutAction::Reject => "reject",
            ChargeOutAction::MarkPaid => "mark_paid",
            ChargeOutAction::Revert => "revert",
        }
    }

    pub fn history_tag(&self) -> &'static str {
        match self {
            ChargeOutAction::Submit => "SUBMITTED",
            ChargeOutAction::Confirm => "CONFIRMED",
            ChargeOutAction::Reject => "REJECTED",
            ChargeOutAction::MarkPaid => "PAID",
            ChargeOutAction::Revert => "REVERTED",
        }
    }
}

/// Legal charge-out transitions. Revert exists to correct mistaken
/// submissions: Submitted, Confirmed and Paid can all go back to Draft.
/// Charge-outs have no ledger effect, so the revert is a pure status change;
/// if an effect is ever attached to Confirm, Revert must reverse it.
pub fn charge_out_next(from: ChargeOutStatus, action: ChargeOutAction) -> Option<ChargeOutStatus> {
    use ChargeOutAction::*;
    use ChargeOutStatus::*;
    match (from, action) {
        (Draft, Submit) => Some(Submitted),
        (Submitted, Confirm) => Some(Confirmed),
        (Submitted, Reject) => Some(Rejected),
        (Confirmed, MarkPaid) => Some(Paid),
        (Submitted, Revert) | (Confirmed, Revert) | (Paid, Revert) => Some(Draft),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn proposal_table() {
        use ProposalStatus::*;
        assert_eq!(
            proposal_next(Draft, ProposalAction::Submit),
            Some(PendingApproval)
        );
        assert_eq!(
            proposal_next(MoreInfoRequired, ProposalAction::Submit),
            Some(PendingApproval)
        );
        assert_eq!(
            proposal_next(PendingApproval, ProposalAction::Approve),
            Some(Approved)
        );
        assert_eq!(
            proposal_next(PendingApproval, ProposalAction::Reject),
            Some(Rejected)
        );
        assert_eq!(
            proposal_next(PendingApproval, ProposalAction::RequestMoreInfo),
            Some(MoreInfoRequired)
        );

        // Terminal states stay terminal.
        assert_eq!(proposal_next(Approved, ProposalAction::Approve), None);
        assert_eq!(proposal_next(Approved, ProposalAction::Submit), None);
        assert_eq!(proposal_next(Rejected, ProposalAction::Submit), None);
        assert_eq!(proposal_next(Draft, ProposalAction::Approve), None);
    }

    #[test]
    fn purchase_order_table() {
        use PurchaseOrderStatus::*;
        assert_eq!(
            purchase_order_next(Draft, PurchaseOrderAction::Submit),
            Some(Submitted)
        );
        assert_eq!(
            purchase_order_next(Submitted, PurchaseOrderAction::Approve),
            Some(Approved)
        );
        assert_eq!(purchase_order_next(Draft, PurchaseOrderAction::Approve), None);
        assert_eq!(
            purchase_order_next(Approved, PurchaseOrderAction::Approve),
            None
        );
    }

    #[test]
    fn expense_table() {
        use ExpenseStatus::*;
        assert_eq!(expense_next(Draft, ExpenseAction::Submit), Some(Submitted));
        assert_eq!(
            expense_next(Submitted, ExpenseAction::Approve),
            Some(Approved)
        );
        assert_eq!(
            expense_next(Submitted, ExpenseAction::Reject),
            Some(Rejected)
        );
        assert_eq!(expense_next(Approved, ExpenseAction::MarkPaid), Some(Paid));

        // Approving twice is never legal; neither is rejecting after approval.
        assert_eq!(expense_next(Approved, ExpenseAction::Approve), None);
        assert_eq!(expense_next(Approved, ExpenseAction::Reject), None);
        assert_eq!(expense_next(Paid, ExpenseAction::Reject), None);
        assert_eq!(expense_next(Rejected, ExpenseAction::Submit), None);
    }

    #[test]
    fn charge_out_table() {
        use ChargeOutStatus::*;
        assert_eq!(
            charge_out_next(Draft, ChargeOutAction::Submit),
            Some(Submitted)
        );
        assert_eq!(
            charge_out_next(Submitted, ChargeOutAction::Confirm),
            Some(Confirmed)
        );
        assert_eq!(
            charge_out_next(Submitted, ChargeOutAction::Reject),
            Some(Rejected)
        );
        assert_eq!(
            charge_out_next(Confirmed, ChargeOutAction::MarkPaid),
            Some(Paid)
        );

        // The explicit revert path back to Draft.
        assert_eq!(
            charge_out_next(Submitted, ChargeOutAction::Revert),
            Some(Draft)
        );
        assert_eq!(
            charge_out_next(Confirmed, ChargeOutAction::Revert),
            Some(Draft)
        );
        assert_eq!(charge_out_next(Paid, ChargeOutAction::Revert), Some(Draft));

        // Rejected is terminal: no revert, no resubmit.
        assert_eq!(charge_out_next(Rejected, ChargeOutAction::Revert), None);
        assert_eq!(charge_out_next(Rejected, ChargeOutAction::Submit), None);
        assert_eq!(charge_out_next(Draft, ChargeOutAction::Confirm), None);
    }
}
