//! The workflow coordinator: the only component allowed to write status
//! columns or trigger balance mutations.
//!
//! Every transition runs the same shape inside one database transaction:
//! load, machine lookup, authorization, entity guards, optimistic version
//! check, version-filtered status write, balance effect, audit entry, commit.
//! A failure at any step rolls the whole thing back, so a status change and
//! its balance effect are indivisible. `Conflict` is never retried here; the
//! caller must refetch and resubmit.

use std::sync::Arc;

use chrono::Utc;
use model::entities::{
    budget_proposal, charge_out, expense, expense_item, om_expense, om_monthly_record,
    proposal_comment, purchase_order, purchase_order_item,
};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set, TransactionTrait,
};
use tracing::{debug, info, instrument, warn};

use crate::auth::{Actor, Authorizer, EntityRef};
use crate::balance::{self, BalanceField};
use crate::error::{LedgerError, Result};
use crate::machine::{
    charge_out_next, expense_next, proposal_next, purchase_order_next, ChargeOutAction,
    ExpenseAction, ProposalAction, PurchaseOrderAction,
};
use crate::audit;

/// Caller-supplied payload for a transition.
#[derive(Debug, Clone, Default)]
pub struct TransitionRequest {
    /// Reviewer note; required for proposal rejection, stored as a comment
    /// on proposal decisions and in the audit entry everywhere.
    pub note: Option<String>,
    /// Version the caller last read. A mismatch aborts with `Conflict`.
    pub expected_version: i32,
    /// Granted amount for proposal approval; defaults to the requested
    /// amount when absent. Ignored by every other transition.
    pub approved_amount: Option<Decimal>,
}

/// Input for creating an O&M expense with its twelve monthly records.
#[derive(Debug, Clone)]
pub struct NewOmExpense {
    pub name: String,
    pub category_id: i32,
    pub fiscal_year: i32,
    pub budget_amount: Decimal,
    /// Per-month budget split; must hold exactly 12 values when present,
    /// otherwise all months start at zero.
    pub monthly_budgets: Option<Vec<Decimal>>,
}

/// One row of a monthly-record batch update. `None` fields are left as-is.
#[derive(Debug, Clone)]
pub struct MonthlyRecordUpdate {
    pub month: i32,
    pub budget_amount: Option<Decimal>,
    pub actual_amount: Option<Decimal>,
}

pub struct Coordinator {
    db: DatabaseConnection,
    authorizer: Arc<dyn Authorizer>,
}

impl std::fmt::Debug for Coordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Coordinator").field("db", &self.db).finish_non_exhaustive()
    }
}

impl Coordinator {
    pub fn new(db: DatabaseConnection, authorizer: Arc<dyn Authorizer>) -> Self {
        Self { db, authorizer }
    }

    pub fn db(&self) -> &DatabaseConnection {
        &self.db
    }

    async fn authorize(&self, actor: &Actor, entity: EntityRef, action: &str) -> Result<()> {
        if !self.authorizer.can_perform(actor, entity, action).await {
            warn!(user_id = actor.user_id, ?entity, action, "action denied");
            return Err(LedgerError::Forbidden(format!(
                "user {} may not {action} this entity",
                actor.user_id
            )));
        }
        Ok(())
    }

    /// Moves a budget proposal through its state machine. Approval credits
    /// the project's approved budget and stamps the decision onto the
    /// proposal; decisions carrying a note also record a comment.
    #[instrument(skip(self, req))]
    pub async fn transition_proposal(
        &self,
        proposal_id: i32,
        action: ProposalAction,
        actor: &Actor,
        req: TransitionRequest,
    ) -> Result<budget_proposal::Model> {
        let txn = self.db.begin().await?;

        let proposal = budget_proposal::Entity::find_by_id(proposal_id)
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("budget proposal {proposal_id}")))?;

        let next = proposal_next(proposal.status, action).ok_or_else(|| {
            LedgerError::InvalidTransition {
                entity: "budget proposal",
                from: format!("{:?}", proposal.status),
                action: action.name(),
            }
        })?;

        self.authorize(actor, EntityRef::BudgetProposal(proposal_id), action.name())
            .await?;

        if action == ProposalAction::Reject && req.note.as_deref().map_or(true, str::is_empty) {
            return Err(LedgerError::InvalidState(
                "a rejection reason is required".to_string(),
            ));
        }

        if proposal.version != req.expected_version {
            return Err(LedgerError::Conflict(format!(
                "budget proposal {proposal_id} was modified concurrently"
            )));
        }

        let now = Utc::now().naive_utc();
        let mut update = budget_proposal::ActiveModel {
            status: Set(next),
            version: Set(proposal.version + 1),
            updated_at: Set(now),
            ..Default::default()
        };

        let granted = req.approved_amount.unwrap_or(proposal.amount);
        if action == ProposalAction::Approve {
            update.approved_amount = Set(Some(granted));
            update.approved_by = Set(Some(actor.user_id));
            update.approved_at = Set(Some(now));
        }

        let rows = budget_proposal::Entity::update_many()
            .set(update)
            .filter(budget_proposal::Column::Id.eq(proposal_id))
            .filter(budget_proposal::Column::Version.eq(proposal.version))
            .exec(&txn)
            .await?
            .rows_affected;
        if rows == 0 {
            return Err(LedgerError::Conflict(format!(
                "budget proposal {proposal_id} was modified concurrently"
            )));
        }

        if action == ProposalAction::Approve {
            let new_budget = balance::apply_delta(
                &txn,
                BalanceField::ProjectApprovedBudget,
                proposal.project_id,
                granted,
                None,
            )
            .await?;
            info!(
                proposal_id,
                project_id = proposal.project_id,
                %granted,
                %new_budget,
                "proposal approved, project budget credited"
            );
        }

        if matches!(
            action,
            ProposalAction::Approve | ProposalAction::Reject | ProposalAction::RequestMoreInfo
        ) {
            if let Some(note) = &req.note {
                proposal_comment::ActiveModel {
                    proposal_id: Set(proposal_id),
                    user_id: Set(actor.user_id),
                    content: Set(note.clone()),
                    created_at: Set(now),
                    ..Default::default()
                }
                .insert(&txn)
                .await?;
            }
        }

        audit::append(
            &txn,
            EntityRef::BudgetProposal(proposal_id),
            action.history_tag(),
            req.note,
            actor.user_id,
        )
        .await?;

        txn.commit().await?;
        debug!(proposal_id, to = ?next, "proposal transition committed");

        budget_proposal::Entity::find_by_id(proposal_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("budget proposal {proposal_id}")))
    }

    /// Moves a purchase order through its state machine. Purchase orders
    /// carry no balance effect; approval is a gate for raising expenses.
    #[instrument(skip(self, req))]
    pub async fn transition_purchase_order(
        &self,
        po_id: i32,
        action: PurchaseOrderAction,
        actor: &Actor,
        req: TransitionRequest,
    ) -> Result<purchase_order::Model> {
        let txn = self.db.begin().await?;

        let po = purchase_order::Entity::find_by_id(po_id)
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("purchase order {po_id}")))?;

        let next = purchase_order_next(po.status, action).ok_or_else(|| {
            LedgerError::InvalidTransition {
                entity: "purchase order",
                from: format!("{:?}", po.status),
                action: action.name(),
            }
        })?;

        self.authorize(actor, EntityRef::PurchaseOrder(po_id), action.name())
            .await?;

        if action == PurchaseOrderAction::Submit {
            let items = purchase_order_item::Entity::find()
                .filter(purchase_order_item::Column::PurchaseOrderId.eq(po_id))
                .count(&txn)
                .await?;
            if items == 0 {
                return Err(LedgerError::InvalidState(
                    "purchase order has no line items".to_string(),
                ));
            }
            if po.total_amount <= Decimal::ZERO {
                return Err(LedgerError::InvalidState(
                    "purchase order total must be positive".to_string(),
                ));
            }
        }

        if po.version != req.expected_version {
            return Err(LedgerError::Conflict(format!(
                "purchase order {po_id} was modified concurrently"
            )));
        }

        let rows = purchase_order::Entity::update_many()
            .set(purchase_order::ActiveModel {
                status: Set(next),
                version: Set(po.version + 1),
                updated_at: Set(Utc::now().naive_utc()),
                ..Default::default()
            })
            .filter(purchase_order::Column::Id.eq(po_id))
            .filter(purchase_order::Column::Version.eq(po.version))
            .exec(&txn)
            .await?
            .rows_affected;
        if rows == 0 {
            return Err(LedgerError::Conflict(format!(
                "purchase order {po_id} was modified concurrently"
            )));
        }

        audit::append(
            &txn,
            EntityRef::PurchaseOrder(po_id),
            action.history_tag(),
            req.note,
            actor.user_id,
        )
        .await?;

        txn.commit().await?;
        debug!(po_id, to = ?next, "purchase order transition committed");

        purchase_order::Entity::find_by_id(po_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("purchase order {po_id}")))
    }

    /// Moves an expense through its state machine. Approval consumes the
    /// target budget category's `used_amount` by the expense total, in the
    /// same transaction as the status write.
    #[instrument(skip(self, req))]
    pub async fn transition_expense(
        &self,
        expense_id: i32,
        action: ExpenseAction,
        actor: &Actor,
        req: TransitionRequest,
    ) -> Result<expense::Model> {
        let txn = self.db.begin().await?;

        let exp = expense::Entity::find_by_id(expense_id)
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("expense {expense_id}")))?;

        let next =
            expense_next(exp.status, action).ok_or_else(|| LedgerError::InvalidTransition {
                entity: "expense",
                from: format!("{:?}", exp.status),
                action: action.name(),
            })?;

        self.authorize(actor, EntityRef::Expense(expense_id), action.name())
            .await?;

        if action == ExpenseAction::Submit {
            let items = expense_item::Entity::find()
                .filter(expense_item::Column::ExpenseId.eq(expense_id))
                .count(&txn)
                .await?;
            if items == 0 {
                return Err(LedgerError::InvalidState(
                    "expense has no line items".to_string(),
                ));
            }
        }

        if exp.version != req.expected_version {
            return Err(LedgerError::Conflict(format!(
                "expense {expense_id} was modified concurrently"
            )));
        }

        let rows = expense::Entity::update_many()
            .set(expense::ActiveModel {
                status: Set(next),
                version: Set(exp.version + 1),
                updated_at: Set(Utc::now().naive_utc()),
                ..Default::default()
            })
            .filter(expense::Column::Id.eq(expense_id))
            .filter(expense::Column::Version.eq(exp.version))
            .exec(&txn)
            .await?
            .rows_affected;
        if rows == 0 {
            return Err(LedgerError::Conflict(format!(
                "expense {expense_id} was modified concurrently"
            )));
        }

        if action == ExpenseAction::Approve {
            let new_used = balance::apply_delta(
                &txn,
                BalanceField::CategoryUsedAmount,
                exp.budget_category_id,
                exp.total_amount,
                None,
            )
            .await?;
            info!(
                expense_id,
                category_id = exp.budget_category_id,
                amount = %exp.total_amount,
                %new_used,
                "expense approved, category budget consumed"
            );
        }

        audit::append(
            &txn,
            EntityRef::Expense(expense_id),
            action.history_tag(),
            req.note,
            actor.user_id,
        )
        .await?;

        txn.commit().await?;
        debug!(expense_id, to = ?next, "expense transition committed");

        expense::Entity::find_by_id(expense_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("expense {expense_id}")))
    }

    /// Moves a charge-out through its state machine. Charge-outs have no
    /// balance effect, which is what makes the revert action safe: it is a
    /// pure status change back to Draft.
    #[instrument(skip(self, req))]
    pub async fn transition_charge_out(
        &self,
        charge_out_id: i32,
        action: ChargeOutAction,
        actor: &Actor,
        req: TransitionRequest,
    ) -> Result<charge_out::Model> {
        let txn = self.db.begin().await?;

        let co = charge_out::Entity::find_by_id(charge_out_id)
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("charge-out {charge_out_id}")))?;

        let next =
            charge_out_next(co.status, action).ok_or_else(|| LedgerError::InvalidTransition {
                entity: "charge-out",
                from: format!("{:?}", co.status),
                action: action.name(),
            })?;

        self.authorize(actor, EntityRef::ChargeOut(charge_out_id), action.name())
            .await?;

        if co.version != req.expected_version {
            return Err(LedgerError::Conflict(format!(
                "charge-out {charge_out_id} was modified concurrently"
            )));
        }

        let now = Utc::now().naive_utc();
        let mut update = charge_out::ActiveModel {
            status: Set(next),
            version: Set(co.version + 1),
            updated_at: Set(now),
            ..Default::default()
        };
        match action {
            ChargeOutAction::Confirm => {
                update.confirmed_by = Set(Some(actor.user_id));
                update.confirmed_at = Set(Some(now));
            }
            ChargeOutAction::Revert => {
                update.confirmed_by = Set(None);
                update.confirmed_at = Set(None);
            }
            _ => {}
        }

        let rows = charge_out::Entity::update_many()
            .set(update)
            .filter(charge_out::Column::Id.eq(charge_out_id))
            .filter(charge_out::Column::Version.eq(co.version))
            .exec(&txn)
            .await?
            .rows_affected;
        if rows == 0 {
            return Err(LedgerError::Conflict(format!(
                "charge-out {charge_out_id} was modified concurrently"
            )));
        }

        audit::append(
            &txn,
            EntityRef::ChargeOut(charge_out_id),
            action.history_tag(),
            req.note,
            actor.user_id,
        )
        .await?;

        txn.commit().await?;
        debug!(charge_out_id, to = ?next, "charge-out transition committed");

        charge_out::Entity::find_by_id(charge_out_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("charge-out {charge_out_id}")))
    }

    /// Creates an O&M expense together with its twelve monthly records in
    /// one transaction. The parent never exists without all twelve children.
    #[instrument(skip(self, input), fields(name = %input.name))]
    pub async fn create_om_expense(
        &self,
        input: NewOmExpense,
        actor: &Actor,
    ) -> Result<om_expense::Model> {
        if let Some(budgets) = &input.monthly_budgets {
            if budgets.len() != 12 {
                return Err(LedgerError::InvalidState(format!(
                    "expected 12 monthly budgets, got {}",
                    budgets.len()
                )));
            }
        }

        let txn = self.db.begin().await?;
        let now = Utc::now().naive_utc();

        let parent = om_expense::ActiveModel {
            name: Set(input.name),
            category_id: Set(input.category_id),
            fiscal_year: Set(input.fiscal_year),
            budget_amount: Set(input.budget_amount),
            actual_spent: Set(Decimal::ZERO),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;

        for month in 1..=12 {
            let budget = input
                .monthly_budgets
                .as_ref()
                .map(|b| b[(month - 1) as usize])
                .unwrap_or(Decimal::ZERO);
            om_monthly_record::ActiveModel {
                om_expense_id: Set(parent.id),
                month: Set(month),
                budget_amount: Set(budget),
                actual_amount: Set(Decimal::ZERO),
                ..Default::default()
            }
            .insert(&txn)
            .await?;
        }

        audit::append(
            &txn,
            EntityRef::OmExpense(parent.id),
            "CREATED",
            None,
            actor.user_id,
        )
        .await?;

        txn.commit().await?;
        info!(om_expense_id = parent.id, "o&m expense created with 12 monthly records");
        Ok(parent)
    }

    /// Batch update of monthly records followed by an `actual_spent`
    /// recomputation, all in one transaction. Months outside 1..=12 or
    /// duplicated within the batch are rejected before any write.
    #[instrument(skip(self, batch))]
    pub async fn update_monthly_records(
        &self,
        om_expense_id: i32,
        batch: Vec<MonthlyRecordUpdate>,
        actor: &Actor,
        expected_version: i32,
    ) -> Result<om_expense::Model> {
        let mut seen = [false; 12];
        for entry in &batch {
            if !(1..=12).contains(&entry.month) {
                return Err(LedgerError::InvalidState(format!(
                    "month {} is out of range",
                    entry.month
                )));
            }
            let idx = (entry.month - 1) as usize;
            if seen[idx] {
                return Err(LedgerError::InvalidState(format!(
                    "month {} appears twice in batch",
                    entry.month
                )));
            }
            seen[idx] = true;
        }

        let txn = self.db.begin().await?;

        let parent = om_expense::Entity::find_by_id(om_expense_id)
            .one(&txn)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("om expense {om_expense_id}")))?;
        if parent.version != expected_version {
            return Err(LedgerError::Conflict(format!(
                "om expense {om_expense_id} was modified concurrently"
            )));
        }

        for entry in batch {
            let record = om_monthly_record::Entity::find()
                .filter(om_monthly_record::Column::OmExpenseId.eq(om_expense_id))
                .filter(om_monthly_record::Column::Month.eq(entry.month))
                .one(&txn)
                .await?
                .ok_or_else(|| {
                    LedgerError::NotFound(format!(
                        "monthly record {} for om expense {om_expense_id}",
                        entry.month
                    ))
                })?;
            let mut active: om_monthly_record::ActiveModel = record.into();
            if let Some(budget) = entry.budget_amount {
                active.budget_amount = Set(budget);
            }
            if let Some(actual) = entry.actual_amount {
                active.actual_amount = Set(actual);
            }
            active.update(&txn).await?;
        }

        let total =
            balance::recompute_om_actual_spent(&txn, om_expense_id, parent.version).await?;

        audit::append(
            &txn,
            EntityRef::OmExpense(om_expense_id),
            "MONTHLY_RECORDS_UPDATED",
            None,
            actor.user_id,
        )
        .await?;

        txn.commit().await?;
        info!(om_expense_id, actual_spent = %total, "monthly records updated");

        om_expense::Entity::find_by_id(om_expense_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("om expense {om_expense_id}")))
    }
}
