use async_trait::async_trait;
use model::entities::history::HistoryEntityType;
use model::entities::user::Role;

/// The authenticated actor attempting a workflow action. Identity has been
/// verified by the layer above; the ledger only carries what authorization
/// and auditing need.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub user_id: i32,
    pub role: Role,
}

/// Reference to one workflow entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef {
    BudgetProposal(i32),
    PurchaseOrder(i32),
    Expense(i32),
    ChargeOut(i32),
    OmExpense(i32),
}

impl EntityRef {
    pub fn entity_type(&self) -> HistoryEntityType {
        match self {
            EntityRef::BudgetProposal(_) => HistoryEntityType::BudgetProposal,
            EntityRef::PurchaseOrder(_) => HistoryEntityType::PurchaseOrder,
            EntityRef::Expense(_) => HistoryEntityType::Expense,
            EntityRef::ChargeOut(_) => HistoryEntityType::ChargeOut,
            EntityRef::OmExpense(_) => HistoryEntityType::OmExpense,
        }
    }

    pub fn entity_id(&self) -> i32 {
        match self {
            EntityRef::BudgetProposal(id)
            | EntityRef::PurchaseOrder(id)
            | EntityRef::Expense(id)
            | EntityRef::ChargeOut(id)
            | EntityRef::OmExpense(id) => *id,
        }
    }
}

/// External authorization collaborator. The workflow coordinator consults it
/// before any mutation; a deny means the transaction never starts writing.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn can_perform(&self, actor: &Actor, entity: EntityRef, action: &str) -> bool;
}

/// Role-based policy: decision actions are restricted to supervisors and
/// admins, everything else is open to any authenticated actor.
#[derive(Debug, Default)]
pub struct RoleAuthorizer;

impl RoleAuthorizer {
    fn is_decision(action: &str) -> bool {
        matches!(action, "approve" | "reject" | "request_more_info" | "confirm")
    }
}

#[async_trait]
impl Authorizer for RoleAuthorizer {
    async fn can_perform(&self, actor: &Actor, _entity: EntityRef, action: &str) -> bool {
        if Self::is_decision(action) {
            matches!(actor.role, Role::Supervisor | Role::Admin)
        } else {
            true
        }
    }
}
