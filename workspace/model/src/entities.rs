//! This file serves as the root for all SeaORM entity modules.
//! The data models mirror the budget & procurement domain: pools divided
//! into categories, projects drawing against categories through proposals,
//! purchases and expenses consuming approved budget, and charge-outs
//! allocating costs to operating companies.

pub mod budget_category;
pub mod budget_pool;
pub mod budget_proposal;
pub mod charge_out;
pub mod charge_out_item;
pub mod expense;
pub mod expense_item;
pub mod history;
pub mod om_expense;
pub mod om_monthly_record;
pub mod operating_company;
pub mod project;
pub mod proposal_comment;
pub mod purchase_order;
pub mod purchase_order_item;
pub mod user;
pub mod vendor;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::budget_category::Entity as BudgetCategory;
    pub use super::budget_pool::Entity as BudgetPool;
    pub use super::budget_proposal::Entity as BudgetProposal;
    pub use super::charge_out::Entity as ChargeOut;
    pub use super::charge_out_item::Entity as ChargeOutItem;
    pub use super::expense::Entity as Expense;
    pub use super::expense_item::Entity as ExpenseItem;
    pub use super::history::Entity as History;
    pub use super::om_expense::Entity as OmExpense;
    pub use super::om_monthly_record::Entity as OmMonthlyRecord;
    pub use super::operating_company::Entity as OperatingCompany;
    pub use super::project::Entity as Project;
    pub use super::proposal_comment::Entity as ProposalComment;
    pub use super::purchase_order::Entity as PurchaseOrder;
    pub use super::purchase_order_item::Entity as PurchaseOrderItem;
    pub use super::user::Entity as User;
    pub use super::vendor::Entity as Vendor;
}

#[cfg(test)]
mod test {
    use chrono::{NaiveDate, Utc};
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, QueryFilter, Set,
    };

    use super::*;
    use prelude::*;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        // Connect to the SQLite database
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        // Try to apply migrations first
        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        let db = setup_db().await?;
        let now = Utc::now().naive_utc();

        // Actors
        let manager = user::ActiveModel {
            name: Set("Alice Manager".to_string()),
            email: Set("alice@example.com".to_string()),
            role: Set(user::Role::ProjectManager),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let supervisor = user::ActiveModel {
            name: Set("Bob Supervisor".to_string()),
            email: Set("bob@example.com".to_string()),
            role: Set(user::Role::Supervisor),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Pool with two categories
        let pool = budget_pool::ActiveModel {
            name: Set("FY2025 IT".to_string()),
            fiscal_year: Set(2025),
            currency_code: Set("USD".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let hardware = budget_category::ActiveModel {
            pool_id: Set(pool.id),
            name: Set("Hardware".to_string()),
            code: Set("HW".to_string()),
            total_amount: Set(Decimal::from(600_000)),
            used_amount: Set(Decimal::ZERO),
            version: Set(0),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let software = budget_category::ActiveModel {
            pool_id: Set(pool.id),
            name: Set("Software".to_string()),
            code: Set("SW".to_string()),
            total_amount: Set(Decimal::from(400_000)),
            used_amount: Set(Decimal::ZERO),
            version: Set(0),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Project under the hardware category
        let project = project::ActiveModel {
            name: Set("Datacenter refresh".to_string()),
            category_id: Set(hardware.id),
            pool_id: Set(pool.id),
            manager_id: Set(manager.id),
            supervisor_id: Set(supervisor.id),
            status: Set(project::ProjectStatus::Draft),
            approved_budget: Set(Decimal::ZERO),
            version: Set(0),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Proposal owned by the project
        let proposal = budget_proposal::ActiveModel {
            project_id: Set(project.id),
            title: Set("Initial budget".to_string()),
            amount: Set(Decimal::from(100_000)),
            approved_amount: Set(None),
            status: Set(budget_proposal::ProposalStatus::Draft),
            approved_by: Set(None),
            approved_at: Set(None),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Vendor, purchase order with items, expense with items
        let vendor = vendor::ActiveModel {
            name: Set("Acme Servers".to_string()),
            contact_email: Set(Some("sales@acme.example".to_string())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let po = purchase_order::ActiveModel {
            project_id: Set(project.id),
            vendor_id: Set(vendor.id),
            po_number: Set("PO-2025-0001".to_string()),
            status: Set(purchase_order::PurchaseOrderStatus::Draft),
            total_amount: Set(Decimal::from(50_000)),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        purchase_order_item::ActiveModel {
            purchase_order_id: Set(po.id),
            name: Set("Rack server".to_string()),
            quantity: Set(10),
            unit_price: Set(Decimal::from(5_000)),
            sort_order: Set(0),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let expense = expense::ActiveModel {
            purchase_order_id: Set(po.id),
            budget_category_id: Set(hardware.id),
            invoice_number: Set("INV-1001".to_string()),
            invoice_date: Set(NaiveDate::from_ymd_opt(2025, 3, 1).unwrap()),
            status: Set(expense::ExpenseStatus::Draft),
            total_amount: Set(Decimal::from(50_000)),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        expense_item::ActiveModel {
            expense_id: Set(expense.id),
            name: Set("Servers, first batch".to_string()),
            amount: Set(Decimal::from(50_000)),
            sort_order: Set(0),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Charge-out to an operating company
        let opco = operating_company::ActiveModel {
            name: Set("Northwind Retail".to_string()),
            code: Set("NWR".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let charge_out = charge_out::ActiveModel {
            project_id: Set(project.id),
            op_co_id: Set(opco.id),
            status: Set(charge_out::ChargeOutStatus::Draft),
            total_amount: Set(Decimal::from(20_000)),
            confirmed_by: Set(None),
            confirmed_at: Set(None),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        charge_out_item::ActiveModel {
            charge_out_id: Set(charge_out.id),
            expense_id: Set(expense.id),
            amount: Set(Decimal::from(20_000)),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // O&M expense with its twelve monthly records
        let om = om_expense::ActiveModel {
            name: Set("Colocation fees".to_string()),
            category_id: Set(hardware.id),
            fiscal_year: Set(2025),
            budget_amount: Set(Decimal::from(120_000)),
            actual_spent: Set(Decimal::ZERO),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        for month in 1..=12 {
            om_monthly_record::ActiveModel {
                om_expense_id: Set(om.id),
                month: Set(month),
                budget_amount: Set(Decimal::from(10_000)),
                actual_amount: Set(Decimal::ZERO),
                ..Default::default()
            }
            .insert(&db)
            .await?;
        }

        // History row referencing the proposal
        history::ActiveModel {
            entity_type: Set(history::HistoryEntityType::BudgetProposal),
            entity_id: Set(proposal.id),
            action: Set("CREATED".to_string()),
            details: Set(None),
            user_id: Set(manager.id),
            created_at: Set(now),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Read back and verify the graph
        let categories = BudgetCategory::find()
            .filter(budget_category::Column::PoolId.eq(pool.id))
            .all(&db)
            .await?;
        assert_eq!(categories.len(), 2);
        let pool_total: Decimal = categories.iter().map(|c| c.total_amount).sum();
        assert_eq!(pool_total, Decimal::from(1_000_000));
        assert!(categories.iter().any(|c| c.id == software.id));

        let projects = Project::find().all(&db).await?;
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].category_id, hardware.id);
        assert_eq!(projects[0].pool_id, pool.id);

        let proposals = BudgetProposal::find().all(&db).await?;
        assert_eq!(proposals.len(), 1);
        assert_eq!(
            proposals[0].status,
            budget_proposal::ProposalStatus::Draft
        );
        assert_eq!(proposals[0].approved_amount, None);

        let po_items = PurchaseOrderItem::find()
            .filter(purchase_order_item::Column::PurchaseOrderId.eq(po.id))
            .all(&db)
            .await?;
        assert_eq!(po_items.len(), 1);
        assert_eq!(
            Decimal::from(po_items[0].quantity) * po_items[0].unit_price,
            po.total_amount
        );

        let months = OmMonthlyRecord::find()
            .filter(om_monthly_record::Column::OmExpenseId.eq(om.id))
            .all(&db)
            .await?;
        assert_eq!(months.len(), 12);

        let history_rows = History::find()
            .filter(history::Column::EntityId.eq(proposal.id))
            .all(&db)
            .await?;
        assert_eq!(history_rows.len(), 1);
        assert_eq!(history_rows[0].action, "CREATED");

        Ok(())
    }
}
