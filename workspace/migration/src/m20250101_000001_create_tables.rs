use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Create users table
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(pk_auto(Users::Id))
                    .col(string(Users::Name))
                    .col(string(Users::Email).unique_key())
                    .col(string(Users::Role))
                    .to_owned(),
            )
            .await?;

        // Create operating_companies table
        manager
            .create_table(
                Table::create()
                    .table(OperatingCompanies::Table)
                    .if_not_exists()
                    .col(pk_auto(OperatingCompanies::Id))
                    .col(string(OperatingCompanies::Name))
                    .col(string(OperatingCompanies::Code).unique_key())
                    .to_owned(),
            )
            .await?;

        // Create vendors table
        manager
            .create_table(
                Table::create()
                    .table(Vendors::Table)
                    .if_not_exists()
                    .col(pk_auto(Vendors::Id))
                    .col(string(Vendors::Name))
                    .col(string_null(Vendors::ContactEmail))
                    .to_owned(),
            )
            .await?;

        // Create budget_pools table. Note: no total column; the pool total is
        // always derived from its categories.
        manager
            .create_table(
                Table::create()
                    .table(BudgetPools::Table)
                    .if_not_exists()
                    .col(pk_auto(BudgetPools::Id))
                    .col(string(BudgetPools::Name))
                    .col(integer(BudgetPools::FiscalYear))
                    .col(string(BudgetPools::CurrencyCode))
                    .to_owned(),
            )
            .await?;

        // Create budget_categories table
        manager
            .create_table(
                Table::create()
                    .table(BudgetCategories::Table)
                    .if_not_exists()
                    .col(pk_auto(BudgetCategories::Id))
                    .col(integer(BudgetCategories::PoolId))
                    .col(string(BudgetCategories::Name))
                    .col(string(BudgetCategories::Code))
                    .col(decimal(BudgetCategories::TotalAmount))
                    .col(decimal(BudgetCategories::UsedAmount).default(0))
                    .col(integer(BudgetCategories::Version).default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_budget_category_pool")
                            .from(BudgetCategories::Table, BudgetCategories::PoolId)
                            .to(BudgetPools::Table, BudgetPools::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create projects table
        manager
            .create_table(
                Table::create()
                    .table(Projects::Table)
                    .if_not_exists()
                    .col(pk_auto(Projects::Id))
                    .col(string(Projects::Name))
                    .col(integer(Projects::CategoryId))
                    .col(integer(Projects::PoolId))
                    .col(integer(Projects::ManagerId))
                    .col(integer(Projects::SupervisorId))
                    .col(string(Projects::Status))
                    .col(decimal(Projects::ApprovedBudget).default(0))
                    .col(integer(Projects::Version).default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_category")
                            .from(Projects::Table, Projects::CategoryId)
                            .to(BudgetCategories::Table, BudgetCategories::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_pool")
                            .from(Projects::Table, Projects::PoolId)
                            .to(BudgetPools::Table, BudgetPools::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_manager")
                            .from(Projects::Table, Projects::ManagerId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_project_supervisor")
                            .from(Projects::Table, Projects::SupervisorId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create budget_proposals table
        manager
            .create_table(
                Table::create()
                    .table(BudgetProposals::Table)
                    .if_not_exists()
                    .col(pk_auto(BudgetProposals::Id))
                    .col(integer(BudgetProposals::ProjectId))
                    .col(string(BudgetProposals::Title))
                    .col(decimal(BudgetProposals::Amount))
                    .col(decimal_null(BudgetProposals::ApprovedAmount))
                    .col(string(BudgetProposals::Status))
                    .col(integer_null(BudgetProposals::ApprovedBy))
                    .col(date_time_null(BudgetProposals::ApprovedAt))
                    .col(integer(BudgetProposals::Version).default(0))
                    .col(date_time(BudgetProposals::CreatedAt))
                    .col(date_time(BudgetProposals::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_proposal_project")
                            .from(BudgetProposals::Table, BudgetProposals::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create proposal_comments table
        manager
            .create_table(
                Table::create()
                    .table(ProposalComments::Table)
                    .if_not_exists()
                    .col(pk_auto(ProposalComments::Id))
                    .col(integer(ProposalComments::ProposalId))
                    .col(integer(ProposalComments::UserId))
                    .col(string(ProposalComments::Content))
                    .col(date_time(ProposalComments::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_proposal")
                            .from(ProposalComments::Table, ProposalComments::ProposalId)
                            .to(BudgetProposals::Table, BudgetProposals::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_comment_user")
                            .from(ProposalComments::Table, ProposalComments::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create purchase_orders table
        manager
            .create_table(
                Table::create()
                    .table(PurchaseOrders::Table)
                    .if_not_exists()
                    .col(pk_auto(PurchaseOrders::Id))
                    .col(integer(PurchaseOrders::ProjectId))
                    .col(integer(PurchaseOrders::VendorId))
                    .col(string(PurchaseOrders::PoNumber).unique_key())
                    .col(string(PurchaseOrders::Status))
                    .col(decimal(PurchaseOrders::TotalAmount).default(0))
                    .col(integer(PurchaseOrders::Version).default(0))
                    .col(date_time(PurchaseOrders::CreatedAt))
                    .col(date_time(PurchaseOrders::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_po_project")
                            .from(PurchaseOrders::Table, PurchaseOrders::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_po_vendor")
                            .from(PurchaseOrders::Table, PurchaseOrders::VendorId)
                            .to(Vendors::Table, Vendors::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create purchase_order_items table
        manager
            .create_table(
                Table::create()
                    .table(PurchaseOrderItems::Table)
                    .if_not_exists()
                    .col(pk_auto(PurchaseOrderItems::Id))
                    .col(integer(PurchaseOrderItems::PurchaseOrderId))
                    .col(string(PurchaseOrderItems::Name))
                    .col(integer(PurchaseOrderItems::Quantity))
                    .col(decimal(PurchaseOrderItems::UnitPrice))
                    .col(integer(PurchaseOrderItems::SortOrder).default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_po_item_po")
                            .from(
                                PurchaseOrderItems::Table,
                                PurchaseOrderItems::PurchaseOrderId,
                            )
                            .to(PurchaseOrders::Table, PurchaseOrders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create expenses table
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(pk_auto(Expenses::Id))
                    .col(integer(Expenses::PurchaseOrderId))
                    .col(integer(Expenses::BudgetCategoryId))
                    .col(string(Expenses::InvoiceNumber))
                    .col(date(Expenses::InvoiceDate))
                    .col(string(Expenses::Status))
                    .col(decimal(Expenses::TotalAmount).default(0))
                    .col(integer(Expenses::Version).default(0))
                    .col(date_time(Expenses::CreatedAt))
                    .col(date_time(Expenses::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expense_po")
                            .from(Expenses::Table, Expenses::PurchaseOrderId)
                            .to(PurchaseOrders::Table, PurchaseOrders::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expense_category")
                            .from(Expenses::Table, Expenses::BudgetCategoryId)
                            .to(BudgetCategories::Table, BudgetCategories::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create expense_items table
        manager
            .create_table(
                Table::create()
                    .table(ExpenseItems::Table)
                    .if_not_exists()
                    .col(pk_auto(ExpenseItems::Id))
                    .col(integer(ExpenseItems::ExpenseId))
                    .col(string(ExpenseItems::Name))
                    .col(decimal(ExpenseItems::Amount))
                    .col(integer(ExpenseItems::SortOrder).default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_expense_item_expense")
                            .from(ExpenseItems::Table, ExpenseItems::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create charge_outs table
        manager
            .create_table(
                Table::create()
                    .table(ChargeOuts::Table)
                    .if_not_exists()
                    .col(pk_auto(ChargeOuts::Id))
                    .col(integer(ChargeOuts::ProjectId))
                    .col(integer(ChargeOuts::OpCoId))
                    .col(string(ChargeOuts::Status))
                    .col(decimal(ChargeOuts::TotalAmount).default(0))
                    .col(integer_null(ChargeOuts::ConfirmedBy))
                    .col(date_time_null(ChargeOuts::ConfirmedAt))
                    .col(integer(ChargeOuts::Version).default(0))
                    .col(date_time(ChargeOuts::CreatedAt))
                    .col(date_time(ChargeOuts::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_charge_out_project")
                            .from(ChargeOuts::Table, ChargeOuts::ProjectId)
                            .to(Projects::Table, Projects::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_charge_out_opco")
                            .from(ChargeOuts::Table, ChargeOuts::OpCoId)
                            .to(OperatingCompanies::Table, OperatingCompanies::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create charge_out_items table
        manager
            .create_table(
                Table::create()
                    .table(ChargeOutItems::Table)
                    .if_not_exists()
                    .col(pk_auto(ChargeOutItems::Id))
                    .col(integer(ChargeOutItems::ChargeOutId))
                    .col(integer(ChargeOutItems::ExpenseId))
                    .col(decimal(ChargeOutItems::Amount))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_charge_out_item_charge_out")
                            .from(ChargeOutItems::Table, ChargeOutItems::ChargeOutId)
                            .to(ChargeOuts::Table, ChargeOuts::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_charge_out_item_expense")
                            .from(ChargeOutItems::Table, ChargeOutItems::ExpenseId)
                            .to(Expenses::Table, Expenses::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create om_expenses table
        manager
            .create_table(
                Table::create()
                    .table(OmExpenses::Table)
                    .if_not_exists()
                    .col(pk_auto(OmExpenses::Id))
                    .col(string(OmExpenses::Name))
                    .col(integer(OmExpenses::CategoryId))
                    .col(integer(OmExpenses::FiscalYear))
                    .col(decimal(OmExpenses::BudgetAmount))
                    .col(decimal(OmExpenses::ActualSpent).default(0))
                    .col(integer(OmExpenses::Version).default(0))
                    .col(date_time(OmExpenses::CreatedAt))
                    .col(date_time(OmExpenses::UpdatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_om_expense_category")
                            .from(OmExpenses::Table, OmExpenses::CategoryId)
                            .to(BudgetCategories::Table, BudgetCategories::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Create om_monthly_records table; one row per calendar month
        manager
            .create_table(
                Table::create()
                    .table(OmMonthlyRecords::Table)
                    .if_not_exists()
                    .col(pk_auto(OmMonthlyRecords::Id))
                    .col(integer(OmMonthlyRecords::OmExpenseId))
                    .col(integer(OmMonthlyRecords::Month))
                    .col(decimal(OmMonthlyRecords::BudgetAmount).default(0))
                    .col(decimal(OmMonthlyRecords::ActualAmount).default(0))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_om_monthly_record_om_expense")
                            .from(OmMonthlyRecords::Table, OmMonthlyRecords::OmExpenseId)
                            .to(OmExpenses::Table, OmExpenses::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_om_monthly_record_unique_month")
                    .table(OmMonthlyRecords::Table)
                    .col(OmMonthlyRecords::OmExpenseId)
                    .col(OmMonthlyRecords::Month)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Create history table (append-only audit log)
        manager
            .create_table(
                Table::create()
                    .table(HistoryTable::Table)
                    .if_not_exists()
                    .col(pk_auto(HistoryTable::Id))
                    .col(string(HistoryTable::EntityType))
                    .col(integer(HistoryTable::EntityId))
                    .col(string(HistoryTable::Action))
                    .col(string_null(HistoryTable::Details))
                    .col(integer(HistoryTable::UserId))
                    .col(date_time(HistoryTable::CreatedAt))
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_history_user")
                            .from(HistoryTable::Table, HistoryTable::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Restrict)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_history_entity")
                    .table(HistoryTable::Table)
                    .col(HistoryTable::EntityType)
                    .col(HistoryTable::EntityId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(HistoryTable::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OmMonthlyRecords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OmExpenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChargeOutItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ChargeOuts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PurchaseOrderItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ProposalComments::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetProposals::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Projects::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetPools::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Vendors::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OperatingCompanies::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Name,
    Email,
    Role,
}

#[derive(DeriveIden)]
enum OperatingCompanies {
    Table,
    Id,
    Name,
    Code,
}

#[derive(DeriveIden)]
enum Vendors {
    Table,
    Id,
    Name,
    ContactEmail,
}

#[derive(DeriveIden)]
enum BudgetPools {
    Table,
    Id,
    Name,
    FiscalYear,
    CurrencyCode,
}

#[derive(DeriveIden)]
enum BudgetCategories {
    Table,
    Id,
    PoolId,
    Name,
    Code,
    TotalAmount,
    UsedAmount,
    Version,
}

#[derive(DeriveIden)]
enum Projects {
    Table,
    Id,
    Name,
    CategoryId,
    PoolId,
    ManagerId,
    SupervisorId,
    Status,
    ApprovedBudget,
    Version,
}

#[derive(DeriveIden)]
enum BudgetProposals {
    Table,
    Id,
    ProjectId,
    Title,
    Amount,
    ApprovedAmount,
    Status,
    ApprovedBy,
    ApprovedAt,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ProposalComments {
    Table,
    Id,
    ProposalId,
    UserId,
    Content,
    CreatedAt,
}

#[derive(DeriveIden)]
enum PurchaseOrders {
    Table,
    Id,
    ProjectId,
    VendorId,
    PoNumber,
    Status,
    TotalAmount,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum PurchaseOrderItems {
    Table,
    Id,
    PurchaseOrderId,
    Name,
    Quantity,
    UnitPrice,
    SortOrder,
}

#[derive(DeriveIden)]
enum Expenses {
    Table,
    Id,
    PurchaseOrderId,
    BudgetCategoryId,
    InvoiceNumber,
    InvoiceDate,
    Status,
    TotalAmount,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ExpenseItems {
    Table,
    Id,
    ExpenseId,
    Name,
    Amount,
    SortOrder,
}

#[derive(DeriveIden)]
enum ChargeOuts {
    Table,
    Id,
    ProjectId,
    OpCoId,
    Status,
    TotalAmount,
    ConfirmedBy,
    ConfirmedAt,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum ChargeOutItems {
    Table,
    Id,
    ChargeOutId,
    ExpenseId,
    Amount,
}

#[derive(DeriveIden)]
enum OmExpenses {
    Table,
    Id,
    Name,
    CategoryId,
    FiscalYear,
    BudgetAmount,
    ActualSpent,
    Version,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OmMonthlyRecords {
    Table,
    Id,
    OmExpenseId,
    Month,
    BudgetAmount,
    ActualAmount,
}

#[derive(DeriveIden)]
enum HistoryTable {
    #[sea_orm(iden = "history")]
    Table,
    Id,
    EntityType,
    EntityId,
    Action,
    Details,
    UserId,
    CreatedAt,
}
