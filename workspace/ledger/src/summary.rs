//! Read-only rollups over the ledger. Everything here is derivable from the
//! base tables on demand; nothing is cached or stored.

use common::{
    CategoryUtilization, OmExpenseSummary, OmSummary, OpCoRollup, OpCoSummary, PoolSummary,
};
use model::entities::{budget_category, budget_pool, charge_out, om_expense, operating_company};
use model::entities::charge_out::ChargeOutStatus;
use rust_decimal::Decimal;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder};
use tracing::instrument;

use crate::error::{LedgerError, Result};

/// Consumption ratio, or `None` for an empty allocation. Never divides by
/// zero and never pretends an unallocated budget is fully utilized.
pub fn utilization(used: Decimal, total: Decimal) -> Option<Decimal> {
    if total.is_zero() {
        None
    } else {
        Some(used / total)
    }
}

/// Per-category consumption for one pool. The pool total is the sum of its
/// category allocations.
#[instrument(skip(conn))]
pub async fn pool_summary<C: ConnectionTrait>(conn: &C, pool_id: i32) -> Result<PoolSummary> {
    let pool = budget_pool::Entity::find_by_id(pool_id)
        .one(conn)
        .await?
        .ok_or_else(|| LedgerError::NotFound(format!("budget pool {pool_id}")))?;

    let categories = budget_category::Entity::find()
        .filter(budget_category::Column::PoolId.eq(pool_id))
        .order_by_asc(budget_category::Column::Code)
        .all(conn)
        .await?;

    let mut total = Decimal::ZERO;
    let mut used = Decimal::ZERO;
    let rows = categories
        .into_iter()
        .map(|c| {
            total += c.total_amount;
            used += c.used_amount;
            CategoryUtilization {
                category_id: c.id,
                name: c.name,
                code: c.code,
                total_amount: c.total_amount,
                used_amount: c.used_amount,
                utilization: utilization(c.used_amount, c.total_amount),
            }
        })
        .collect();

    Ok(PoolSummary {
        pool_id: pool.id,
        name: pool.name,
        fiscal_year: pool.fiscal_year,
        currency_code: pool.currency_code,
        total_amount: total,
        used_amount: used,
        utilization: utilization(used, total),
        categories: rows,
    })
}

/// Charge-out totals grouped by operating company and status. Companies with
/// no charge-outs still appear, with zero rows.
#[instrument(skip(conn))]
pub async fn opco_summary<C: ConnectionTrait>(conn: &C) -> Result<OpCoSummary> {
    let companies = operating_company::Entity::find()
        .order_by_asc(operating_company::Column::Code)
        .all(conn)
        .await?;
    let charge_outs = charge_out::Entity::find().all(conn).await?;

    let mut rollups: Vec<OpCoRollup> = companies
        .into_iter()
        .map(|c| OpCoRollup {
            op_co_id: c.id,
            name: c.name,
            code: c.code,
            draft_amount: Decimal::ZERO,
            submitted_amount: Decimal::ZERO,
            confirmed_amount: Decimal::ZERO,
            paid_amount: Decimal::ZERO,
        })
        .collect();

    let mut total_confirmed = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    for co in charge_outs {
        let Some(rollup) = rollups.iter_mut().find(|r| r.op_co_id == co.op_co_id) else {
            continue;
        };
        match co.status {
            ChargeOutStatus::Draft => rollup.draft_amount += co.total_amount,
            ChargeOutStatus::Submitted => rollup.submitted_amount += co.total_amount,
            ChargeOutStatus::Confirmed => {
                rollup.confirmed_amount += co.total_amount;
                total_confirmed += co.total_amount;
            }
            ChargeOutStatus::Paid => {
                rollup.paid_amount += co.total_amount;
                total_paid += co.total_amount;
            }
            // Rejected charge-outs never bill anyone.
            ChargeOutStatus::Rejected => {}
        }
    }

    Ok(OpCoSummary {
        companies: rollups,
        total_confirmed,
        total_paid,
    })
}

/// Budget versus actual for every O&M expense in a fiscal year.
#[instrument(skip(conn))]
pub async fn om_summary<C: ConnectionTrait>(conn: &C, fiscal_year: i32) -> Result<OmSummary> {
    let expenses = om_expense::Entity::find()
        .filter(om_expense::Column::FiscalYear.eq(fiscal_year))
        .order_by_asc(om_expense::Column::Name)
        .all(conn)
        .await?;

    let mut total_budget = Decimal::ZERO;
    let mut total_actual = Decimal::ZERO;
    let items = expenses
        .into_iter()
        .map(|e| {
            total_budget += e.budget_amount;
            total_actual += e.actual_spent;
            OmExpenseSummary {
                om_expense_id: e.id,
                name: e.name,
                budget_amount: e.budget_amount,
                actual_spent: e.actual_spent,
                utilization: utilization(e.actual_spent, e.budget_amount),
            }
        })
        .collect();

    Ok(OmSummary {
        fiscal_year,
        total_budget,
        total_actual,
        items,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set};

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
        db
    }

    #[test]
    fn utilization_is_none_for_empty_allocation() {
        assert_eq!(utilization(Decimal::ZERO, Decimal::ZERO), None);
        assert_eq!(utilization(Decimal::from(10), Decimal::ZERO), None);
        assert_eq!(
            utilization(Decimal::from(50_000), Decimal::from(1_000_000)),
            Some(Decimal::new(5, 2))
        );
    }

    #[tokio::test]
    async fn pool_summary_sums_categories() {
        let db = setup_db().await;
        let pool = model::entities::budget_pool::ActiveModel {
            name: Set("FY2025".to_string()),
            fiscal_year: Set(2025),
            currency_code: Set("USD".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        for (code, total, used) in [("HW", 600_000, 60_000), ("SW", 400_000, 0)] {
            budget_category::ActiveModel {
                pool_id: Set(pool.id),
                name: Set(code.to_string()),
                code: Set(code.to_string()),
                total_amount: Set(Decimal::from(total)),
                used_amount: Set(Decimal::from(used)),
                version: Set(0),
                ..Default::default()
            }
            .insert(&db)
            .await
            .unwrap();
        }

        let summary = pool_summary(&db, pool.id).await.unwrap();
        assert_eq!(summary.total_amount, Decimal::from(1_000_000));
        assert_eq!(summary.used_amount, Decimal::from(60_000));
        assert_eq!(summary.utilization, Some(Decimal::new(6, 2)));
        assert_eq!(summary.categories.len(), 2);
        assert_eq!(summary.categories[0].code, "HW");
        assert_eq!(summary.categories[0].utilization, Some(Decimal::new(1, 1)));
    }

    #[tokio::test]
    async fn pool_summary_missing_pool_is_not_found() {
        let db = setup_db().await;
        let err = pool_summary(&db, 404).await.unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    #[tokio::test]
    async fn opco_summary_groups_by_company_and_status() {
        let db = setup_db().await;
        let user = model::entities::user::ActiveModel {
            name: Set("Pat".to_string()),
            email: Set("pat@example.com".to_string()),
            role: Set(model::entities::user::Role::ProjectManager),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        let pool = model::entities::budget_pool::ActiveModel {
            name: Set("FY2025".to_string()),
            fiscal_year: Set(2025),
            currency_code: Set("USD".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        let category = budget_category::ActiveModel {
            pool_id: Set(pool.id),
            name: Set("HW".to_string()),
            code: Set("HW".to_string()),
            total_amount: Set(Decimal::from(100_000)),
            used_amount: Set(Decimal::ZERO),
            version: Set(0),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        let project = model::entities::project::ActiveModel {
            name: Set("Rollout".to_string()),
            category_id: Set(category.id),
            pool_id: Set(pool.id),
            manager_id: Set(user.id),
            supervisor_id: Set(user.id),
            status: Set(model::entities::project::ProjectStatus::InProgress),
            approved_budget: Set(Decimal::ZERO),
            version: Set(0),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let mut companies = Vec::new();
        for (name, code) in [("Northwind", "NWL"), ("Contoso", "CON")] {
            companies.push(
                operating_company::ActiveModel {
                    name: Set(name.to_string()),
                    code: Set(code.to_string()),
                    ..Default::default()
                }
                .insert(&db)
                .await
                .unwrap(),
            );
        }

        let now = chrono::Utc::now().naive_utc();
        for (op_co_id, status, amount) in [
            (companies[0].id, ChargeOutStatus::Confirmed, 5_000),
            (companies[0].id, ChargeOutStatus::Paid, 2_000),
            (companies[0].id, ChargeOutStatus::Rejected, 9_999),
        ] {
            charge_out::ActiveModel {
                project_id: Set(project.id),
                op_co_id: Set(op_co_id),
                status: Set(status),
                total_amount: Set(Decimal::from(amount)),
                version: Set(0),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&db)
            .await
            .unwrap();
        }

        let summary = opco_summary(&db).await.unwrap();
        assert_eq!(summary.companies.len(), 2);
        // Ordered by code: CON first, with no charge-outs.
        assert_eq!(summary.companies[0].code, "CON");
        assert_eq!(summary.companies[0].confirmed_amount, Decimal::ZERO);
        assert_eq!(summary.companies[1].confirmed_amount, Decimal::from(5_000));
        assert_eq!(summary.companies[1].paid_amount, Decimal::from(2_000));
        assert_eq!(summary.total_confirmed, Decimal::from(5_000));
        assert_eq!(summary.total_paid, Decimal::from(2_000));
    }

    #[tokio::test]
    async fn om_summary_rolls_up_fiscal_year() {
        let db = setup_db().await;
        let pool = model::entities::budget_pool::ActiveModel {
            name: Set("FY2025".to_string()),
            fiscal_year: Set(2025),
            currency_code: Set("USD".to_string()),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();
        let category = budget_category::ActiveModel {
            pool_id: Set(pool.id),
            name: Set("Ops".to_string()),
            code: Set("OPS".to_string()),
            total_amount: Set(Decimal::from(100_000)),
            used_amount: Set(Decimal::ZERO),
            version: Set(0),
            ..Default::default()
        }
        .insert(&db)
        .await
        .unwrap();

        let now = chrono::Utc::now().naive_utc();
        for (name, year, budget, actual) in
            [("Backups", 2025, 12_000, 3_000), ("Licences", 2024, 9_000, 9_000)]
        {
            om_expense::ActiveModel {
                name: Set(name.to_string()),
                category_id: Set(category.id),
                fiscal_year: Set(year),
                budget_amount: Set(Decimal::from(budget)),
                actual_spent: Set(Decimal::from(actual)),
                version: Set(0),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            }
            .insert(&db)
            .await
            .unwrap();
        }

        let summary = om_summary(&db, 2025).await.unwrap();
        assert_eq!(summary.items.len(), 1);
        assert_eq!(summary.total_budget, Decimal::from(12_000));
        assert_eq!(summary.total_actual, Decimal::from(3_000));
        assert_eq!(summary.items[0].utilization, Some(Decimal::new(25, 2)));
    }
}
