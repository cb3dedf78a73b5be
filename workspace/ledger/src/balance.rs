//! The balance store: the single concurrency-safe path for mutating shared
//! budget aggregates.
//!
//! Every delta is applied as one SQL `UPDATE ... SET x = x + delta` so that
//! two concurrent transactions against the same row both land instead of one
//! clobbering the other. Callers must hold an open transaction -- the
//! `&DatabaseTransaction` parameter makes applying a delta outside a
//! transactional scope unrepresentable. The store applies exactly what it is
//! told, exactly once per call; idempotency across retries is the workflow
//! coordinator's responsibility.

use model::entities::{budget_category, om_monthly_record, om_expense, project};
use rust_decimal::Decimal;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter,
};
use tracing::{debug, instrument};

use crate::error::{LedgerError, Result};

/// The mutable aggregate fields the ledger is allowed to touch. Nothing else
/// in the system may write these columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BalanceField {
    /// `budget_categories.used_amount`, consumed by expense approval.
    CategoryUsedAmount,
    /// `projects.approved_budget`, grown by proposal approval.
    ProjectApprovedBudget,
}

/// Applies `delta` to the named aggregate as part of the caller's
/// transaction and returns the new value.
///
/// If `expected_version` is given and no longer matches the stored row, the
/// delta is not applied and `Conflict` is returned; the bare atomic
/// increment (no version) cannot conflict, only miss (`NotFound`).
#[instrument(skip(txn))]
pub async fn apply_delta(
    txn: &DatabaseTransaction,
    field: BalanceField,
    target_id: i32,
    delta: Decimal,
    expected_version: Option<i32>,
) -> Result<Decimal> {
    let rows_affected = match field {
        BalanceField::CategoryUsedAmount => {
            let mut update = budget_category::Entity::update_many()
                .col_expr(
                    budget_category::Column::UsedAmount,
                    Expr::col(budget_category::Column::UsedAmount).add(delta),
                )
                .col_expr(
                    budget_category::Column::Version,
                    Expr::col(budget_category::Column::Version).add(1),
                )
                .filter(budget_category::Column::Id.eq(target_id));
            if let Some(version) = expected_version {
                update = update.filter(budget_category::Column::Version.eq(version));
            }
            update.exec(txn).await?.rows_affected
        }
        BalanceField::ProjectApprovedBudget => {
            let mut update = project::Entity::update_many()
                .col_expr(
                    project::Column::ApprovedBudget,
                    Expr::col(project::Column::ApprovedBudget).add(delta),
                )
                .col_expr(
                    project::Column::Version,
                    Expr::col(project::Column::Version).add(1),
                )
                .filter(project::Column::Id.eq(target_id));
            if let Some(version) = expected_version {
                update = update.filter(project::Column::Version.eq(version));
            }
            update.exec(txn).await?.rows_affected
        }
    };

    if rows_affected == 0 {
        // Distinguish a stale version from a missing row.
        return Err(match exists(txn, field, target_id).await? {
            true => LedgerError::Conflict(format!(
                "stale version for {field:?} target {target_id}"
            )),
            false => LedgerError::NotFound(format!("{field:?} target {target_id}")),
        });
    }

    let new_value = read(txn, field, target_id).await?;
    debug!(?field, target_id, %delta, %new_value, "balance delta applied");
    Ok(new_value)
}

/// Point-in-time read of an aggregate. Only linearizable with an in-flight
/// transition when called on the same transaction.
pub async fn read<C: ConnectionTrait>(
    conn: &C,
    field: BalanceField,
    target_id: i32,
) -> Result<Decimal> {
    match field {
        BalanceField::CategoryUsedAmount => Ok(budget_category::Entity::find_by_id(target_id)
            .one(conn)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("budget category {target_id}")))?
            .used_amount),
        BalanceField::ProjectApprovedBudget => Ok(project::Entity::find_by_id(target_id)
            .one(conn)
            .await?
            .ok_or_else(|| LedgerError::NotFound(format!("project {target_id}")))?
            .approved_budget),
    }
}

async fn exists(txn: &DatabaseTransaction, field: BalanceField, target_id: i32) -> Result<bool> {
    let count = match field {
        BalanceField::CategoryUsedAmount => {
            budget_category::Entity::find_by_id(target_id)
                .count(txn)
                .await?
        }
        BalanceField::ProjectApprovedBudget => {
            project::Entity::find_by_id(target_id).count(txn).await?
        }
    };
    Ok(count > 0)
}

/// Recomputes an O&M expense's `actual_spent` as the sum of its monthly
/// actuals, inside the caller's transaction. O&M totals are recomputed from
/// the twelve child rows rather than delta-applied, so a lost update on the
/// parent cannot drift away from the children.
///
/// The parent write is filtered on `expected_version`, so the version check
/// a caller performed earlier in the transaction is re-enforced at write
/// time; a row that moved on since then yields `Conflict`.
#[instrument(skip(txn))]
pub async fn recompute_om_actual_spent(
    txn: &DatabaseTransaction,
    om_expense_id: i32,
    expected_version: i32,
) -> Result<Decimal> {
    let records = om_monthly_record::Entity::find()
        .filter(om_monthly_record::Column::OmExpenseId.eq(om_expense_id))
        .all(txn)
        .await?;
    if records.is_empty() {
        return Err(LedgerError::NotFound(format!(
            "monthly records for om expense {om_expense_id}"
        )));
    }

    let total: Decimal = records.iter().map(|r| r.actual_amount).sum();

    let rows = om_expense::Entity::update_many()
        .col_expr(om_expense::Column::ActualSpent, Expr::value(total))
        .col_expr(
            om_expense::Column::Version,
            Expr::col(om_expense::Column::Version).add(1),
        )
        .filter(om_expense::Column::Id.eq(om_expense_id))
        .filter(om_expense::Column::Version.eq(expected_version))
        .exec(txn)
        .await?
        .rows_affected;
    if rows == 0 {
        let present = om_expense::Entity::find_by_id(om_expense_id)
            .count(txn)
            .await?
            > 0;
        return Err(match present {
            true => LedgerError::Conflict(format!(
                "stale version for om expense {om_expense_id}"
            )),
            false => LedgerError::NotFound(format!("om expense {om_expense_id}")),
        });
    }

    debug!(om_expense_id, %total, "om actual_spent recomputed");
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use sea_orm::{ActiveModelTrait, Database, DatabaseConnection, Set, TransactionTrait};

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
        db
    }

    async fn seed_category(db: &DatabaseConnection, total: i64) -> budget_category::Model {
        let pool = model::entities::budget_pool::ActiveModel {
            name: Set("FY2025".to_string()),
            fiscal_year: Set(2025),
            currency_code: Set("USD".to_string()),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();

        budget_category::ActiveModel {
            pool_id: Set(pool.id),
            name: Set("Hardware".to_string()),
            code: Set("HW".to_string()),
            total_amount: Set(Decimal::from(total)),
            used_amount: Set(Decimal::ZERO),
            version: Set(0),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn delta_increments_and_bumps_version() {
        let db = setup_db().await;
        let category = seed_category(&db, 1_000_000).await;

        let txn = db.begin().await.unwrap();
        let new_value = apply_delta(
            &txn,
            BalanceField::CategoryUsedAmount,
            category.id,
            Decimal::from(50_000),
            None,
        )
        .await
        .unwrap();
        txn.commit().await.unwrap();

        assert_eq!(new_value, Decimal::from(50_000));
        let stored = budget_category::Entity::find_by_id(category.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.used_amount, Decimal::from(50_000));
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn sequential_deltas_accumulate() {
        // Two approvals against the same category must both land; the SQL
        // increment makes the interleaving irrelevant.
        let db = setup_db().await;
        let category = seed_category(&db, 1_000_000).await;

        for amount in [100, 150] {
            let txn = db.begin().await.unwrap();
            apply_delta(
                &txn,
                BalanceField::CategoryUsedAmount,
                category.id,
                Decimal::from(amount),
                None,
            )
            .await
            .unwrap();
            txn.commit().await.unwrap();
        }

        let used = read(&db, BalanceField::CategoryUsedAmount, category.id)
            .await
            .unwrap();
        assert_eq!(used, Decimal::from(250));
    }

    #[tokio::test]
    async fn stale_version_is_a_conflict() {
        let db = setup_db().await;
        let category = seed_category(&db, 1_000_000).await;

        // First write at version 0 succeeds and bumps to 1.
        let txn = db.begin().await.unwrap();
        apply_delta(
            &txn,
            BalanceField::CategoryUsedAmount,
            category.id,
            Decimal::from(10),
            Some(0),
        )
        .await
        .unwrap();
        txn.commit().await.unwrap();

        // A second writer still holding version 0 must fail without applying.
        let txn = db.begin().await.unwrap();
        let err = apply_delta(
            &txn,
            BalanceField::CategoryUsedAmount,
            category.id,
            Decimal::from(10),
            Some(0),
        )
        .await
        .unwrap_err();
        txn.rollback().await.unwrap();
        assert!(matches!(err, LedgerError::Conflict(_)));

        let used = read(&db, BalanceField::CategoryUsedAmount, category.id)
            .await
            .unwrap();
        assert_eq!(used, Decimal::from(10));
    }

    #[tokio::test]
    async fn missing_target_is_not_found() {
        let db = setup_db().await;
        let txn = db.begin().await.unwrap();
        let err = apply_delta(
            &txn,
            BalanceField::CategoryUsedAmount,
            9999,
            Decimal::ONE,
            None,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, LedgerError::NotFound(_)));
    }

    async fn seed_om_expense(
        db: &DatabaseConnection,
        category_id: i32,
        actual: i64,
    ) -> om_expense::Model {
        let now = chrono::Utc::now().naive_utc();
        let parent = om_expense::ActiveModel {
            name: Set("Software maintenance".to_string()),
            category_id: Set(category_id),
            fiscal_year: Set(2025),
            budget_amount: Set(Decimal::from(120_000)),
            actual_spent: Set(Decimal::ZERO),
            version: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();

        om_monthly_record::ActiveModel {
            om_expense_id: Set(parent.id),
            month: Set(1),
            budget_amount: Set(Decimal::from(10_000)),
            actual_amount: Set(Decimal::from(actual)),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap();

        parent
    }

    #[tokio::test]
    async fn om_recompute_enforces_version_at_the_write() {
        let db = setup_db().await;
        let category = seed_category(&db, 1_000_000).await;
        let parent = seed_om_expense(&db, category.id, 40_000).await;

        // The write at the current version lands and bumps it.
        let txn = db.begin().await.unwrap();
        let total = recompute_om_actual_spent(&txn, parent.id, 0).await.unwrap();
        txn.commit().await.unwrap();
        assert_eq!(total, Decimal::from(40_000));

        // A writer still citing version 0 is refused by the UPDATE itself,
        // not just by a read-side check, and the stored total is untouched.
        let txn = db.begin().await.unwrap();
        let err = recompute_om_actual_spent(&txn, parent.id, 0)
            .await
            .unwrap_err();
        txn.rollback().await.unwrap();
        assert!(matches!(err, LedgerError::Conflict(_)));

        let stored = om_expense::Entity::find_by_id(parent.id)
            .one(&db)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.actual_spent, Decimal::from(40_000));
        assert_eq!(stored.version, 1);
    }

    #[tokio::test]
    async fn negative_delta_decrements() {
        let db = setup_db().await;
        let category = seed_category(&db, 1_000_000).await;

        let txn = db.begin().await.unwrap();
        apply_delta(
            &txn,
            BalanceField::CategoryUsedAmount,
            category.id,
            Decimal::from(500),
            None,
        )
        .await
        .unwrap();
        let value = apply_delta(
            &txn,
            BalanceField::CategoryUsedAmount,
            category.id,
            Decimal::from(-200),
            None,
        )
        .await
        .unwrap();
        txn.commit().await.unwrap();

        assert_eq!(value, Decimal::from(300));
    }
}
