//! Append-only audit trail. One row per workflow action, written inside the
//! same transaction as the state change it records, so the trail and the
//! ledger can never disagree about what happened.

use chrono::Utc;
use model::entities::history;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseTransaction, EntityTrait, QueryFilter,
    QueryOrder, Set,
};
use tracing::{debug, instrument};

use crate::auth::EntityRef;
use crate::error::Result;

/// Appends one audit entry for `entity`. `action` is an UPPERCASE tag such
/// as `"APPROVED"`; `details` is free-form (typically the reviewer's note).
#[instrument(skip(txn, details))]
pub async fn append(
    txn: &DatabaseTransaction,
    entity: EntityRef,
    action: &str,
    details: Option<String>,
    user_id: i32,
) -> Result<history::Model> {
    let entry = history::ActiveModel {
        entity_type: Set(entity.entity_type()),
        entity_id: Set(entity.entity_id()),
        action: Set(action.to_string()),
        details: Set(details),
        user_id: Set(user_id),
        created_at: Set(Utc::now().naive_utc()),
        ..Default::default()
    }
    .insert(txn)
    .await?;

    debug!(history_id = entry.id, action, "audit entry appended");
    Ok(entry)
}

/// Full trail for one entity, oldest first. Ties on the timestamp fall back
/// to insertion order.
pub async fn list_for<C: ConnectionTrait>(conn: &C, entity: EntityRef) -> Result<Vec<history::Model>> {
    let entries = history::Entity::find()
        .filter(history::Column::EntityType.eq(entity.entity_type()))
        .filter(history::Column::EntityId.eq(entity.entity_id()))
        .order_by_asc(history::Column::CreatedAt)
        .order_by_asc(history::Column::Id)
        .all(conn)
        .await?;
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use migration::{Migrator, MigratorTrait};
    use model::entities::user;
    use sea_orm::{Database, DatabaseConnection, TransactionTrait};

    async fn setup_db() -> DatabaseConnection {
        let db = Database::connect("sqlite::memory:")
            .await
            .expect("Failed to connect to in-memory database");
        Migrator::up(&db, None)
            .await
            .expect("Failed to run migrations");
        db
    }

    async fn seed_user(db: &DatabaseConnection) -> user::Model {
        user::ActiveModel {
            name: Set("Auditor".to_string()),
            email: Set("auditor@example.com".to_string()),
            role: Set(user::Role::Supervisor),
            ..Default::default()
        }
        .insert(db)
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn entries_are_returned_oldest_first() {
        let db = setup_db().await;
        let actor = seed_user(&db).await;
        let entity = EntityRef::BudgetProposal(42);

        let txn = db.begin().await.unwrap();
        append(&txn, entity, "SUBMITTED", None, actor.id).await.unwrap();
        append(
            &txn,
            entity,
            "APPROVED",
            Some("looks good".to_string()),
            actor.id,
        )
        .await
        .unwrap();
        txn.commit().await.unwrap();

        let trail = list_for(&db, entity).await.unwrap();
        assert_eq!(trail.len(), 2);
        assert_eq!(trail[0].action, "SUBMITTED");
        assert_eq!(trail[1].action, "APPROVED");
        assert_eq!(trail[1].details.as_deref(), Some("looks good"));
    }

    #[tokio::test]
    async fn trails_do_not_bleed_across_entities() {
        let db = setup_db().await;
        let actor = seed_user(&db).await;

        let txn = db.begin().await.unwrap();
        append(&txn, EntityRef::BudgetProposal(1), "SUBMITTED", None, actor.id)
            .await
            .unwrap();
        // Same numeric id, different entity type.
        append(&txn, EntityRef::Expense(1), "SUBMITTED", None, actor.id)
            .await
            .unwrap();
        txn.commit().await.unwrap();

        let proposal_trail = list_for(&db, EntityRef::BudgetProposal(1)).await.unwrap();
        assert_eq!(proposal_trail.len(), 1);
        let expense_trail = list_for(&db, EntityRef::Expense(1)).await.unwrap();
        assert_eq!(expense_trail.len(), 1);
    }
}
