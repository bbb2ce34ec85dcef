use anyhow::Result;
use sea_orm::{EntityTrait, TransactionTrait};
use uuid::Uuid;

use super::setup_test_db;
use crate::{tenant, user};

/// Rolled-back writes leave nothing behind
#[tokio::test]
async fn test_transaction_rollback() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let txn = db.begin().await?;
    let t = tenant::create(&txn, &format!("txn_{}", Uuid::new_v4())).await?;
    let u = user::create(&txn, t.id, "txn@example.com", "Txn").await?;
    txn.rollback().await?;

    assert!(tenant::Entity::find_by_id(t.id).one(&db).await?.is_none());
    assert!(user::Entity::find_by_id(u.id).one(&db).await?.is_none());
    Ok(())
}

/// Duplicate emails within one tenant violate the unique index
#[tokio::test]
async fn test_unique_email_per_tenant() -> Result<()> {
    let Some(db) = setup_test_db().await else { return Ok(()) };

    let txn = db.begin().await?;
    let t = tenant::create(&txn, &format!("uniq_{}", Uuid::new_v4())).await?;
    user::create(&txn, t.id, "dup@example.com", "One").await?;
    let dup = user::create(&txn, t.id, "DUP@example.com", "Two").await;
    assert!(dup.is_err());
    txn.rollback().await?;
    Ok(())
}
