mod common;

use afx_core::account::entity::{NewUser, User};
use afx_core::portfolio::entity::{
    NewStock, NewTeam, NewTransaction, StockPatch, TeamPatch, TransactionPatch,
};
use afx_core::store::error::StoreError;
use afx_core::store::port::{StockStore, TeamStore, TransactionStore, UserStore};
use afx_store::SqliteStore;
use chrono::{TimeZone, Utc};
use common::prepared_store;

async fn seed_user(store: &SqliteStore, name: &str) -> User {
    let email = format!("{}@example.com", name.to_lowercase());
    store
        .create_user(
            &NewUser::new(name, &email, "$2b$04$placeholderhash").unwrap(),
            &format!("tok-{name}"),
        )
        .await
        .unwrap()
}

#[tokio::test]
async fn test_team_crud_and_children() {
    let (store, _tmp) = prepared_store().await;
    let ada = seed_user(&store, "Ada").await;

    let bulls = store.create_team(&NewTeam::new("Bulls").unwrap()).await.unwrap();
    let bears = store.create_team(&NewTeam::new("Bears").unwrap()).await.unwrap();
    assert_eq!(store.list_teams().await.unwrap().len(), 2);

    let renamed = store
        .update_team(
            bears.id,
            &TeamPatch {
                name: Some("Cubs".into()),
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Cubs");

    let s1 = store
        .create_stock(&NewStock::new(ada.id, bulls.id, None).unwrap())
        .await
        .unwrap();
    let s2 = store
        .create_stock(&NewStock::new(ada.id, bulls.id, None).unwrap())
        .await
        .unwrap();

    let children = store.list_team_stocks(bulls.id).await.unwrap();
    assert_eq!(children, vec![s1, s2]);
    assert!(store.list_team_stocks(bears.id).await.unwrap().is_empty());
    assert!(matches!(
        store.list_team_stocks(404).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_team_with_stocks_is_restricted() {
    let (store, _tmp) = prepared_store().await;
    let ada = seed_user(&store, "Ada").await;
    let team = store.create_team(&NewTeam::new("Bulls").unwrap()).await.unwrap();
    let stock = store
        .create_stock(&NewStock::new(ada.id, team.id, None).unwrap())
        .await
        .unwrap();

    let res = store.delete_team(team.id).await;
    assert!(matches!(res, Err(StoreError::Conflict(_))));
    // 股票未被级联删除
    assert_eq!(store.get_stock(stock.id).await.unwrap(), stock);

    store.delete_stock(stock.id).await.unwrap();
    store.delete_team(team.id).await.unwrap();
    assert!(matches!(
        store.get_team(team.id).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_delete_user_with_stocks_is_restricted() {
    let (store, _tmp) = prepared_store().await;
    let ada = seed_user(&store, "Ada").await;
    let team = store.create_team(&NewTeam::new("Bulls").unwrap()).await.unwrap();
    store
        .create_stock(&NewStock::new(ada.id, team.id, None).unwrap())
        .await
        .unwrap();

    let res = store.delete_user(ada.id).await;
    assert!(matches!(res, Err(StoreError::Conflict(_))));
    assert_eq!(store.get_user(ada.id).await.unwrap().id, ada.id);
}

#[tokio::test]
async fn test_stock_references_must_exist() {
    let (store, _tmp) = prepared_store().await;
    let ada = seed_user(&store, "Ada").await;
    let team = store.create_team(&NewTeam::new("Bulls").unwrap()).await.unwrap();

    let no_owner = store
        .create_stock(&NewStock::new(999, team.id, None).unwrap())
        .await;
    assert!(matches!(no_owner, Err(StoreError::NotFound(_))));

    let no_team = store
        .create_stock(&NewStock::new(ada.id, 999, None).unwrap())
        .await;
    assert!(matches!(no_team, Err(StoreError::NotFound(_))));

    let stock = store
        .create_stock(&NewStock::new(ada.id, team.id, None).unwrap())
        .await
        .unwrap();
    let bad_patch = store
        .update_stock(
            stock.id,
            &StockPatch {
                team_id: Some(999),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(bad_patch, Err(StoreError::NotFound(_))));

    assert_eq!(store.find_owner(stock.id).await.unwrap().id, ada.id);
    assert_eq!(store.find_team(stock.id).await.unwrap(), team);
    assert!(matches!(
        store.find_owner(404).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_dangling_stock_reference_fails_decoding() {
    let (store, _tmp) = prepared_store().await;
    let team = store.create_team(&NewTeam::new("Bulls").unwrap()).await.unwrap();

    // 在关闭外键检查的连接上写入悬空引用
    let mut conn = store.pool().acquire().await.unwrap();
    sqlx::query("PRAGMA foreign_keys = OFF")
        .execute(&mut *conn)
        .await
        .unwrap();
    let id = sqlx::query("INSERT INTO stocks (owner_id, team_id) VALUES (?, ?)")
        .bind(999_i64)
        .bind(team.id)
        .execute(&mut *conn)
        .await
        .unwrap()
        .last_insert_rowid();
    sqlx::query("PRAGMA foreign_keys = ON")
        .execute(&mut *conn)
        .await
        .unwrap();
    drop(conn);

    assert!(matches!(
        store.get_stock(id).await,
        Err(StoreError::Serialization(_))
    ));
    assert!(matches!(
        store.list_team_stocks(team.id).await,
        Err(StoreError::Serialization(_))
    ));
}

#[tokio::test]
async fn test_user_children_and_siblings() {
    let (store, _tmp) = prepared_store().await;
    let ada = seed_user(&store, "Ada").await;
    let bob = seed_user(&store, "Bob").await;
    let bulls = store.create_team(&NewTeam::new("Bulls").unwrap()).await.unwrap();
    let bears = store.create_team(&NewTeam::new("Bears").unwrap()).await.unwrap();
    let _lakers = store.create_team(&NewTeam::new("Lakers").unwrap()).await.unwrap();

    for team_id in [bulls.id, bulls.id, bears.id] {
        store
            .create_stock(&NewStock::new(ada.id, team_id, None).unwrap())
            .await
            .unwrap();
    }

    let stocks = store.list_user_stocks(ada.id).await.unwrap();
    assert_eq!(stocks.len(), 3);
    assert!(stocks.iter().all(|s| s.owner_id == ada.id));

    let teams = store.list_user_teams(ada.id).await.unwrap();
    assert_eq!(teams, vec![bulls, bears]);

    assert!(store.list_user_stocks(bob.id).await.unwrap().is_empty());
    assert!(store.list_user_teams(bob.id).await.unwrap().is_empty());
    assert!(matches!(
        store.list_user_teams(404).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn test_transaction_lifecycle() {
    let (store, _tmp) = prepared_store().await;
    let ada = seed_user(&store, "Ada").await;
    let bob = seed_user(&store, "Bob").await;
    let team = store.create_team(&NewTeam::new("Bulls").unwrap()).await.unwrap();

    let tx = store
        .create_transaction(&NewTransaction::new(ada.id, bob.id, 1_200, None).unwrap())
        .await
        .unwrap();
    assert_eq!(tx.expiry, None);
    assert_eq!(store.get_transaction(tx.id).await.unwrap(), tx);

    let stock = store
        .create_stock(&NewStock::new(ada.id, team.id, Some(tx.id)).unwrap())
        .await
        .unwrap();
    assert_eq!(
        store.list_transaction_stocks(tx.id).await.unwrap(),
        vec![stock.clone()]
    );
    assert_eq!(store.find_seller(tx.id).await.unwrap().id, ada.id);
    assert_eq!(store.find_buyer(tx.id).await.unwrap().id, bob.id);

    let expiry = Utc.with_ymd_and_hms(2027, 3, 1, 12, 0, 0).unwrap();
    let updated = store
        .update_transaction(
            tx.id,
            &TransactionPatch {
                cost: Some(900),
                expiry: Some(Some(expiry)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.cost, 900);
    assert_eq!(updated.expiry, Some(expiry));
    assert_eq!(updated.seller_id, ada.id);

    // 只改价格时 expiry 保持不变
    let repriced = store
        .update_transaction(
            tx.id,
            &TransactionPatch {
                cost: Some(950),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(repriced.expiry, Some(expiry));

    // 参与交易的用户不可删除
    assert!(matches!(
        store.delete_user(bob.id).await,
        Err(StoreError::Conflict(_))
    ));

    // 删除交易后股票保留，transaction_id 置空
    store.delete_transaction(tx.id).await.unwrap();
    let orphan = store.get_stock(stock.id).await.unwrap();
    assert_eq!(orphan.transaction_id, None);
    assert_eq!(store.list_transactions().await.unwrap().len(), 0);
}

#[tokio::test]
async fn test_transaction_requires_existing_parties() {
    let (store, _tmp) = prepared_store().await;
    let ada = seed_user(&store, "Ada").await;
    let res = store
        .create_transaction(&NewTransaction::new(ada.id, 999, 10, None).unwrap())
        .await;
    assert!(matches!(res, Err(StoreError::NotFound(_))));
}

#[tokio::test]
async fn test_patch_null_clears_expiry_and_detaches_stock() {
    let (store, _tmp) = prepared_store().await;
    let ada = seed_user(&store, "Ada").await;
    let bob = seed_user(&store, "Bob").await;
    let team = store.create_team(&NewTeam::new("Bulls").unwrap()).await.unwrap();
    let expiry = Utc.with_ymd_and_hms(2027, 1, 1, 0, 0, 0).unwrap();
    let tx = store
        .create_transaction(&NewTransaction::new(ada.id, bob.id, 500, Some(expiry)).unwrap())
        .await
        .unwrap();
    let stock = store
        .create_stock(&NewStock::new(ada.id, team.id, Some(tx.id)).unwrap())
        .await
        .unwrap();

    let cleared = store
        .update_transaction(
            tx.id,
            &TransactionPatch {
                expiry: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(cleared.expiry, None);
    assert_eq!(cleared.cost, 500);

    // 未出现的字段不修改
    let untouched = store
        .update_stock(
            stock.id,
            &StockPatch {
                owner_id: Some(bob.id),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(untouched.transaction_id, Some(tx.id));

    let detached = store
        .update_stock(
            stock.id,
            &StockPatch {
                transaction_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(detached.transaction_id, None);
    assert_eq!(detached.owner_id, bob.id);
    assert!(store.list_transaction_stocks(tx.id).await.unwrap().is_empty());

    let reattached = store
        .update_stock(
            stock.id,
            &StockPatch {
                transaction_id: Some(Some(tx.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(reattached.transaction_id, Some(tx.id));
}

#[tokio::test]
async fn test_check_violation_is_invalid() {
    let (store, _tmp) = prepared_store().await;
    let ada = seed_user(&store, "Ada").await;
    let bob = seed_user(&store, "Bob").await;
    let team = store.create_team(&NewTeam::new("Bulls").unwrap()).await.unwrap();
    let tx = store
        .create_transaction(&NewTransaction::new(ada.id, bob.id, 10, None).unwrap())
        .await
        .unwrap();

    // 未经 validate 的补丁直接触发表上的 CHECK 约束
    let negative = store
        .update_transaction(
            tx.id,
            &TransactionPatch {
                cost: Some(-1),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(negative, Err(StoreError::Invalid(_))));
    assert_eq!(store.get_transaction(tx.id).await.unwrap().cost, 10);

    let blank = store
        .update_team(
            team.id,
            &TeamPatch {
                name: Some(String::new()),
            },
        )
        .await;
    assert!(matches!(blank, Err(StoreError::Invalid(_))));
}

#[tokio::test]
async fn test_restrict_schema_still_reports_conflict() {
    let (store, _tmp) = prepared_store().await;
    // 旧版表结构在外键上声明了 ON DELETE RESTRICT
    sqlx::query("DROP TABLE stocks")
        .execute(store.pool())
        .await
        .unwrap();
    sqlx::query(
        r#"
        CREATE TABLE stocks (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            owner_id INTEGER NOT NULL REFERENCES users(id) ON DELETE RESTRICT,
            team_id INTEGER NOT NULL REFERENCES teams(id) ON DELETE RESTRICT,
            transaction_id INTEGER REFERENCES transactions(id) ON DELETE SET NULL
        )
        "#,
    )
    .execute(store.pool())
    .await
    .unwrap();

    let ada = seed_user(&store, "Ada").await;
    let team = store.create_team(&NewTeam::new("Bulls").unwrap()).await.unwrap();
    store
        .create_stock(&NewStock::new(ada.id, team.id, None).unwrap())
        .await
        .unwrap();

    assert!(matches!(
        store.delete_team(team.id).await,
        Err(StoreError::Conflict(_))
    ));
    assert!(matches!(
        store.delete_user(ada.id).await,
        Err(StoreError::Conflict(_))
    ));
}
