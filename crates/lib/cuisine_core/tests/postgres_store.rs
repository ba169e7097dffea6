//! `PgUserStore` against a live PostgreSQL.
//!
//! Connects to `DATABASE_URL` and runs the migrations first. Every test
//! returns early when the variable is unset, so the suite still passes
//! without a database.

use chrono::{Duration, Utc};
use cuisine_core::models::auth::{NewUser, ProfileUpdate};
use cuisine_core::models::favorites::FavoriteEntry;
use cuisine_core::store::{PgUserStore, StoreError, UserStore};
use serde_json::Map;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

async fn store() -> Option<PgUserStore> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping PostgreSQL store test");
        return None;
    };
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&url)
        .await
        .expect("connect to DATABASE_URL");
    cuisine_core::migrate::migrate(&pool)
        .await
        .expect("run migrations");
    Some(PgUserStore::new(pool))
}

/// An address no other test run has used.
fn unique_email() -> String {
    format!("{}@x.com", Uuid::now_v7())
}

fn new_user(email: &str) -> NewUser {
    NewUser {
        username: "chef".into(),
        email: email.into(),
        password_hash: "hash".into(),
        avatar_url: "https://example.com/a.svg".into(),
    }
}

fn entry(meal_id: &str, name: &str) -> FavoriteEntry {
    let mut meal = Map::new();
    meal.insert("strMeal".into(), name.into());
    FavoriteEntry::new(meal_id, meal, Utc::now())
}

#[tokio::test]
async fn duplicate_email_conflicts() {
    let Some(store) = store().await else { return };
    let email = unique_email();

    let user = store.insert_user(new_user(&email)).await.expect("insert");
    assert_eq!(user.email, email);
    let err = store.insert_user(new_user(&email)).await.unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)), "{err:?}");

    let found = store
        .find_by_email(&email)
        .await
        .expect("find")
        .expect("user exists");
    assert_eq!(found.user, user);
    assert_eq!(found.password_hash, "hash");
    assert_eq!(store.find_by_id(&user.id).await.expect("find"), Some(user));
}

#[tokio::test]
async fn favorites_keep_first_snapshot_and_order() {
    let Some(store) = store().await else { return };
    let user = store
        .insert_user(new_user(&unique_email()))
        .await
        .expect("insert");

    assert!(store.add_favorite(&user.id, entry("2", "first")).await.unwrap());
    assert!(store.add_favorite(&user.id, entry("1", "second")).await.unwrap());
    assert!(!store.add_favorite(&user.id, entry("2", "replaced")).await.unwrap());

    let favorites = store.list_favorites(&user.id).await.unwrap();
    let listed: Vec<(&str, &str)> = favorites
        .iter()
        .map(|f| (f.meal_id.as_str(), f.meal["strMeal"].as_str().unwrap_or("")))
        .collect();
    assert_eq!(listed, [("2", "first"), ("1", "second")]);

    assert!(store.remove_favorite(&user.id, "2").await.unwrap());
    assert!(!store.remove_favorite(&user.id, "2").await.unwrap());
    assert!(!store.remove_favorite(&user.id, "never-added").await.unwrap());
    let ids: Vec<String> = store
        .list_favorites(&user.id)
        .await
        .unwrap()
        .into_iter()
        .map(|f| f.meal_id)
        .collect();
    assert_eq!(ids, ["1"]);
}

#[tokio::test]
async fn unknown_user_is_not_found() {
    let Some(store) = store().await else { return };
    for user_id in [Uuid::now_v7().to_string(), "not-a-uuid".to_string()] {
        assert!(matches!(
            store.list_favorites(&user_id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.add_favorite(&user_id, entry("1", "soup")).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.remove_favorite(&user_id, "1").await,
            Err(StoreError::NotFound(_))
        ));
        assert_eq!(store.find_by_id(&user_id).await.unwrap(), None);
        assert_eq!(
            store
                .update_profile(&user_id, &ProfileUpdate::default())
                .await
                .unwrap(),
            None
        );
    }
}

#[tokio::test]
async fn profile_update_is_partial_and_keeps_emails_unique() {
    let Some(store) = store().await else { return };
    let a = store
        .insert_user(new_user(&unique_email()))
        .await
        .expect("insert a");
    let b = store
        .insert_user(new_user(&unique_email()))
        .await
        .expect("insert b");

    let taken = ProfileUpdate {
        username: None,
        email: Some(b.email.clone()),
    };
    assert!(matches!(
        store.update_profile(&a.id, &taken).await,
        Err(StoreError::Conflict(_))
    ));

    let renamed = store
        .update_profile(
            &a.id,
            &ProfileUpdate {
                username: Some("Master Chef".into()),
                email: None,
            },
        )
        .await
        .unwrap()
        .expect("user exists");
    assert_eq!(renamed.username, "Master Chef");
    assert_eq!(renamed.email, a.email);
    assert_eq!(renamed.avatar_url, a.avatar_url);

    let moved_to = unique_email();
    let moved = store
        .update_profile(
            &a.id,
            &ProfileUpdate {
                username: None,
                email: Some(moved_to.clone()),
            },
        )
        .await
        .unwrap()
        .expect("user exists");
    assert_eq!(moved.username, "Master Chef");
    assert_eq!(moved.email, moved_to);
    assert!(store.find_by_email(&a.email).await.unwrap().is_none());
}

#[tokio::test]
async fn reset_token_is_single_use_and_expires() {
    let Some(store) = store().await else { return };
    let user = store
        .insert_user(new_user(&unique_email()))
        .await
        .expect("insert");
    let now = Utc::now();
    let token_hash = format!("hash-{}", Uuid::now_v7());

    store
        .set_reset_token(&user.id, &token_hash, now + Duration::hours(1))
        .await
        .unwrap();
    let late = now + Duration::hours(2);
    assert_eq!(
        store
            .consume_reset_token(&token_hash, "late-hash", late)
            .await
            .unwrap(),
        None
    );

    assert_eq!(
        store
            .consume_reset_token(&token_hash, "new-hash", now)
            .await
            .unwrap(),
        Some(user.id.clone())
    );
    assert_eq!(
        store
            .consume_reset_token(&token_hash, "again-hash", now)
            .await
            .unwrap(),
        None
    );

    let found = store
        .find_by_email(&user.email)
        .await
        .unwrap()
        .expect("user exists");
    assert_eq!(found.password_hash, "new-hash");
}

#[tokio::test]
async fn reset_token_for_unknown_user_is_not_found() {
    let Some(store) = store().await else { return };
    let err = store
        .set_reset_token(&Uuid::now_v7().to_string(), "h", Utc::now())
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)), "{err:?}");
}

#[tokio::test]
async fn ping_reports_a_live_pool() {
    let Some(store) = store().await else { return };
    assert!(store.ping().await);
}
