use super::*;

fn record(user_id: &str, basket_id: &str, data: &str, last_updated: i64) -> BasketRecord {
    BasketRecord {
        user_id: user_id.to_string(),
        basket_id: basket_id.to_string(),
        data: data.to_string(),
        login_id: None,
        last_updated,
        expires_at: last_updated / 1000 + 86_400,
    }
}

#[tokio::test]
async fn test_get_projects_head() {
    let store = MockStore::new();
    let mut seeded = record("u1", "cart", "payload", 100);
    seeded.login_id = Some("login-1".to_string());
    store.seed(seeded).await;

    let head = store.get("u1", "cart").await.unwrap().unwrap();
    assert_eq!(head.user_id, "u1");
    assert_eq!(head.data, "payload");
    assert_eq!(head.login_id.as_deref(), Some("login-1"));

    assert!(store.get("u1", "other").await.unwrap().is_none());
}

#[tokio::test]
async fn test_query_orders_by_last_updated() {
    let store = MockStore::new();
    store.seed(record("u1", "c", "third", 300)).await;
    store.seed(record("u1", "a", "first", 100)).await;
    store.seed(record("u1", "b", "second", 200)).await;
    store.seed(record("u2", "a", "elsewhere", 50)).await;

    let summaries = store.query("u1").await.unwrap();
    let ids: Vec<&str> = summaries.iter().map(|s| s.basket_id.as_str()).collect();
    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn test_put_replaces_entire_record() {
    let store = MockStore::new();
    let mut first = record("u1", "cart", "old", 100);
    first.login_id = Some("login-1".to_string());
    store.put(first).await.unwrap();

    store.put(record("u1", "cart", "new", 200)).await.unwrap();

    let replaced = store.record("u1", "cart").await.unwrap();
    assert_eq!(replaced.data, "new");
    assert_eq!(replaced.login_id, None);
    assert_eq!(replaced.last_updated, 200);
}

#[tokio::test]
async fn test_update_login_creates_when_absent() {
    let store = MockStore::new();

    store
        .update_login("u1", "ghost", "login-9", 500)
        .await
        .unwrap();

    let created = store.record("u1", "ghost").await.unwrap();
    assert_eq!(created.login_id.as_deref(), Some("login-9"));
    assert_eq!(created.last_updated, 500);
    assert!(created.data.is_empty());
}

#[tokio::test]
async fn test_failure_injection_still_counts_calls() {
    let store = MockStore::new();
    store.set_fail_on_get(true).await;
    store.set_fail_on_query(true).await;

    assert!(store.get("u1", "cart").await.is_err());
    assert!(store.query("u1").await.is_err());

    let calls = store.calls();
    assert_eq!(calls.get, 1);
    assert_eq!(calls.query, 1);
    assert_eq!(calls.total(), 2);
}

#[tokio::test]
async fn test_selective_update_failure() {
    let store = MockStore::new();
    store.seed(record("u1", "ok", "d", 100)).await;
    store.seed(record("u1", "bad", "d", 100)).await;
    store.fail_update_for("bad").await;

    assert!(store.update_login("u1", "ok", "L", 200).await.is_ok());
    assert!(store.update_login("u1", "bad", "L", 200).await.is_err());
}
