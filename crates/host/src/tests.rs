use crate::mock::InMemoryHost;
use crate::{Clock, Storage, Wallet};
use pamlogix_core::UserId;
use std::collections::HashMap;

#[tokio::test]
async fn storage_version_check_rejects_stale_writes() {
    let host = InMemoryHost::new();
    let user = UserId::from("u1");
    let v1 = host
        .write("inventory", "user_items", Some(&user), "{}".to_string(), None)
        .await
        .unwrap();
    let v2 = host
        .write("inventory", "user_items", Some(&user), "{\"a\":1}".to_string(), Some(&v1))
        .await
        .unwrap();
    assert_ne!(v1, v2);

    let err = host
        .write("inventory", "user_items", Some(&user), "{\"a\":2}".to_string(), Some(&v1))
        .await
        .unwrap_err();
    assert_eq!(err.sentinel, "StorageVersionMismatch");
}

#[tokio::test]
async fn wallet_update_rejects_negative_balance() {
    let host = InMemoryHost::new();
    let user = UserId::from("u1");
    host.seed_wallet(&user, "gold", 10);
    let mut deltas = HashMap::new();
    deltas.insert("gold".to_string(), -20);
    let err = host.update(&user, &deltas, HashMap::new(), true).await.unwrap_err();
    assert_eq!(err.sentinel, "WalletInsufficientFunds");

    let mut ok_deltas = HashMap::new();
    ok_deltas.insert("gold".to_string(), -5);
    let result = host.update(&user, &ok_deltas, HashMap::new(), true).await.unwrap();
    assert_eq!(result.updated.get("gold"), Some(&5));
}

#[test]
fn clock_advances() {
    let host = InMemoryHost::new();
    host.set_now(100);
    host.advance(50);
    assert_eq!(host.now_unix_sec(), 150);
}
