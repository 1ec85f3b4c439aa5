//! `InMemoryHost` — a single fake implementing every collaborator trait,
//! shared by all subsystem crates' test modules. Grounded on the teacher's
//! `pallets/*/src/mock.rs` pattern (one `Test` runtime construction reused
//! by `tests.rs`), lifted to crate level since every subsystem here depends
//! on the same seven-trait contract rather than a bespoke `pallet_balances`.

use crate::{
    accounts::Accounts,
    clock::Clock,
    groups::{GroupMembership, Groups, GroupsListPage},
    iap::{Iap, IapStore, IapValidation},
    notifications::Notifications,
    storage::{Storage, StorageListPage, StorageRecord},
    streams::Streams,
    wallet::{Wallet, WalletUpdateResult},
};
use async_trait::async_trait;
use pamlogix_core::{conflict, insufficient_funds, GroupId, PamlogixError, TransactionId, UnixSeconds, UserId};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

type StorageMapKey = (String, Option<String>, String);

#[derive(Default)]
pub struct InMemoryHost {
    storage: Mutex<HashMap<StorageMapKey, StorageRecord>>,
    version_counter: AtomicU64,
    wallets: Mutex<HashMap<UserId, HashMap<String, i64>>>,
    now: AtomicI64,
    stream_subscribers: Mutex<HashMap<String, Vec<UserId>>>,
    pub stream_sends: Mutex<Vec<(String, String)>>,
    pub notifications_sent: Mutex<Vec<(UserId, String, String, i32, bool)>>,
    group_memberships: Mutex<HashMap<UserId, Vec<GroupMembership>>>,
    pub channel_messages: Mutex<Vec<(String, UserId, String)>>,
    iap_responses: Mutex<HashMap<String, IapValidation>>,
    account_create_times: Mutex<HashMap<UserId, UnixSeconds>>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_now(&self, now: UnixSeconds) {
        self.now.store(now, Ordering::SeqCst);
    }

    pub fn advance(&self, delta_sec: i64) {
        self.now.fetch_add(delta_sec, Ordering::SeqCst);
    }

    pub fn seed_wallet(&self, user_id: &UserId, currency_id: &str, amount: i64) {
        self.wallets
            .lock()
            .entry(user_id.clone())
            .or_default()
            .insert(currency_id.to_string(), amount);
    }

    pub fn set_account_create_time(&self, user_id: &UserId, t: UnixSeconds) {
        self.account_create_times.lock().insert(user_id.clone(), t);
    }

    pub fn set_group_memberships(&self, user_id: &UserId, memberships: Vec<GroupMembership>) {
        self.group_memberships.lock().insert(user_id.clone(), memberships);
    }

    pub fn seed_iap_receipt(&self, receipt: &str, validation: IapValidation) {
        self.iap_responses.lock().insert(receipt.to_string(), validation);
    }

    pub fn wallet_balance(&self, user_id: &UserId, currency_id: &str) -> i64 {
        self.wallets.lock().get(user_id).and_then(|b| b.get(currency_id)).copied().unwrap_or(0)
    }

    pub fn stream_members(&self, topic: &str) -> Vec<UserId> {
        self.stream_subscribers.lock().get(topic).cloned().unwrap_or_default()
    }

    fn storage_key(collection: &str, key: &str, user_id: Option<&UserId>) -> StorageMapKey {
        (collection.to_string(), user_id.map(|u| u.0.clone()), key.to_string())
    }

    fn next_version(&self) -> String {
        self.version_counter.fetch_add(1, Ordering::SeqCst).to_string()
    }
}

#[async_trait]
impl Storage for InMemoryHost {
    async fn read(
        &self,
        collection: &str,
        key: &str,
        user_id: Option<&UserId>,
    ) -> Result<Option<StorageRecord>, PamlogixError> {
        let map = self.storage.lock();
        Ok(map.get(&Self::storage_key(collection, key, user_id)).cloned())
    }

    async fn write(
        &self,
        collection: &str,
        key: &str,
        user_id: Option<&UserId>,
        value: String,
        version_check: Option<&str>,
    ) -> Result<String, PamlogixError> {
        let mut map = self.storage.lock();
        let storage_key = Self::storage_key(collection, key, user_id);
        if let Some(expected) = version_check {
            let current = map.get(&storage_key).map(|r| r.version.as_str());
            if current != Some(expected) {
                return Err(conflict(
                    "StorageVersionMismatch",
                    format!("expected version {expected}, found {current:?}"),
                ));
            }
        }
        let version = self.next_version();
        map.insert(storage_key, StorageRecord { value, version: version.clone() });
        Ok(version)
    }

    async fn delete(
        &self,
        collection: &str,
        key: &str,
        user_id: Option<&UserId>,
    ) -> Result<(), PamlogixError> {
        self.storage.lock().remove(&Self::storage_key(collection, key, user_id));
        Ok(())
    }

    async fn list(
        &self,
        collection: &str,
        user_id: Option<&UserId>,
        prefix: &str,
        limit: usize,
        cursor: Option<&str>,
    ) -> Result<StorageListPage, PamlogixError> {
        let map = self.storage.lock();
        let owner = user_id.map(|u| u.0.clone());
        let mut keys: Vec<String> = map
            .keys()
            .filter(|(c, u, k)| c == collection && *u == owner && k.starts_with(prefix))
            .map(|(_, _, k)| k.clone())
            .collect();
        keys.sort();
        let start = match cursor {
            Some(c) => keys.iter().position(|k| k.as_str() > c).unwrap_or(keys.len()),
            None => 0,
        };
        let page: Vec<String> = keys[start..].iter().take(limit).cloned().collect();
        let next_cursor = if start + page.len() < keys.len() {
            page.last().cloned()
        } else {
            None
        };
        Ok(StorageListPage { keys: page, cursor: next_cursor })
    }
}

#[async_trait]
impl Wallet for InMemoryHost {
    async fn update(
        &self,
        user_id: &UserId,
        deltas: &HashMap<String, i64>,
        _metadata: HashMap<String, String>,
        _update_ledger: bool,
    ) -> Result<WalletUpdateResult, PamlogixError> {
        let mut wallets = self.wallets.lock();
        let balances = wallets.entry(user_id.clone()).or_default();
        let previous = balances.clone();
        for (currency, delta) in deltas {
            let entry = balances.entry(currency.clone()).or_insert(0);
            let new_value = *entry + delta;
            if new_value < 0 {
                return Err(insufficient_funds(
                    "WalletInsufficientFunds",
                    format!("{currency} would go negative ({new_value})"),
                ));
            }
        }
        for (currency, delta) in deltas {
            *balances.entry(currency.clone()).or_insert(0) += delta;
        }
        Ok(WalletUpdateResult { previous, updated: balances.clone() })
    }

    async fn get(&self, user_id: &UserId) -> Result<HashMap<String, i64>, PamlogixError> {
        Ok(self.wallets.lock().get(user_id).cloned().unwrap_or_default())
    }
}

impl Clock for InMemoryHost {
    fn now_unix_sec(&self) -> UnixSeconds {
        self.now.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Streams for InMemoryHost {
    async fn user_join(&self, user_id: &UserId, topic: &str) -> Result<(), PamlogixError> {
        let mut subs = self.stream_subscribers.lock();
        let entry = subs.entry(topic.to_string()).or_default();
        if !entry.contains(user_id) {
            entry.push(user_id.clone());
        }
        Ok(())
    }

    async fn user_list(&self, topic: &str) -> Result<Vec<UserId>, PamlogixError> {
        Ok(self.stream_subscribers.lock().get(topic).cloned().unwrap_or_default())
    }

    async fn send(&self, topic: &str, payload: &str) -> Result<(), PamlogixError> {
        self.stream_sends.lock().push((topic.to_string(), payload.to_string()));
        Ok(())
    }
}

#[async_trait]
impl Notifications for InMemoryHost {
    async fn send(
        &self,
        user_id: &UserId,
        subject: &str,
        payload: &str,
        code: i32,
        persistent: bool,
    ) -> Result<(), PamlogixError> {
        self.notifications_sent.lock().push((
            user_id.clone(),
            subject.to_string(),
            payload.to_string(),
            code,
            persistent,
        ));
        Ok(())
    }
}

#[async_trait]
impl Groups for InMemoryHost {
    async fn user_groups_list(
        &self,
        user_id: &UserId,
        limit: u32,
        _cursor: Option<&str>,
    ) -> Result<GroupsListPage, PamlogixError> {
        let memberships = self.group_memberships.lock().get(user_id).cloned().unwrap_or_default();
        let memberships = memberships.into_iter().take(limit as usize).collect();
        Ok(GroupsListPage { memberships, cursor: None })
    }

    async fn channel_id_build(&self, group_id: &GroupId) -> Result<String, PamlogixError> {
        Ok(format!("channel:{}", group_id.0))
    }

    async fn channel_message_send(
        &self,
        channel_id: &str,
        sender: &UserId,
        content: &str,
    ) -> Result<(), PamlogixError> {
        self.channel_messages.lock().push((channel_id.to_string(), sender.clone(), content.to_string()));
        Ok(())
    }
}

#[async_trait]
impl Iap for InMemoryHost {
    async fn validate_receipt(
        &self,
        _store: IapStore,
        _user_id: &UserId,
        receipt: &str,
    ) -> Result<IapValidation, PamlogixError> {
        self.iap_responses.lock().get(receipt).cloned().ok_or_else(|| {
            pamlogix_core::invalid_input("IapReceiptInvalid", format!("no mock response for {receipt}"))
        })
    }
}

#[async_trait]
impl Accounts for InMemoryHost {
    async fn get_id(&self, user_id: &UserId) -> Result<UserId, PamlogixError> {
        Ok(user_id.clone())
    }

    async fn get_create_time_sec(&self, user_id: &UserId) -> Result<UnixSeconds, PamlogixError> {
        Ok(self.account_create_times.lock().get(user_id).copied().unwrap_or(0))
    }
}

// Needed for IapValidation/TransactionId to round-trip through the mock's
// HashMap keyed by receipt string without extra plumbing in callers.
impl Default for IapValidation {
    fn default() -> Self {
        Self { transaction_id: TransactionId::from(""), product_id: String::new(), sandbox: true }
    }
}
