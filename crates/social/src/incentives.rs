//! The incentives engine: sender-created invite/gift codes with bounded
//! concurrent issuance and bounded claiming (`spec.md` §3 "Incentive",
//! §4.9).

use crate::config::IncentivesConfig;
use crate::errors;
use crate::state::UserIncentives;
use async_trait::async_trait;
use pamlogix_core::{
    internal, EconomyApi, Incentive, PamlogixError, PamlogixSystem, Reward, SystemType, UserId,
};
use pamlogix_host::{Accounts, Clock, DynHost, Storage};
use parking_lot::RwLock;
use rand::Rng;
use std::collections::HashMap;
use std::sync::Arc;

const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 8;
const CODE_GENERATION_ATTEMPTS: usize = 5;

type ConfigSource = Box<dyn Fn() -> IncentivesConfig + Send + Sync>;

pub struct IncentivesEngine {
    host: DynHost,
    base_config: IncentivesConfig,
    config_source: RwLock<Option<ConfigSource>>,
    registry: RwLock<Option<Arc<dyn pamlogix_core::Pamlogix>>>,
}

impl IncentivesEngine {
    pub fn new(host: DynHost, config: IncentivesConfig) -> Arc<Self> {
        Arc::new(Self { host, base_config: config, config_source: RwLock::new(None), registry: RwLock::new(None) })
    }

    pub fn set_config_source(&self, f: impl Fn() -> IncentivesConfig + Send + Sync + 'static) {
        *self.config_source.write() = Some(Box::new(f));
    }

    fn config(&self) -> IncentivesConfig {
        match self.config_source.read().as_ref() {
            Some(f) => f(),
            None => self.base_config.clone(),
        }
    }

    async fn economy(&self) -> Option<Arc<dyn EconomyApi>> {
        self.registry.read().clone().and_then(|r| r.get_economy())
    }

    async fn read_incentive(&self, code: &str) -> Result<Option<Incentive>, PamlogixError> {
        match self.host.read("incentives", code, None).await? {
            Some(record) => Ok(Some(
                serde_json::from_str(&record.value).map_err(|e| errors::state_corrupt(e.to_string()))?,
            )),
            None => Ok(None),
        }
    }

    async fn write_incentive(&self, incentive: &Incentive) -> Result<(), PamlogixError> {
        let value = serde_json::to_string(incentive).map_err(|e| errors::state_corrupt(e.to_string()))?;
        self.host.write("incentives", &incentive.code, None, value, None).await?;
        Ok(())
    }

    async fn delete_incentive(&self, code: &str) -> Result<(), PamlogixError> {
        self.host.delete("incentives", code, None).await
    }

    async fn read_user_index(&self, user_id: &UserId) -> Result<UserIncentives, PamlogixError> {
        match self.host.read("incentives", "user_index", Some(user_id)).await? {
            Some(record) => serde_json::from_str(&record.value).map_err(|e| errors::state_corrupt(e.to_string())),
            None => Ok(UserIncentives::default()),
        }
    }

    async fn write_user_index(&self, user_id: &UserId, index: &UserIncentives) -> Result<(), PamlogixError> {
        let value = serde_json::to_string(index).map_err(|e| errors::state_corrupt(e.to_string()))?;
        self.host.write("incentives", "user_index", Some(user_id), value, None).await?;
        Ok(())
    }

    async fn read_global_claims(&self, config_id: &str) -> Result<u32, PamlogixError> {
        let key = format!("global_claims_{config_id}");
        match self.host.read("incentives", &key, None).await? {
            Some(record) => record.value.parse().map_err(|_| errors::state_corrupt("global claims counter corrupt")),
            None => Ok(0),
        }
    }

    async fn write_global_claims(&self, config_id: &str, count: u32) -> Result<(), PamlogixError> {
        let key = format!("global_claims_{config_id}");
        self.host.write("incentives", &key, None, count.to_string(), None).await?;
        Ok(())
    }

    async fn generate_code(&self) -> Result<String, PamlogixError> {
        for _ in 0..CODE_GENERATION_ATTEMPTS {
            let candidate: String = {
                let mut rng = rand::thread_rng();
                (0..CODE_LEN).map(|_| CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())] as char).collect()
            };
            if self.read_incentive(&candidate).await?.is_none() {
                return Ok(candidate);
            }
        }
        Err(internal("IncentiveCodeExhausted", "could not generate a unique incentive code"))
    }
}

/// Full public surface named in `spec.md` §4.9.
#[async_trait]
pub trait IncentivesSystem: Send + Sync {
    async fn sender_create(
        &self,
        user_id: &UserId,
        config_id: &str,
        recipient_ids: Vec<UserId>,
    ) -> Result<Incentive, PamlogixError>;

    async fn sender_list(&self, user_id: &UserId) -> Result<Vec<Incentive>, PamlogixError>;

    async fn sender_delete(&self, user_id: &UserId, code: &str) -> Result<(), PamlogixError>;

    async fn recipient_get(&self, code: &str) -> Result<Incentive, PamlogixError>;

    async fn recipient_claim(&self, user_id: &UserId, code: &str) -> Result<Reward, PamlogixError>;
}

#[async_trait]
impl IncentivesSystem for IncentivesEngine {
    async fn sender_create(
        &self,
        user_id: &UserId,
        config_id: &str,
        recipient_ids: Vec<UserId>,
    ) -> Result<Incentive, PamlogixError> {
        let config = self.config();
        let cfg = config.incentives.get(config_id).ok_or_else(|| errors::unknown_incentive_config(config_id))?;

        let mut index = self.read_user_index(user_id).await?;
        if cfg.max_concurrent > 0 {
            let mut active = 0u32;
            for code in &index.sent_codes {
                if let Some(existing) = self.read_incentive(code).await? {
                    active += 1;
                    let _ = existing;
                }
            }
            if active >= cfg.max_concurrent {
                return Err(errors::too_many_concurrent(config_id));
            }
        }

        let now = self.host.now_unix_sec();
        let code = self.generate_code().await?;
        let incentive = Incentive {
            code: code.clone(),
            id: code.clone().into(),
            creator_user_id: user_id.clone(),
            config_id: config_id.to_string(),
            incentive_type: Some(cfg.incentive_type),
            expiry_time_sec: if cfg.expiry_sec > 0 { now + cfg.expiry_sec } else { 0 },
            max_claims: cfg.max_claims,
            claims: HashMap::new(),
            unclaimed_recipients: recipient_ids,
            sender_reward: Some(cfg.sender_reward.clone()).filter(|r| r != &Default::default()),
            recipient_reward: Some(cfg.recipient_reward.clone()).filter(|r| r != &Default::default()),
        };
        self.write_incentive(&incentive).await?;
        index.sent_codes.push(code);
        self.write_user_index(user_id, &index).await?;
        Ok(incentive)
    }

    async fn sender_list(&self, user_id: &UserId) -> Result<Vec<Incentive>, PamlogixError> {
        let index = self.read_user_index(user_id).await?;
        let mut out = Vec::with_capacity(index.sent_codes.len());
        for code in &index.sent_codes {
            if let Some(incentive) = self.read_incentive(code).await? {
                out.push(incentive);
            }
        }
        Ok(out)
    }

    async fn sender_delete(&self, user_id: &UserId, code: &str) -> Result<(), PamlogixError> {
        let incentive = self.read_incentive(code).await?.ok_or_else(|| errors::unknown_incentive_code(code))?;
        if &incentive.creator_user_id != user_id {
            return Err(errors::not_owner(code));
        }
        if !incentive.claims.is_empty() {
            return Err(errors::has_claims(code));
        }
        self.delete_incentive(code).await?;
        let mut index = self.read_user_index(user_id).await?;
        index.sent_codes.retain(|c| c != code);
        self.write_user_index(user_id, &index).await?;
        Ok(())
    }

    async fn recipient_get(&self, code: &str) -> Result<Incentive, PamlogixError> {
        self.read_incentive(code).await?.ok_or_else(|| errors::unknown_incentive_code(code))
    }

    async fn recipient_claim(&self, user_id: &UserId, code: &str) -> Result<Reward, PamlogixError> {
        let config = self.config();
        let mut incentive = self.read_incentive(code).await?.ok_or_else(|| errors::unknown_incentive_code(code))?;
        let cfg = config
            .incentives
            .get(&incentive.config_id)
            .ok_or_else(|| errors::unknown_incentive_config(&incentive.config_id))?;

        if &incentive.creator_user_id == user_id {
            return Err(errors::self_claim(code));
        }
        let now = self.host.now_unix_sec();
        if incentive.expiry_time_sec > 0 && now > incentive.expiry_time_sec {
            return Err(errors::expired(code));
        }
        if incentive.claims.contains_key(user_id.as_str()) {
            return Err(errors::already_claimed(code));
        }
        if incentive.max_claims > 0 && incentive.claims.len() as u32 >= incentive.max_claims {
            return Err(errors::max_claims_reached(code));
        }
        if !incentive.unclaimed_recipients.is_empty() && !incentive.unclaimed_recipients.contains(user_id) {
            return Err(errors::not_owner(code));
        }
        if cfg.max_recipient_age_sec > 0 {
            let create_time = self.host.get_create_time_sec(user_id).await?;
            if create_time > 0 && now - create_time < cfg.max_recipient_age_sec {
                return Err(errors::recipient_too_new(code));
            }
        }

        let config_id = incentive.config_id.clone();
        if cfg.max_global_claims > 0 {
            let claims_so_far = self.read_global_claims(&config_id).await?;
            if claims_so_far >= cfg.max_global_claims {
                return Err(errors::max_global_claims_reached(&config_id));
            }
        }

        let economy = self.economy().await.ok_or_else(errors::economy_unavailable)?;

        let recipient_reward = match &incentive.recipient_reward {
            Some(reward_config) => {
                let reward = economy.reward_roll(user_id, reward_config).await?;
                economy.reward_grant(user_id, reward.clone(), HashMap::new(), false).await?;
                reward
            }
            None => Reward::empty(now),
        };
        if let Some(sender_reward_config) = &incentive.sender_reward {
            let sender_reward = economy.reward_roll(&incentive.creator_user_id, sender_reward_config).await?;
            economy.reward_grant(&incentive.creator_user_id, sender_reward, HashMap::new(), false).await?;
        }

        incentive.claims.insert(user_id.0.clone(), now);
        incentive.unclaimed_recipients.retain(|r| r != user_id);
        self.write_incentive(&incentive).await?;

        if cfg.max_global_claims > 0 {
            let claims_so_far = self.read_global_claims(&config_id).await?;
            self.write_global_claims(&config_id, claims_so_far + 1).await?;
        }

        let mut recipient_index = self.read_user_index(user_id).await?;
        recipient_index.claimed_codes.push(code.to_string());
        self.write_user_index(user_id, &recipient_index).await?;

        Ok(recipient_reward)
    }
}

impl PamlogixSystem for IncentivesEngine {
    fn system_type(&self) -> SystemType {
        SystemType::Incentives
    }

    fn set_pamlogix(&self, registry: Arc<dyn pamlogix_core::Pamlogix>) {
        *self.registry.write() = Some(registry);
    }
}

impl std::fmt::Debug for IncentivesEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IncentivesEngine").finish_non_exhaustive()
    }
}
