//! IAP receipt validation (`spec.md` §6 "IAP"). Only Apple and Google are
//! named explicitly in `spec.md` §4.2 ("Apple/Google/Facebook/Discord");
//! Facebook and Discord are carried through as store variants on the same
//! trait rather than separate traits, since the validation shape (receipt
//! in, transaction id + product id + environment out) is identical.

use async_trait::async_trait;
use pamlogix_core::{PamlogixError, TransactionId, UserId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IapStore {
    Apple,
    Google,
    Facebook,
    Discord,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IapValidation {
    pub transaction_id: TransactionId,
    pub product_id: String,
    pub sandbox: bool,
}

#[async_trait]
pub trait Iap: Send + Sync {
    async fn validate_receipt(
        &self,
        store: IapStore,
        user_id: &UserId,
        receipt: &str,
    ) -> Result<IapValidation, PamlogixError>;
}
