//! Typed document access over store transactions.
//!
//! Bridges the byte-oriented store and the domain documents: each load
//! decodes postcard bytes and maps an absent key to the matching `NotFound`
//! error, each store encodes and stages the document. Codec failures are
//! wrapped as [`CoreError::Serialization`].
//!
//! [`CoreError::Serialization`]: clearstream_types::CoreError

use clearstream_store::{tables, TxRead, WriteTransaction};
use clearstream_types::{
    codec,
    error::{InternalSnafu, SerializationSnafu},
    snowflake, Campaign, CampaignId, CoreError, ItemId, Order, OrderId, Report, ReportId, Result,
    StoreItem, User, UserId,
};

/// Generates a fresh Snowflake identifier for a new document.
pub fn new_id() -> Result<i64> {
    snowflake::generate().map_err(|e| InternalSnafu { message: e.to_string() }.build())
}

fn decode_doc<T: serde::de::DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    codec::decode(bytes).map_err(|e| SerializationSnafu { message: e.to_string() }.build())
}

fn encode_doc<T: serde::Serialize>(value: &T) -> Result<Vec<u8>> {
    codec::encode(value).map_err(|e| SerializationSnafu { message: e.to_string() }.build())
}

/// Loads a user, or `UserNotFound`.
pub fn load_user<R: TxRead>(txn: &R, user_id: UserId) -> Result<User> {
    let bytes = txn
        .get::<tables::Users>(user_id.value())
        .ok_or(CoreError::UserNotFound { user_id })?;
    decode_doc(&bytes)
}

/// Stages a user document write.
pub fn store_user(txn: &mut WriteTransaction<'_>, user: &User) -> Result<()> {
    txn.insert::<tables::Users>(user.id.value(), encode_doc(user)?);
    Ok(())
}

/// Loads a campaign, or `CampaignNotFound`.
pub fn load_campaign<R: TxRead>(txn: &R, campaign_id: CampaignId) -> Result<Campaign> {
    let bytes = txn
        .get::<tables::Campaigns>(campaign_id.value())
        .ok_or(CoreError::CampaignNotFound { campaign_id })?;
    decode_doc(&bytes)
}

/// Stages a campaign document write.
pub fn store_campaign(txn: &mut WriteTransaction<'_>, campaign: &Campaign) -> Result<()> {
    txn.insert::<tables::Campaigns>(campaign.id.value(), encode_doc(campaign)?);
    Ok(())
}

/// Stages a campaign document removal.
pub fn remove_campaign(txn: &mut WriteTransaction<'_>, campaign_id: CampaignId) {
    txn.remove::<tables::Campaigns>(campaign_id.value());
}

/// All campaigns in ascending id order.
pub fn scan_campaigns<R: TxRead>(txn: &R) -> Result<Vec<Campaign>> {
    txn.scan::<tables::Campaigns>()
        .into_iter()
        .map(|(_, bytes)| decode_doc(&bytes))
        .collect()
}

/// Loads an order, or `OrderNotFound`.
pub fn load_order<R: TxRead>(txn: &R, order_id: OrderId) -> Result<Order> {
    let bytes = txn
        .get::<tables::Orders>(order_id.value())
        .ok_or(CoreError::OrderNotFound { order_id })?;
    decode_doc(&bytes)
}

/// Stages an order document write.
pub fn store_order(txn: &mut WriteTransaction<'_>, order: &Order) -> Result<()> {
    txn.insert::<tables::Orders>(order.id.value(), encode_doc(order)?);
    Ok(())
}

/// Loads a store item, or `ItemNotFound`.
pub fn load_item<R: TxRead>(txn: &R, item_id: ItemId) -> Result<StoreItem> {
    let bytes = txn
        .get::<tables::StoreItems>(item_id.value())
        .ok_or(CoreError::ItemNotFound { item_id })?;
    decode_doc(&bytes)
}

/// Stages a store item document write.
pub fn store_item(txn: &mut WriteTransaction<'_>, item: &StoreItem) -> Result<()> {
    txn.insert::<tables::StoreItems>(item.id.value(), encode_doc(item)?);
    Ok(())
}

/// Loads a report, or `ReportNotFound`.
pub fn load_report<R: TxRead>(txn: &R, report_id: ReportId) -> Result<Report> {
    let bytes = txn
        .get::<tables::Reports>(report_id.value())
        .ok_or(CoreError::ReportNotFound { report_id })?;
    decode_doc(&bytes)
}

/// Stages a report document write.
pub fn store_report(txn: &mut WriteTransaction<'_>, report: &Report) -> Result<()> {
    txn.insert::<tables::Reports>(report.id.value(), encode_doc(report)?);
    Ok(())
}
