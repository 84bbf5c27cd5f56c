// BookmarkPro services
// Stateless helpers and adapters: persistence, filtering, crypto, identity, cloud sync, settings.

pub mod cloud_store;
pub mod cloud_sync;
pub mod crypto_service;
pub mod drive_client;
pub mod filter_engine;
pub mod identity;
pub mod link_preview;
pub mod notification_center;
pub mod persistence;
pub mod settings_engine;
