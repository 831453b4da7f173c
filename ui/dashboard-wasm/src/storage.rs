use anyhow::{Result, anyhow};
use gloo_storage::{LocalStorage, Storage};
use idf_api_types::TransportKind;
use idf_storage::{HintStore, RECONNECT_HINT_KEY};

/// Reconnect hint kept in `localStorage` under `connectedWallet`, stored as
/// the bare transport name so older "metamask"/"walletconnect" values still
/// parse.
#[derive(Default)]
pub struct LocalStorageHintStore;

impl HintStore for LocalStorageHintStore {
    fn load_hint(&self) -> Result<Option<TransportKind>> {
        let raw = LocalStorage::raw()
            .get_item(RECONNECT_HINT_KEY)
            .map_err(|err| anyhow!("failed to read reconnect hint: {err:?}"))?;
        Ok(raw.as_deref().and_then(TransportKind::parse))
    }

    fn save_hint(&self, kind: TransportKind) -> Result<()> {
        LocalStorage::raw()
            .set_item(RECONNECT_HINT_KEY, kind.as_str())
            .map_err(|err| anyhow!("failed to save reconnect hint: {err:?}"))
    }

    fn clear_hint(&self) -> Result<()> {
        LocalStorage::delete(RECONNECT_HINT_KEY);
        Ok(())
    }
}
