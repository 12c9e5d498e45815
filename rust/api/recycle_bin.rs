use serde_json::json;

use crate::client::ApiClient;
use crate::error::PortalResult;
use crate::models::{RecycleBinEntry, RecycleBinListing, ResourceType};
use crate::prompt::{Prompt, PERMANENT_DELETE_PHRASE};
use crate::router::ViewTicket;
use crate::transport::ApiRequest;
use crate::workflow::{ListState, Notice};

pub const EMPTY_MESSAGE: &str = "Recycle bin is empty.";

pub async fn fetch(client: &ApiClient) -> PortalResult<RecycleBinListing> {
    let listing: Option<RecycleBinListing> = client.fetch(ApiRequest::get("recycle-bin")).await?;
    Ok(listing.unwrap_or_default())
}

fn entry_body(kind: ResourceType, id: &str) -> serde_json::Value {
    json!({ "type": kind.as_str(), "id": id })
}

/// Admin view over soft-deleted items of every kind.
pub struct RecycleBinView {
    client: ApiClient,
    ticket: ViewTicket,
    state: ListState<RecycleBinEntry>,
    notice: Option<Notice>,
}

impl RecycleBinView {
    pub fn mount(client: ApiClient) -> Self {
        let ticket = client.navigator().ticket();
        Self {
            client,
            ticket,
            state: ListState::Loading,
            notice: None,
        }
    }

    pub fn state(&self) -> &ListState<RecycleBinEntry> {
        &self.state
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn entries_of(&self, kind: ResourceType) -> Vec<&RecycleBinEntry> {
        self.state
            .items()
            .iter()
            .filter(|entry| entry.kind == kind)
            .collect()
    }

    pub async fn reload(&mut self) -> PortalResult<()> {
        self.state = ListState::Loading;
        let result = fetch(&self.client).await;
        if !self.client.navigator().is_current(self.ticket) {
            tracing::debug!("Recycle bin view left, discarding result");
            return result.map(|_| ());
        }
        match result {
            Ok(listing) => {
                self.state = ListState::from_items(listing.entries());
                Ok(())
            }
            Err(err) => {
                self.state = ListState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Fetches the listing only if nothing was loaded yet. A transient failure
    /// stays in the view state; expiry and store errors are returned.
    pub async fn load_if_pending(&mut self) -> PortalResult<()> {
        if !self.state.is_loading() {
            return Ok(());
        }
        match self.reload().await {
            Err(err) if err.is_retriable() => Ok(()),
            other => other,
        }
    }

    /// Returns `false` when the user declined.
    pub async fn restore(
        &mut self,
        kind: ResourceType,
        id: &str,
        prompt: &dyn Prompt,
    ) -> PortalResult<bool> {
        if !prompt.confirm("Restore this item?") {
            return Ok(false);
        }
        let request = ApiRequest::patch("recycle-bin/restore").json(entry_body(kind, id));
        self.mutate(request, "Item restored").await?;
        tracing::info!(kind = kind.as_str(), id, "Item restored");
        Ok(true)
    }

    /// Irreversible; the operator must type the confirmation phrase.
    pub async fn permanent_delete(
        &mut self,
        kind: ResourceType,
        id: &str,
        prompt: &dyn Prompt,
    ) -> PortalResult<bool> {
        if !prompt.confirm_text(
            "Permanently delete this item? This cannot be undone.",
            PERMANENT_DELETE_PHRASE,
        ) {
            return Ok(false);
        }
        let request = ApiRequest::delete("recycle-bin/permanent").json(entry_body(kind, id));
        self.mutate(request, "Item permanently deleted").await?;
        tracing::info!(kind = kind.as_str(), id, "Item permanently deleted");
        Ok(true)
    }

    async fn mutate(&mut self, request: ApiRequest, success: &str) -> PortalResult<()> {
        if let Err(err) = self.client.perform(request).await {
            self.notice = Some(Notice::Error(err.to_string()));
            return Err(err);
        }
        self.notice = Some(Notice::Success(success.to_string()));
        match self.reload().await {
            // acknowledged; the failed listing shows in the view state
            Err(err) if err.is_retriable() => Ok(()),
            other => other,
        }
    }
}
