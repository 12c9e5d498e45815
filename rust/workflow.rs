use serde::de::DeserializeOwned;

use crate::client::ApiClient;
use crate::error::{PortalResult, ValidationError};
use crate::models::{ResourceType, Role};
use crate::prompt::Prompt;
use crate::router::ViewTicket;
use crate::transport::{path_segment, ApiRequest, MultipartForm};

/// Endpoints and field schema of one attachment-bearing resource.
pub trait ResourceKind: 'static {
    type Item: DeserializeOwned + Clone;
    type Draft: Default + Clone;

    const TYPE: ResourceType;
    /// Last route segment of the view this resource is managed from.
    const VIEW: &'static str;
    const CREATE_PATH: &'static str;
    const EMPTY_MESSAGE: &'static str;
    const DELETE_PROMPT: &'static str;

    fn list_path(role: Role) -> &'static str;

    /// `id` arrives already encoded as a path segment.
    fn delete_request(id: &str) -> ApiRequest;

    /// Checks required and conditional fields and builds the payload.
    fn build_form(draft: &Self::Draft) -> Result<MultipartForm, ValidationError>;

    fn item_id(item: &Self::Item) -> &str;
}

#[derive(Debug, Clone, PartialEq)]
pub enum ListState<T> {
    Loading,
    Populated(Vec<T>),
    Empty,
    Failed(String),
}

impl<T> ListState<T> {
    pub fn from_items(items: Vec<T>) -> Self {
        if items.is_empty() {
            ListState::Empty
        } else {
            ListState::Populated(items)
        }
    }

    pub fn items(&self) -> &[T] {
        match self {
            ListState::Populated(items) => items,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ListState::Loading)
    }
}

/// Dismissible user-facing message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    Success(String),
    Error(String),
}

/// Create, list and soft-delete for one resource kind, bound to the view it
/// was mounted on.
pub struct Workflow<R: ResourceKind> {
    client: ApiClient,
    role: Role,
    ticket: ViewTicket,
    state: ListState<R::Item>,
    draft: R::Draft,
    notice: Option<Notice>,
}

impl<R: ResourceKind> Workflow<R> {
    /// Binds to whatever view is current on the client's navigator.
    pub fn mount(client: ApiClient, role: Role) -> Self {
        let ticket = client.navigator().ticket();
        Self {
            client,
            role,
            ticket,
            state: ListState::Loading,
            draft: R::Draft::default(),
            notice: None,
        }
    }

    pub fn state(&self) -> &ListState<R::Item> {
        &self.state
    }

    pub fn draft(&self) -> &R::Draft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut R::Draft {
        &mut self.draft
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    pub fn is_mounted(&self) -> bool {
        self.client.navigator().is_current(self.ticket)
    }

    pub(crate) fn client(&self) -> &ApiClient {
        &self.client
    }

    pub async fn reload(&mut self) -> PortalResult<()> {
        self.state = ListState::Loading;
        let result = self
            .client
            .fetch::<Option<Vec<R::Item>>>(ApiRequest::get(R::list_path(self.role)))
            .await;

        if !self.is_mounted() {
            tracing::debug!(kind = R::TYPE.as_str(), "View left, discarding list result");
            return result.map(|_| ());
        }

        match result {
            Ok(items) => {
                let items = items.unwrap_or_default();
                tracing::debug!(kind = R::TYPE.as_str(), count = items.len(), "List loaded");
                self.state = ListState::from_items(items);
                Ok(())
            }
            Err(err) => {
                tracing::warn!(kind = R::TYPE.as_str(), error = %err, "List load failed");
                self.state = ListState::Failed(err.to_string());
                Err(err)
            }
        }
    }

    /// Sends the current draft. On success the draft is reset and the list
    /// reloaded; on failure the draft is kept for a retry.
    pub async fn submit(&mut self) -> PortalResult<()> {
        let form = match R::build_form(&self.draft) {
            Ok(form) => form,
            Err(err) => {
                self.notice = Some(Notice::Error(err.to_string()));
                return Err(err.into());
            }
        };

        let request = ApiRequest::post(R::CREATE_PATH).multipart(form);
        if let Err(err) = self.client.perform(request).await {
            tracing::warn!(kind = R::TYPE.as_str(), error = %err, "Submission failed");
            self.notice = Some(Notice::Error(err.to_string()));
            return Err(err);
        }

        tracing::info!(kind = R::TYPE.as_str(), "Resource created");
        self.draft = R::Draft::default();
        self.notice = Some(Notice::Success(format!("{} saved", R::TYPE.label())));
        self.reload_after_mutation().await
    }

    /// Moves an item to the recycle bin after confirmation. Returns `false`
    /// when the user declined.
    pub async fn soft_delete(&mut self, id: &str, prompt: &dyn Prompt) -> PortalResult<bool> {
        let segment = match path_segment(id) {
            Ok(segment) => segment,
            Err(err) => {
                self.notice = Some(Notice::Error(err.to_string()));
                return Err(err.into());
            }
        };
        if !prompt.confirm(R::DELETE_PROMPT) {
            return Ok(false);
        }
        self.run_mutation(R::delete_request(&segment), "Moved to recycle bin")
            .await?;
        tracing::info!(kind = R::TYPE.as_str(), id, "Resource moved to recycle bin");
        Ok(true)
    }

    pub(crate) async fn run_mutation(
        &mut self,
        request: ApiRequest,
        success: &str,
    ) -> PortalResult<()> {
        if let Err(err) = self.client.perform(request).await {
            self.notice = Some(Notice::Error(err.to_string()));
            return Err(err);
        }
        self.notice = Some(Notice::Success(success.to_string()));
        self.reload_after_mutation().await
    }

    /// The mutation already went through; a transient list failure is left in
    /// `ListState::Failed` instead of being reported as a failed mutation.
    async fn reload_after_mutation(&mut self) -> PortalResult<()> {
        match self.reload().await {
            Err(err) if err.is_retriable() => Ok(()),
            other => other,
        }
    }

    pub fn find(&self, id: &str) -> Option<&R::Item> {
        self.state.items().iter().find(|item| R::item_id(item) == id)
    }
}

/// Shared by the three resource schemas.
pub(crate) fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Required(field))
    } else {
        Ok(())
    }
}

pub(crate) fn require_date(value: &str, field: &'static str) -> Result<(), ValidationError> {
    require(value, field)?;
    chrono::NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map(|_| ())
        .map_err(|_| ValidationError::InvalidDate { field })
}
