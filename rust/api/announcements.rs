use crate::error::ValidationError;
use crate::models::{Announcement, ResourceType, Role, Target, TargetType};
use crate::transport::{ApiRequest, Attachment, MultipartForm};
use crate::workflow::{require, ResourceKind};

pub struct Announcements;

#[derive(Debug, Clone, Default)]
pub struct AnnouncementDraft {
    pub title: String,
    pub message: String,
    pub target_type: TargetType,
    pub target_value: String,
    pub attachment: Option<Attachment>,
}

impl ResourceKind for Announcements {
    type Item = Announcement;
    type Draft = AnnouncementDraft;

    const TYPE: ResourceType = ResourceType::Announcement;
    const VIEW: &'static str = "announcements";
    const CREATE_PATH: &'static str = "announcements";
    const EMPTY_MESSAGE: &'static str = "No announcements yet.";
    const DELETE_PROMPT: &'static str = "Move announcement to recycle bin?";

    fn list_path(role: Role) -> &'static str {
        match role {
            Role::Admin => "announcements/admin",
            Role::Student => "announcements/student",
        }
    }

    fn delete_request(id: &str) -> ApiRequest {
        ApiRequest::delete(format!("announcements/{}", id))
    }

    fn build_form(draft: &AnnouncementDraft) -> Result<MultipartForm, ValidationError> {
        require(&draft.title, "title")?;
        require(&draft.message, "message")?;
        let target = Target::from_parts(draft.target_type, Some(draft.target_value.as_str()))?;

        Ok(MultipartForm::new()
            .text("title", draft.title.trim())
            .text("message", draft.message.trim())
            .text("targetType", target.kind().as_str())
            .text_opt("targetValue", target.value())
            .file_opt("attachment", draft.attachment.clone()))
    }

    fn item_id(item: &Announcement) -> &str {
        &item.id
    }
}
