use crate::error::{PortalResult, ValidationError};
use crate::models::{Homework, ResourceType, Role, Target, TargetType};
use crate::transport::{path_segment, ApiRequest, Attachment, MultipartForm};
use crate::workflow::{require, require_date, ResourceKind, Workflow};

pub struct HomeworkAssignments;

#[derive(Debug, Clone, Default)]
pub struct HomeworkDraft {
    pub title: String,
    pub description: String,
    pub due_date: String,
    pub target_type: TargetType,
    pub target_value: String,
    pub file: Option<Attachment>,
}

impl ResourceKind for HomeworkAssignments {
    type Item = Homework;
    type Draft = HomeworkDraft;

    const TYPE: ResourceType = ResourceType::Homework;
    const VIEW: &'static str = "homework";
    const CREATE_PATH: &'static str = "homework";
    const EMPTY_MESSAGE: &'static str = "No homework assigned yet.";
    const DELETE_PROMPT: &'static str = "Move homework to recycle bin?";

    fn list_path(role: Role) -> &'static str {
        match role {
            Role::Admin => "homework/admin",
            Role::Student => "homework/student",
        }
    }

    fn delete_request(id: &str) -> ApiRequest {
        ApiRequest::delete(format!("homework/{}", id))
    }

    fn build_form(draft: &HomeworkDraft) -> Result<MultipartForm, ValidationError> {
        require(&draft.title, "title")?;
        require(&draft.description, "description")?;
        require_date(&draft.due_date, "dueDate")?;
        let target = Target::from_parts(draft.target_type, Some(draft.target_value.as_str()))?;

        Ok(MultipartForm::new()
            .text("title", draft.title.trim())
            .text("description", draft.description.trim())
            .text("dueDate", draft.due_date.trim())
            .text("targetType", target.kind().as_str())
            .text_opt("targetValue", target.value())
            .file_opt("file", draft.file.clone()))
    }

    fn item_id(item: &Homework) -> &str {
        &item.id
    }
}

impl Workflow<HomeworkAssignments> {
    /// Student hand-in for one assignment. The file is mandatory.
    pub async fn submit_work(&mut self, id: &str, file: Option<Attachment>) -> PortalResult<()> {
        let file = match file {
            Some(file) => file,
            None => {
                let err = ValidationError::Invalid("Please select a file".to_string());
                return Err(err.into());
            }
        };
        let request = ApiRequest::post(format!("homework/submit/{}", path_segment(id)?))
            .multipart(MultipartForm::new().file("file", file));
        self.run_mutation(request, "Homework submitted").await?;
        tracing::info!(id, "Homework submitted");
        Ok(())
    }
}
