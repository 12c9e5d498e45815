use crate::error::ValidationError;
use crate::models::{ResourceType, Role, Target, TargetType, TestPaper};
use crate::transport::{ApiRequest, Attachment, MultipartForm};
use crate::workflow::{require, require_date, ResourceKind};

pub struct TestPapers;

#[derive(Debug, Clone, Default)]
pub struct TestDraft {
    pub title: String,
    pub test_date: String,
    pub max_marks: String,
    pub target_type: TargetType,
    /// Batch name or student id, depending on `target_type`.
    pub target_value: String,
    /// Only meaningful for a single-student test.
    pub obtained_marks: String,
    pub pdf: Option<Attachment>,
}

fn parse_marks(raw: &str, field: &'static str) -> Result<f64, ValidationError> {
    raw.trim()
        .parse::<f64>()
        .map_err(|_| ValidationError::Invalid(format!("{} must be a number", field)))
}

impl ResourceKind for TestPapers {
    type Item = TestPaper;
    type Draft = TestDraft;

    const TYPE: ResourceType = ResourceType::Test;
    const VIEW: &'static str = "tests";
    const CREATE_PATH: &'static str = "tests";
    const EMPTY_MESSAGE: &'static str = "No test papers uploaded yet.";
    const DELETE_PROMPT: &'static str = "Move test to recycle bin?";

    fn list_path(role: Role) -> &'static str {
        match role {
            Role::Admin => "tests/admin",
            Role::Student => "tests/student",
        }
    }

    fn delete_request(id: &str) -> ApiRequest {
        ApiRequest::patch(format!("tests/delete/{}", id))
    }

    fn build_form(draft: &TestDraft) -> Result<MultipartForm, ValidationError> {
        require(&draft.title, "title")?;
        require_date(&draft.test_date, "testDate")?;
        require(&draft.max_marks, "maxMarks")?;
        let pdf = draft.pdf.clone().ok_or(ValidationError::Required("pdf"))?;

        let max_marks = parse_marks(&draft.max_marks, "maxMarks")?;
        if max_marks <= 0.0 {
            return Err(ValidationError::Invalid(
                "Max marks must be greater than 0".to_string(),
            ));
        }

        let target = Target::from_parts(draft.target_type, Some(draft.target_value.as_str()))?;

        let mut form = MultipartForm::new()
            .text("title", draft.title.trim())
            .text("testDate", draft.test_date.trim())
            .text("maxMarks", draft.max_marks.trim())
            .file("pdf", pdf)
            .text("assignedTo", target.kind().as_str());

        match &target {
            Target::All => {}
            Target::Batch(batch) => form = form.text("batch", batch.as_str()),
            Target::Student(student_id) => {
                require(&draft.obtained_marks, "marks")?;
                let obtained = parse_marks(&draft.obtained_marks, "marks")?;
                if obtained > max_marks {
                    return Err(ValidationError::Invalid(
                        "Obtained marks cannot exceed maximum marks".to_string(),
                    ));
                }
                form = form
                    .text("studentId", student_id.as_str())
                    .text("marks", draft.obtained_marks.trim());
            }
        }

        Ok(form)
    }

    fn item_id(item: &TestPaper) -> &str {
        &item.id
    }
}
