use once_cell::sync::Lazy;
use regex::Regex;

use crate::client::ApiClient;
use crate::error::{PortalError, PortalResult, ValidationError};
use crate::models::{Student, StudentOption};
use crate::prompt::Prompt;
use crate::transport::{path_segment, ApiRequest, Attachment, MultipartForm};
use crate::workflow::require;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));
static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[0-9][0-9 \-]{6,14}[0-9]$").expect("valid phone regex"));

#[derive(Debug, Clone, Default)]
pub struct NewStudent {
    pub user_id: String,
    pub password: String,
    pub name: String,
    pub class_name: String,
    pub batch: String,
    pub time_slot: String,
    pub school: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    pub status: String,
    pub profile_photo: Option<Attachment>,
}

impl NewStudent {
    pub fn build_form(&self) -> Result<MultipartForm, ValidationError> {
        require(&self.user_id, "userId")?;
        require(&self.password, "password")?;
        require(&self.name, "name")?;

        let email = self.email.trim();
        if !email.is_empty() && !EMAIL_RE.is_match(email) {
            return Err(ValidationError::Invalid(format!("'{}' is not a valid email", email)));
        }
        let phone = self.phone.trim();
        if !phone.is_empty() && !PHONE_RE.is_match(phone) {
            return Err(ValidationError::Invalid(format!(
                "'{}' is not a valid phone number",
                phone
            )));
        }

        let status = if self.status.trim().is_empty() {
            "active"
        } else {
            self.status.trim()
        };

        Ok(MultipartForm::new()
            .text("userId", self.user_id.trim())
            .text("password", self.password.as_str())
            .text("name", self.name.trim())
            .text_opt("className", Some(self.class_name.as_str()))
            .text_opt("batch", Some(self.batch.as_str()))
            .text_opt("timeSlot", Some(self.time_slot.as_str()))
            .text_opt("school", Some(self.school.as_str()))
            .text_opt("phone", Some(phone))
            .text_opt("email", Some(email))
            .text_opt("address", Some(self.address.as_str()))
            .text("status", status)
            .file_opt("profilePhoto", self.profile_photo.clone()))
    }
}

pub async fn list(client: &ApiClient) -> PortalResult<Vec<Student>> {
    let students: Option<Vec<Student>> = client.fetch(ApiRequest::get("students")).await?;
    Ok(students.unwrap_or_default())
}

/// Picker entries for STUDENT-targeted resources.
pub async fn options(client: &ApiClient) -> PortalResult<Vec<StudentOption>> {
    let options: Option<Vec<StudentOption>> =
        client.fetch(ApiRequest::get("students/dropdown")).await?;
    Ok(options.unwrap_or_default())
}

pub async fn create(client: &ApiClient, student: &NewStudent) -> PortalResult<()> {
    let form = student.build_form()?;
    client
        .perform(ApiRequest::post("students").multipart(form))
        .await?;
    tracing::info!(user_id = student.user_id.trim(), "Student created");
    Ok(())
}

/// Returns `false` when the user declined.
pub async fn deactivate(client: &ApiClient, id: &str, prompt: &dyn Prompt) -> PortalResult<bool> {
    let segment = path_segment(id)?;
    if !prompt.confirm("Deactivate this student?") {
        return Ok(false);
    }
    client
        .perform(ApiRequest::patch(format!("students/deactivate/{}", segment)))
        .await?;
    tracing::info!(id, "Student deactivated");
    Ok(true)
}

pub async fn profile(client: &ApiClient) -> PortalResult<Student> {
    client.fetch(ApiRequest::get("students/profile")).await
}

/// Student self-service update: new password, new photo, or both.
pub async fn update_profile(
    client: &ApiClient,
    password: Option<&str>,
    photo: Option<Attachment>,
) -> PortalResult<()> {
    let password = password.map(str::trim).filter(|p| !p.is_empty());
    if password.is_none() && photo.is_none() {
        return Err(PortalError::Validation(ValidationError::Invalid(
            "Nothing to update".to_string(),
        )));
    }
    let form = MultipartForm::new()
        .text_opt("password", password)
        .file_opt("photo", photo);
    client
        .perform(ApiRequest::patch("students/profile").multipart(form))
        .await?;
    tracing::info!("Profile updated");
    Ok(())
}
