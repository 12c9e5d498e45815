use chrono::NaiveDate;
use url::Url;

use crate::api::files::attachment_link;
use crate::models::{
    Announcement, Homework, HomeworkStatus, RecycleBinEntry, Student, TargetType, TestPaper,
};
use crate::workflow::{ListState, Notice};

pub struct RenderContext<'a> {
    pub file_base: &'a Url,
    pub today: NaiveDate,
}

pub trait RenderItem {
    fn render(&self, ctx: &RenderContext<'_>) -> Vec<String>;
}

pub fn render_list<T: RenderItem>(
    title: &str,
    state: &ListState<T>,
    empty_message: &str,
    ctx: &RenderContext<'_>,
) -> String {
    let mut lines = vec![format!("=== {} ===", title), String::new()];
    match state {
        ListState::Loading => lines.push("Loading...".to_string()),
        ListState::Empty => lines.push(empty_message.to_string()),
        ListState::Failed(err) => {
            lines.push(format!("[!!] Could not load {}: {}", title.to_lowercase(), err));
            lines.push("Run the command again to retry.".to_string());
        }
        ListState::Populated(items) => {
            for (idx, item) in items.iter().enumerate() {
                let mut item_lines = item.render(ctx).into_iter();
                if let Some(first) = item_lines.next() {
                    lines.push(format!("{:>3}. {}", idx + 1, first));
                }
                lines.extend(item_lines.map(|line| format!("     {}", line)));
                lines.push(String::new());
            }
        }
    }
    lines.join("\n")
}

pub fn render_notice(notice: &Notice) -> String {
    match notice {
        Notice::Success(msg) => format!("[OK] {}", msg),
        Notice::Error(msg) => format!("[!!] {}", msg),
    }
}

fn target_label(kind: TargetType, value: Option<&str>) -> String {
    match (kind, value) {
        (TargetType::All, _) => "All Students".to_string(),
        (TargetType::Batch, Some(batch)) => format!("Batch: {}", batch),
        (TargetType::Student, _) => "Specific Student".to_string(),
        (TargetType::Batch, None) => "Batch".to_string(),
    }
}

fn push_link(lines: &mut Vec<String>, label: &str, link: Option<Url>) {
    if let Some(link) = link {
        lines.push(format!("{}: {}", label, link));
    }
}

fn marks(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}

impl RenderItem for TestPaper {
    fn render(&self, ctx: &RenderContext<'_>) -> Vec<String> {
        let mut lines = vec![format!("{}  [{}]", self.title, self.id)];
        lines.push(format!(
            "Test date: {} | Assigned to: {}",
            self.date.as_deref().unwrap_or("-"),
            target_label(self.assigned_to, self.batch.as_deref())
        ));
        if let Some(max) = self.max_marks {
            let obtained = match (self.assigned_to, self.marks) {
                (TargetType::Student, Some(m)) => format!(" | Obtained: {}", marks(m)),
                (TargetType::Student, None) => " | Obtained: Not Evaluated".to_string(),
                _ => String::new(),
            };
            lines.push(format!("Max marks: {}{}", marks(max), obtained));
        }
        push_link(
            &mut lines,
            "Question paper",
            attachment_link(ctx.file_base, self.file.as_ref()),
        );
        lines
    }
}

impl RenderItem for Homework {
    fn render(&self, ctx: &RenderContext<'_>) -> Vec<String> {
        let status = match self.status(ctx.today) {
            HomeworkStatus::Submitted => "Submitted",
            HomeworkStatus::Late => "Late",
            HomeworkStatus::Pending => "Pending",
        };
        let mut lines = vec![format!("{}  [{}] ({})", self.title, self.id, status)];
        if !self.description.is_empty() {
            lines.push(self.description.clone());
        }
        lines.push(format!(
            "Due: {} | Assigned to: {}",
            self.due_date.as_deref().unwrap_or("-"),
            target_label(self.target_type, self.target_value.as_deref())
        ));
        push_link(
            &mut lines,
            "Attachment",
            attachment_link(ctx.file_base, self.file.as_ref()),
        );
        lines
    }
}

impl RenderItem for Announcement {
    fn render(&self, ctx: &RenderContext<'_>) -> Vec<String> {
        let new_marker = if self.is_new { " NEW" } else { "" };
        let mut lines = vec![format!("{}  [{}]{}", self.title, self.id, new_marker)];
        if !self.message.is_empty() {
            lines.push(self.message.clone());
        }
        let date = self
            .date
            .as_deref()
            .or(self.created_at.as_deref())
            .unwrap_or("-");
        lines.push(format!(
            "Date: {} | Audience: {}",
            date,
            target_label(self.target_type, self.target_value.as_deref())
        ));
        push_link(
            &mut lines,
            "Attachment",
            attachment_link(ctx.file_base, self.file.as_ref()),
        );
        lines
    }
}

impl RenderItem for RecycleBinEntry {
    fn render(&self, _ctx: &RenderContext<'_>) -> Vec<String> {
        let deleted = self
            .deleted_at
            .as_deref()
            .and_then(|raw| chrono::DateTime::parse_from_rfc3339(raw).ok())
            .map(|dt| dt.format("%Y-%m-%d").to_string())
            .or_else(|| self.deleted_at.clone())
            .unwrap_or_else(|| "-".to_string());
        vec![
            format!(
                "[{}] {}  ({})",
                self.kind.as_str(),
                self.title.as_deref().unwrap_or("Untitled"),
                self.original_id
            ),
            format!("Deleted: {}", deleted),
        ]
    }
}

impl RenderItem for Student {
    fn render(&self, ctx: &RenderContext<'_>) -> Vec<String> {
        let mut lines = vec![format!(
            "{}  [{}] {}",
            self.name,
            self.user_id.as_deref().unwrap_or(&self.id),
            self.status.as_deref().unwrap_or("active")
        )];
        let details: Vec<String> = [
            ("Class", self.class_name.as_deref()),
            ("Batch", self.batch.as_deref()),
            ("Slot", self.time_slot.as_deref()),
            ("Phone", self.phone.as_deref()),
            ("Email", self.email.as_deref()),
        ]
        .iter()
        .filter_map(|(label, value)| value.map(|v| format!("{}: {}", label, v)))
        .collect();
        if !details.is_empty() {
            lines.push(details.join(" | "));
        }
        push_link(
            &mut lines,
            "Photo",
            attachment_link(ctx.file_base, self.photo.as_ref()),
        );
        lines
    }
}
