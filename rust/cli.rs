use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::api::announcements::{AnnouncementDraft, Announcements};
use crate::api::homework::{HomeworkAssignments, HomeworkDraft};
use crate::api::recycle_bin::{self, RecycleBinView};
use crate::api::test_papers::{TestDraft, TestPapers};
use crate::api::{auth, dashboard, students};
use crate::config::{parse_base, Config, DEFAULT_SESSION_PATH, DEFAULT_TIMEOUT_SECS};
use crate::error::PortalError;
use crate::models::{ResourceType, Role, TargetType};
use crate::portal::{resource_path, Portal};
use crate::prompt::{Prompt, Scripted, TerminalPrompt};
use crate::render::{render_list, render_notice, RenderContext, RenderItem};
use crate::router::Navigation;
use crate::transport::Attachment;
use crate::workflow::{ListState, ResourceKind, Workflow};

#[derive(Parser, Debug)]
#[command(name = "portal")]
#[command(author, version, about = "Student management portal client", long_about = None)]
pub struct Cli {
    /// Base URL of the portal API
    #[arg(long, env = "PORTAL_API_URL")]
    pub api_url: String,

    /// Base URL for attachment links (defaults to the API URL)
    #[arg(long, env = "PORTAL_FILE_BASE_URL")]
    pub file_base_url: Option<String>,

    /// Where the session is persisted
    #[arg(long, env = "PORTAL_SESSION_PATH", default_value = DEFAULT_SESSION_PATH)]
    pub session_path: String,

    /// HTTP timeout in seconds
    #[arg(long, env = "PORTAL_HTTP_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout: u64,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// Answer yes to confirmation questions
    #[arg(short, long, global = true)]
    pub yes: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in as a student or admin
    Login {
        #[arg(long)]
        user_id: String,
        #[arg(long, env = "PORTAL_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long, value_enum, default_value = "student")]
        role: RoleArg,
    },
    /// Clear the stored session
    Logout,
    /// Show the current session
    Whoami,
    /// Resolve a route through the session guard
    Open { path: String },
    /// Show dashboard metrics for the current role
    Dashboard,
    /// Manage students (admin)
    #[command(subcommand)]
    Students(StudentCommands),
    /// Test papers
    #[command(subcommand)]
    Tests(TestCommands),
    /// Homework
    #[command(subcommand)]
    Homework(HomeworkCommands),
    /// Announcements
    #[command(subcommand)]
    Announcements(AnnouncementCommands),
    /// Soft-deleted items (admin)
    #[command(subcommand)]
    RecycleBin(RecycleBinCommands),
    /// Own profile (student)
    #[command(subcommand)]
    Profile(ProfileCommands),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum RoleArg {
    Student,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(arg: RoleArg) -> Self {
        match arg {
            RoleArg::Student => Role::Student,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum TargetArg {
    All,
    Batch,
    Student,
}

impl From<TargetArg> for TargetType {
    fn from(arg: TargetArg) -> Self {
        match arg {
            TargetArg::All => TargetType::All,
            TargetArg::Batch => TargetType::Batch,
            TargetArg::Student => TargetType::Student,
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Test,
    Homework,
    Announcement,
}

impl From<KindArg> for ResourceType {
    fn from(arg: KindArg) -> Self {
        match arg {
            KindArg::Test => ResourceType::Test,
            KindArg::Homework => ResourceType::Homework,
            KindArg::Announcement => ResourceType::Announcement,
        }
    }
}

#[derive(Args, Debug)]
pub struct TargetOpts {
    /// Audience of the resource
    #[arg(long, value_enum, default_value = "all")]
    pub target: TargetArg,
    /// Batch name or student id when the target is not `all`
    #[arg(long)]
    pub target_value: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum StudentCommands {
    List,
    /// Student picker entries
    Options,
    Add {
        #[arg(long)]
        user_id: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        class_name: Option<String>,
        #[arg(long)]
        batch: Option<String>,
        #[arg(long)]
        time_slot: Option<String>,
        #[arg(long)]
        school: Option<String>,
        #[arg(long)]
        phone: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        address: Option<String>,
        #[arg(long)]
        photo: Option<PathBuf>,
    },
    Deactivate { id: String },
}

#[derive(Subcommand, Debug)]
pub enum TestCommands {
    List,
    Upload {
        #[arg(long)]
        title: String,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long)]
        max_marks: String,
        #[arg(long)]
        pdf: PathBuf,
        #[command(flatten)]
        target: TargetOpts,
        /// Obtained marks, single-student tests only
        #[arg(long)]
        marks: Option<String>,
    },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum HomeworkCommands {
    List,
    Upload {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// YYYY-MM-DD
        #[arg(long)]
        due_date: String,
        #[arg(long)]
        file: Option<PathBuf>,
        #[command(flatten)]
        target: TargetOpts,
    },
    Delete { id: String },
    /// Hand in a homework file (student)
    Submit {
        id: String,
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum AnnouncementCommands {
    List,
    Publish {
        #[arg(long)]
        title: String,
        #[arg(long)]
        message: String,
        #[arg(long)]
        attachment: Option<PathBuf>,
        #[command(flatten)]
        target: TargetOpts,
    },
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum RecycleBinCommands {
    List,
    Restore {
        #[arg(value_enum)]
        kind: KindArg,
        id: String,
    },
    /// Permanently delete an item
    Purge {
        #[arg(value_enum)]
        kind: KindArg,
        id: String,
        /// Must be exactly DELETE
        #[arg(long)]
        confirm: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    Show,
    Update {
        #[arg(long)]
        password: Option<String>,
        #[arg(long)]
        photo: Option<PathBuf>,
    },
}

impl Cli {
    pub fn config(&self) -> Result<Config> {
        let mut config = Config::new(&self.api_url)?;
        if let Some(base) = &self.file_base_url {
            config.file_base_url =
                parse_base(base).context("PORTAL_FILE_BASE_URL is not a valid URL")?;
        }
        config.session_path = self.session_path.clone();
        config.timeout = Duration::from_secs(self.timeout);
        Ok(config)
    }

    fn prompt(&self, typed: Option<&str>) -> Box<dyn Prompt> {
        match (self.yes, typed) {
            (_, Some(text)) => Box::new(Scripted::typed(text)),
            (true, None) => Box::new(Scripted::approve()),
            (false, None) => Box::new(TerminalPrompt),
        }
    }
}

fn attachment(path: Option<&PathBuf>) -> Result<Option<Attachment>> {
    path.map(|p| {
        Attachment::from_path(p).with_context(|| format!("Failed to read {}", p.display()))
    })
    .transpose()
}

fn print_redirect(navigation: &Navigation) {
    if let Navigation::Redirect { from, to } = navigation {
        println!("Access to {} denied. Redirected to {}.", from, to);
        println!("Log in with `portal login` first.");
    }
}

/// Prints session expiry as a redirect and user-facing failures as a notice.
/// Local store errors bubble up.
fn report(err: PortalError) -> Result<()> {
    match err {
        PortalError::SessionExpired => {
            println!("Session expired. Please login again.");
            println!("Redirected to /login.");
            Ok(())
        }
        PortalError::Store(_) => Err(err.into()),
        other => {
            println!("[!!] {}", other);
            Ok(())
        }
    }
}

struct Screen<'a> {
    portal: &'a Portal,
    config: &'a Config,
}

impl<'a> Screen<'a> {
    fn ctx(&self) -> RenderContext<'a> {
        RenderContext {
            file_base: &self.config.file_base_url,
            today: chrono::Local::now().date_naive(),
        }
    }

    fn role(&self) -> Role {
        self.portal.session.role().unwrap_or(Role::Student)
    }

    fn show<T: RenderItem>(&self, title: &str, state: &ListState<T>, empty: &str) {
        println!("{}", render_list(title, state, empty, &self.ctx()));
    }

    fn show_workflow<R: ResourceKind>(&self, workflow: &Workflow<R>)
    where
        R::Item: RenderItem,
    {
        if let Some(notice) = workflow.notice() {
            println!("{}", render_notice(notice));
        }
        self.show(R::TYPE.label(), workflow.state(), R::EMPTY_MESSAGE);
    }

    fn mount<R: ResourceKind>(&self) -> Option<Workflow<R>> {
        match self.portal.mount_resource::<R>() {
            Ok(workflow) => Some(workflow),
            Err(navigation) => {
                print_redirect(&navigation);
                None
            }
        }
    }

    fn mount_admin<R: ResourceKind>(&self) -> Option<Workflow<R>> {
        match self.portal.mount::<R>(&resource_path::<R>(Role::Admin)) {
            Ok(workflow) => Some(workflow),
            Err(navigation) => {
                print_redirect(&navigation);
                None
            }
        }
    }

    async fn list<R: ResourceKind>(&self) -> Result<()>
    where
        R::Item: RenderItem,
    {
        let Some(mut workflow) = self.mount::<R>() else {
            return Ok(());
        };
        let result = workflow.reload().await;
        if let Err(err) = result {
            if !err.is_retriable() {
                return report(err);
            }
        }
        self.show_workflow(&workflow);
        Ok(())
    }

    async fn create<R: ResourceKind>(&self, draft: R::Draft) -> Result<()>
    where
        R::Item: RenderItem,
    {
        let Some(mut workflow) = self.mount_admin::<R>() else {
            return Ok(());
        };
        *workflow.draft_mut() = draft;
        match workflow.submit().await {
            Ok(()) => {
                self.show_workflow(&workflow);
                Ok(())
            }
            Err(err) => report(err),
        }
    }

    async fn soft_delete<R: ResourceKind>(&self, id: &str, prompt: &dyn Prompt) -> Result<()>
    where
        R::Item: RenderItem,
    {
        let Some(mut workflow) = self.mount_admin::<R>() else {
            return Ok(());
        };
        match workflow.soft_delete(id, prompt).await {
            Ok(true) => {
                self.show_workflow(&workflow);
                Ok(())
            }
            Ok(false) => {
                println!("Cancelled.");
                Ok(())
            }
            Err(err) => report(err),
        }
    }

    fn recycle_bin(&self) -> Option<RecycleBinView> {
        match self.portal.mount_recycle_bin() {
            Ok(view) => Some(view),
            Err(navigation) => {
                print_redirect(&navigation);
                None
            }
        }
    }

    fn show_recycle_bin(&self, view: &RecycleBinView) {
        if let Some(notice) = view.notice() {
            println!("{}", render_notice(notice));
        }
        self.show("Recycle Bin", view.state(), recycle_bin::EMPTY_MESSAGE);
    }

    fn guard(&self, path: &str) -> bool {
        let navigation = self.portal.open(path);
        print_redirect(&navigation);
        !navigation.is_redirect()
    }
}

pub async fn run_command(cli: &Cli) -> Result<()> {
    let config = cli.config()?;
    let portal = Portal::connect(&config).context("Failed to open portal session")?;
    let screen = Screen {
        portal: &portal,
        config: &config,
    };

    match &cli.command {
        Commands::Login {
            user_id,
            password,
            role,
        } => match auth::login(&portal.client, user_id, password, (*role).into()).await {
            Ok(navigation) => {
                println!("Logged in. Now at {}.", navigation.route());
                Ok(())
            }
            Err(PortalError::Api { message, .. }) => {
                println!("[!!] {}", message);
                Ok(())
            }
            Err(err) => report(err),
        },
        Commands::Logout => {
            let navigation = auth::logout(&portal.client)?;
            println!("Logged out. Now at {}.", navigation.route());
            Ok(())
        }
        Commands::Whoami => {
            match portal.session.load()? {
                Some(session) => {
                    println!("Role:       {}", session.role);
                    if let Some(id) = &session.student_id {
                        println!("Student ID: {}", id);
                    }
                }
                None => println!("Not logged in."),
            }
            Ok(())
        }
        Commands::Open { path } => {
            match portal.open(path) {
                Navigation::Render(route) => println!("Showing {}", route),
                redirect => print_redirect(&redirect),
            }
            Ok(())
        }
        Commands::Dashboard => {
            let role = screen.role();
            if !screen.guard(role.home_path()) {
                return Ok(());
            }
            match dashboard::fetch(&portal.client, role).await {
                Ok(metrics) => {
                    println!("{}", serde_json::to_string_pretty(&metrics)?);
                    Ok(())
                }
                Err(err) => report(err),
            }
        }
        Commands::Students(cmd) => run_students(cli, &screen, cmd).await,
        Commands::Tests(cmd) => match cmd {
            TestCommands::List => screen.list::<TestPapers>().await,
            TestCommands::Upload {
                title,
                date,
                max_marks,
                pdf,
                target,
                marks,
            } => {
                let draft = TestDraft {
                    title: title.clone(),
                    test_date: date.clone(),
                    max_marks: max_marks.clone(),
                    target_type: target.target.into(),
                    target_value: target.target_value.clone().unwrap_or_default(),
                    obtained_marks: marks.clone().unwrap_or_default(),
                    pdf: attachment(Some(pdf))?,
                };
                screen.create::<TestPapers>(draft).await
            }
            TestCommands::Delete { id } => {
                screen
                    .soft_delete::<TestPapers>(id, cli.prompt(None).as_ref())
                    .await
            }
        },
        Commands::Homework(cmd) => match cmd {
            HomeworkCommands::List => screen.list::<HomeworkAssignments>().await,
            HomeworkCommands::Upload {
                title,
                description,
                due_date,
                file,
                target,
            } => {
                let draft = HomeworkDraft {
                    title: title.clone(),
                    description: description.clone(),
                    due_date: due_date.clone(),
                    target_type: target.target.into(),
                    target_value: target.target_value.clone().unwrap_or_default(),
                    file: attachment(file.as_ref())?,
                };
                screen.create::<HomeworkAssignments>(draft).await
            }
            HomeworkCommands::Delete { id } => {
                screen
                    .soft_delete::<HomeworkAssignments>(id, cli.prompt(None).as_ref())
                    .await
            }
            HomeworkCommands::Submit { id, file } => {
                let Some(mut workflow) = portal
                    .mount::<HomeworkAssignments>(&resource_path::<HomeworkAssignments>(Role::Student))
                    .map_err(|nav| print_redirect(&nav))
                    .ok()
                else {
                    return Ok(());
                };
                match workflow.submit_work(id, attachment(Some(file))?).await {
                    Ok(()) => {
                        screen.show_workflow(&workflow);
                        Ok(())
                    }
                    Err(err) => report(err),
                }
            }
        },
        Commands::Announcements(cmd) => match cmd {
            AnnouncementCommands::List => screen.list::<Announcements>().await,
            AnnouncementCommands::Publish {
                title,
                message,
                attachment: file,
                target,
            } => {
                let draft = AnnouncementDraft {
                    title: title.clone(),
                    message: message.clone(),
                    target_type: target.target.into(),
                    target_value: target.target_value.clone().unwrap_or_default(),
                    attachment: attachment(file.as_ref())?,
                };
                screen.create::<Announcements>(draft).await
            }
            AnnouncementCommands::Delete { id } => {
                screen
                    .soft_delete::<Announcements>(id, cli.prompt(None).as_ref())
                    .await
            }
        },
        Commands::RecycleBin(cmd) => run_recycle_bin(cli, &screen, cmd).await,
        Commands::Profile(cmd) => {
            if !screen.guard("/student/profile") {
                return Ok(());
            }
            let result = match cmd {
                ProfileCommands::Show => students::profile(&portal.client).await.map(|student| {
                    let ctx = screen.ctx();
                    println!("{}", student.render(&ctx).join("\n"));
                }),
                ProfileCommands::Update { password, photo } => {
                    students::update_profile(&portal.client, password.as_deref(), attachment(photo.as_ref())?)
                        .await
                        .map(|()| println!("[OK] Profile updated"))
                }
            };
            result.or_else(report)
        }
    }
}

async fn run_students(cli: &Cli, screen: &Screen<'_>, cmd: &StudentCommands) -> Result<()> {
    if !screen.guard("/admin/students") {
        return Ok(());
    }
    let client = &screen.portal.client;
    let result = match cmd {
        StudentCommands::List => students::list(client).await.map(|list| {
            screen.show("Students", &ListState::from_items(list), "No students found.");
        }),
        StudentCommands::Options => students::options(client).await.map(|options| {
            for option in options {
                println!(
                    "{:<26}  {:<24}  {:<10}  {}",
                    option.id,
                    option.name,
                    option.student_id.as_deref().unwrap_or("-"),
                    option.batch.as_deref().unwrap_or("-")
                );
            }
        }),
        StudentCommands::Add {
            user_id,
            password,
            name,
            class_name,
            batch,
            time_slot,
            school,
            phone,
            email,
            address,
            photo,
        } => {
            let student = students::NewStudent {
                user_id: user_id.clone(),
                password: password.clone(),
                name: name.clone(),
                class_name: class_name.clone().unwrap_or_default(),
                batch: batch.clone().unwrap_or_default(),
                time_slot: time_slot.clone().unwrap_or_default(),
                school: school.clone().unwrap_or_default(),
                phone: phone.clone().unwrap_or_default(),
                email: email.clone().unwrap_or_default(),
                address: address.clone().unwrap_or_default(),
                status: String::new(),
                profile_photo: attachment(photo.as_ref())?,
            };
            students::create(client, &student)
                .await
                .map(|()| println!("[OK] Student {} created", student.user_id))
        }
        StudentCommands::Deactivate { id } => {
            students::deactivate(client, id, cli.prompt(None).as_ref())
                .await
                .map(|done| {
                    if done {
                        println!("[OK] Student {} deactivated", id);
                    } else {
                        println!("Cancelled.");
                    }
                })
        }
    };
    result.or_else(report)
}

async fn run_recycle_bin(cli: &Cli, screen: &Screen<'_>, cmd: &RecycleBinCommands) -> Result<()> {
    let Some(mut view) = screen.recycle_bin() else {
        return Ok(());
    };
    let result = match cmd {
        RecycleBinCommands::List => view.reload().await.map(|()| true),
        RecycleBinCommands::Restore { kind, id } => {
            view.restore((*kind).into(), id, cli.prompt(None).as_ref())
                .await
        }
        RecycleBinCommands::Purge { kind, id, confirm } => {
            let prompt = cli.prompt(confirm.as_deref());
            view.permanent_delete((*kind).into(), id, prompt.as_ref())
                .await
        }
    };
    match result {
        Ok(true) => {
            screen.show_recycle_bin(&view);
            Ok(())
        }
        Ok(false) => {
            println!("Cancelled.");
            Ok(())
        }
        Err(err) if err.is_retriable() => {
            // mutation failed before any listing was fetched
            if let Err(err) = view.load_if_pending().await {
                return report(err);
            }
            screen.show_recycle_bin(&view);
            Ok(())
        }
        Err(err) => report(err),
    }
}
