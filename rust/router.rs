use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use crate::models::Role;
use crate::session::SessionStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentView {
    Dashboard,
    Profile,
    Performance,
    Tests,
    Homework,
    Announcements,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminView {
    Dashboard,
    Students,
    Tests,
    Homework,
    Announcements,
    RecycleBin,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Student(StudentView),
    Admin(AdminView),
    NotFound(String),
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let path = path.split(['?', '#']).next().unwrap_or("");
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match segments.as_slice() {
            [] => Route::Home,
            ["login"] => Route::Login,
            ["student"] => Route::Student(StudentView::Dashboard),
            ["student", "profile"] => Route::Student(StudentView::Profile),
            ["student", "performance"] => Route::Student(StudentView::Performance),
            ["student", "tests"] => Route::Student(StudentView::Tests),
            ["student", "homework"] => Route::Student(StudentView::Homework),
            ["student", "announcements"] => Route::Student(StudentView::Announcements),
            ["admin"] => Route::Admin(AdminView::Dashboard),
            ["admin", "students"] => Route::Admin(AdminView::Students),
            ["admin", "tests"] => Route::Admin(AdminView::Tests),
            ["admin", "homework"] => Route::Admin(AdminView::Homework),
            ["admin", "announcements"] => Route::Admin(AdminView::Announcements),
            ["admin", "recycle-bin"] => Route::Admin(AdminView::RecycleBin),
            _ => Route::NotFound(path.to_string()),
        }
    }

    pub fn required_role(&self) -> Option<Role> {
        match self {
            Route::Student(_) => Some(Role::Student),
            Route::Admin(_) => Some(Role::Admin),
            Route::Home | Route::Login | Route::NotFound(_) => None,
        }
    }

    pub fn path(&self) -> String {
        match self {
            Route::Home => "/".to_string(),
            Route::Login => "/login".to_string(),
            Route::Student(view) => match view {
                StudentView::Dashboard => "/student".to_string(),
                StudentView::Profile => "/student/profile".to_string(),
                StudentView::Performance => "/student/performance".to_string(),
                StudentView::Tests => "/student/tests".to_string(),
                StudentView::Homework => "/student/homework".to_string(),
                StudentView::Announcements => "/student/announcements".to_string(),
            },
            Route::Admin(view) => match view {
                AdminView::Dashboard => "/admin".to_string(),
                AdminView::Students => "/admin/students".to_string(),
                AdminView::Tests => "/admin/tests".to_string(),
                AdminView::Homework => "/admin/homework".to_string(),
                AdminView::Announcements => "/admin/announcements".to_string(),
                AdminView::RecycleBin => "/admin/recycle-bin".to_string(),
            },
            Route::NotFound(path) => path.clone(),
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Granted,
    Redirect,
}

/// Pure guard decision: the subtree renders only for a matching role.
pub fn check_access(current: Option<Role>, required: Role) -> Access {
    match current {
        Some(role) if role == required => Access::Granted,
        _ => Access::Redirect,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Render(Route),
    Redirect { from: Route, to: Route },
}

impl Navigation {
    pub fn route(&self) -> &Route {
        match self {
            Navigation::Render(route) => route,
            Navigation::Redirect { to, .. } => to,
        }
    }

    pub fn is_redirect(&self) -> bool {
        matches!(self, Navigation::Redirect { .. })
    }
}

/// Marks the view a request was started for. Results arriving after the
/// user navigated elsewhere are discarded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewTicket(u64);

/// Holds the current location and applies the guard on every navigation.
/// The guard only reads the stored role; an expired token is noticed when a
/// request comes back unauthorized.
pub struct Navigator {
    session: Arc<SessionStore>,
    current: Mutex<Route>,
    generation: AtomicU64,
}

impl Navigator {
    pub fn new(session: Arc<SessionStore>) -> Self {
        Self {
            session,
            current: Mutex::new(Route::Home),
            generation: AtomicU64::new(0),
        }
    }

    pub fn navigate(&self, path: &str) -> Navigation {
        let route = Route::parse(path);
        let outcome = match route.required_role() {
            Some(required) => match check_access(self.session.role(), required) {
                Access::Granted => Navigation::Render(route),
                Access::Redirect => {
                    tracing::info!(route = %route, "Access denied, redirecting to login");
                    Navigation::Redirect {
                        from: route,
                        to: Route::Login,
                    }
                }
            },
            None => Navigation::Render(route),
        };
        self.set_current(outcome.route().clone());
        outcome
    }

    pub fn redirect_to_login(&self) {
        self.set_current(Route::Login);
    }

    fn set_current(&self, route: Route) {
        let mut current = self.current.lock().unwrap_or_else(|p| p.into_inner());
        *current = route;
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    pub fn current(&self) -> Route {
        self.current.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }

    pub fn ticket(&self) -> ViewTicket {
        ViewTicket(self.generation.load(Ordering::SeqCst))
    }

    pub fn is_current(&self, ticket: ViewTicket) -> bool {
        self.generation.load(Ordering::SeqCst) == ticket.0
    }
}
