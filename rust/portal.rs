use std::sync::Arc;

use crate::api::recycle_bin::RecycleBinView;
use crate::client::ApiClient;
use crate::config::Config;
use crate::error::PortalResult;
use crate::models::Role;
use crate::router::{Navigation, Navigator, Route};
use crate::session::SessionStore;
use crate::transport::{HttpTransport, Transport};
use crate::workflow::{ResourceKind, Workflow};

/// Session store, navigator and API client wired together.
pub struct Portal {
    pub session: Arc<SessionStore>,
    pub navigator: Arc<Navigator>,
    pub client: ApiClient,
}

impl Portal {
    pub fn new(transport: Arc<dyn Transport>, session: Arc<SessionStore>) -> Self {
        let navigator = Arc::new(Navigator::new(session.clone()));
        let client = ApiClient::new(transport, session.clone(), navigator.clone());
        Self {
            session,
            navigator,
            client,
        }
    }

    pub fn connect(config: &Config) -> PortalResult<Self> {
        let session = Arc::new(SessionStore::open(&config.session_path)?);
        let transport = Arc::new(HttpTransport::new(config)?);
        Ok(Self::new(transport, session))
    }

    pub fn open(&self, path: &str) -> Navigation {
        self.navigator.navigate(path)
    }

    /// Navigates to `path` and mounts a resource workflow there. A guard
    /// redirect comes back as `Err` and nothing is mounted. So does a path
    /// that renders some other view than the one `R` is managed from.
    pub fn mount<R: ResourceKind>(&self, path: &str) -> Result<Workflow<R>, Navigation> {
        let navigation = self.open(path);
        match (&navigation, self.session.role()) {
            (Navigation::Render(route), Some(role)) if route.required_role() == Some(role) => {
                if route.path() != resource_path::<R>(role) {
                    tracing::warn!(kind = R::TYPE.as_str(), route = %route, "Resource not managed from this view");
                    return Err(Navigation::Render(route.clone()));
                }
                Ok(Workflow::mount(self.client.clone(), role))
            }
            (Navigation::Render(route), _) => {
                // not a gated resource view, or the role changed underneath
                self.navigator.redirect_to_login();
                Err(Navigation::Redirect {
                    from: route.clone(),
                    to: Route::Login,
                })
            }
            (Navigation::Redirect { from, to }, _) => Err(Navigation::Redirect {
                from: from.clone(),
                to: to.clone(),
            }),
        }
    }

    /// Mounts `R` on the current role's view for it.
    pub fn mount_resource<R: ResourceKind>(&self) -> Result<Workflow<R>, Navigation> {
        let role = self.session.role().unwrap_or(Role::Student);
        self.mount::<R>(&resource_path::<R>(role))
    }

    pub fn mount_recycle_bin(&self) -> Result<RecycleBinView, Navigation> {
        let navigation = self.open("/admin/recycle-bin");
        match navigation {
            Navigation::Render(_) => Ok(RecycleBinView::mount(self.client.clone())),
            redirect => Err(redirect),
        }
    }
}

pub fn resource_path<R: ResourceKind>(role: Role) -> String {
    format!("{}/{}", role.home_path(), R::VIEW)
}
