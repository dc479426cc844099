use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Register,
    Dashboard,
    Profile,
    Settings,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Register => "/register",
            Self::Dashboard => "/dashboard",
            Self::Profile => "/profile",
            Self::Settings => "/settings",
        }
    }
}

/// Full client-side navigation, implemented by the UI shell.
pub trait Navigator: Send + Sync {
    fn redirect(&self, route: Route);
}

/// Navigator for headless use: records the redirect in the log only.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNavigator;

impl Navigator for LogNavigator {
    fn redirect(&self, route: Route) {
        info!(route = route.path(), "Redirect requested");
    }
}
