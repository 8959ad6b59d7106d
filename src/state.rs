//! Estado compartido del servidor.

use std::sync::Arc;

use crate::auth::SessionStore;
use crate::config::AppConfig;
use crate::db::Registry;

/// Lo que todo handler necesita: el registro, las sesiones del panel y la
/// configuración. Se inyecta como `web::Data<AppState>`.
pub struct AppState {
    pub registry: Arc<dyn Registry>,
    pub sessions: SessionStore,
    pub config: AppConfig,
}
