//! # Módulo API
//!
//! Rutas y controladores de la API REST.
//!
//! ## Módulos principales
//!
//! - [`booking`] - Superficie pública (vista del día, stream en vivo, reclamo de horas)
//! - [`admin`] - Panel de administración (sesión, altas manuales, bloqueos)
//! - [`errors`] - Manejo de errores de la aplicación

pub mod admin;
pub mod booking;
pub mod errors;

// Re-exportar tipos comunes para facilitar su uso
pub use errors::{AppError, AppResult, ErrorResponse};

use actix_web::web;

/// Configura todas las rutas de la API
///
/// ## Rutas configuradas
///
/// - `/schedule/*`, `/appointments` - Ver [`booking::routes`]
/// - `/admin/*` - Ver [`admin::routes`]
///
/// # Ejemplo
///
/// ```no_run
/// use actix_web::App;
/// use barberbook_reservation::api;
///
/// let app = App::new().configure(api::init_routes);
/// ```
pub fn init_routes(cfg: &mut web::ServiceConfig) {
    booking::routes(cfg);
    admin::routes(cfg);
}
