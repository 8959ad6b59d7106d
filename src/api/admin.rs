//! # API del panel de administración
//!
//! Mutaciones privilegiadas sobre el registro:
//! - Login/logout y consulta de sesión
//! - Listado crudo de documentos de una fecha
//! - Alta manual de cliente presencial
//! - Corrección de nombre/teléfono, eliminación
//! - Cerrar/abrir la agenda de un día
//!
//! Todas las rutas salvo el login exigen token Bearer de una sesión vigente.
//! La confirmación de acciones destructivas es deber de la vista; acá se
//! ejecuta sin preguntar de nuevo.

use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{AppError, AppResult};
use crate::auth::Session;
use crate::db::{block_id, booking_id, AppointmentRecord, BookingRecord, DayBlockRecord, Registry};
use crate::schedule::validate::{validate_date, validate_slot};
use crate::state::AppState;

/// Teléfono centinela para altas manuales sin número.
const WALK_IN_PHONE: &str = "Manual/Presencial";

#[derive(Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

/// Alta manual de un cliente presencial.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManualAddRequest {
    date: String,
    time: String,
    client_name: String,
    /// Opcional: sin número queda el centinela de presencial
    client_phone: Option<String>,
}

/// Corrección de contacto de una reserva existente.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EditRequest {
    client_name: String,
    client_phone: String,
}

#[derive(Deserialize)]
struct ListQuery {
    /// Fecha a listar (formato YYYY-MM-DD)
    date: String,
}

/// Documento del registro en la forma que consume el panel: mismo contenido
/// que el almacenado, con `id` en vez de `_id`.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RecordResponse {
    #[serde(rename_all = "camelCase")]
    Booking {
        id: String,
        date: String,
        time: String,
        client_name: String,
        client_phone: String,
        is_overtime: bool,
        is_manual: bool,
        created_at: String,
    },
    #[serde(rename_all = "camelCase")]
    DayBlocked {
        id: String,
        date: String,
        created_at: String,
    },
}

impl From<AppointmentRecord> for RecordResponse {
    fn from(record: AppointmentRecord) -> Self {
        match record {
            AppointmentRecord::Booking(b) => RecordResponse::Booking {
                id: b.id,
                date: b.date,
                time: b.time,
                client_name: b.client_name,
                client_phone: b.client_phone,
                is_overtime: b.is_overtime,
                is_manual: b.is_manual,
                created_at: b.created_at,
            },
            AppointmentRecord::DayBlocked(d) => RecordResponse::DayBlocked {
                id: d.id,
                date: d.date,
                created_at: d.created_at,
            },
        }
    }
}

/// Extrae el token Bearer del header Authorization.
///
/// # Errores
/// - `Unauthorized`: header ausente, ilegible o sin el prefijo "Bearer "
fn extract_token(req: &HttpRequest) -> AppResult<String> {
    let auth_header = req
        .headers()
        .get("authorization")
        .ok_or_else(|| AppError::Unauthorized("Falta header Authorization".to_string()))?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AppError::Unauthorized("Header Authorization inválido".to_string()))?;

    let token = auth_str
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::Unauthorized("Formato de token inválido".to_string()))?;

    Ok(token.to_string())
}

/// Valida la sesión del request contra el almacén en proceso.
fn require_session(state: &AppState, req: &HttpRequest) -> AppResult<Session> {
    let token = extract_token(req)?;
    state.sessions.validate(&token)
}

/// Inicia sesión en el panel
///
/// # Respuesta
/// ```json
/// {
///   "accessToken": "uuid-token",
///   "expiresAt": "2025-12-23T20:00:00Z",
///   "message": "Login exitoso"
/// }
/// ```
///
/// # Errores
/// - `401 Unauthorized`: Credenciales incorrectas. El mensaje es el mismo
///   para email y contraseña equivocados, para no delatar cuál falló.
#[post("/admin/login")]
async fn login(
    state: web::Data<AppState>,
    data: web::Json<LoginRequest>,
) -> AppResult<impl Responder> {
    if data.email != state.config.admin_email || data.password != state.config.admin_password {
        return Err(AppError::Unauthorized("Credenciales incorrectas".to_string()));
    }

    let session = state.sessions.create(&data.email);
    tracing::info!(email = %session.email, "Login de administrador");

    Ok(HttpResponse::Ok().json(json!({
        "accessToken": session.token,
        "expiresAt": session.expires_at.to_rfc3339(),
        "message": "Login exitoso"
    })))
}

/// Cierra la sesión actual
///
/// # Errores
/// - `401 Unauthorized`: Token ausente o malformado
#[post("/admin/logout")]
async fn logout(state: web::Data<AppState>, req: HttpRequest) -> AppResult<impl Responder> {
    let token = extract_token(&req)?;
    state.sessions.logout(&token);
    Ok(HttpResponse::Ok().json(json!({ "message": "Sesión cerrada" })))
}

/// Consulta la sesión vigente
///
/// La usa el panel al cargar para decidir si muestra el login o el tablero.
///
/// # Errores
/// - `401 Unauthorized`: Sesión inválida o expirada
#[get("/admin/session")]
async fn current_session(state: web::Data<AppState>, req: HttpRequest) -> AppResult<impl Responder> {
    let session = require_session(&state, &req)?;
    Ok(HttpResponse::Ok().json(json!({
        "email": session.email,
        "createdAt": session.created_at.to_rfc3339(),
        "expiresAt": session.expires_at.to_rfc3339()
    })))
}

/// Lista los documentos crudos de una fecha
///
/// A diferencia de `/schedule/{date}`, acá salen los documentos tal cual
/// (reservas y marcador de bloqueo), sin proyección; el panel aplica la misma
/// partición pendientes/historial que la vista pública.
///
/// # Errores
/// - `400 Bad Request`: Fecha con formato inválido
/// - `401 Unauthorized`: Sesión inválida o expirada
/// - `500 Internal Server Error`: Error de base de datos
#[get("/admin/appointments")]
async fn list_appointments(
    state: web::Data<AppState>,
    query: web::Query<ListQuery>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    require_session(&state, &req)?;
    let date = validate_date(&query.date)?;
    let date_str = date.format("%Y-%m-%d").to_string();

    let records = state.registry.records_for_date(&date_str).await?;
    let results: Vec<RecordResponse> = records.into_iter().map(RecordResponse::from).collect();

    Ok(HttpResponse::Ok().json(results))
}

/// Registra manualmente a un cliente presencial
///
/// Mismo contrato de unicidad que el auto-servicio (reclamo atómico por id),
/// pero sin la rigurosidad de identidad del cliente: basta un nombre no
/// vacío y el teléfono es opcional. Marca `isManual` y calcula `isOvertime`
/// igual que una reserva normal. No pasa por la puerta de día cerrado: el
/// cliente presencial ya está en el local, con agenda cerrada o sin ella.
///
/// # Respuesta
/// ```json
/// { "message": "Agregado correctamente", "id": "2025-12-23-15:00" }
/// ```
///
/// # Errores
/// - `400 Bad Request`: Fecha u hora inválidas, o nombre vacío
/// - `401 Unauthorized`: Sesión inválida o expirada
/// - `409 Conflict`: La hora ya estaba tomada
/// - `500 Internal Server Error`: Error de base de datos
#[post("/admin/appointments")]
async fn manual_add(
    state: web::Data<AppState>,
    data: web::Json<ManualAddRequest>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    require_session(&state, &req)?;

    let date = validate_date(&data.date)?;
    let date_str = date.format("%Y-%m-%d").to_string();
    validate_slot(&state.config.schedule, &data.time)?;

    let client_name = data.client_name.trim();
    if client_name.is_empty() {
        return Err(AppError::validation_field("name", "El nombre es requerido"));
    }

    let client_phone = data
        .client_phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .unwrap_or(WALK_IN_PHONE)
        .to_string();

    let record = BookingRecord {
        id: booking_id(&date_str, &data.time),
        date: date_str,
        time: data.time.clone(),
        client_name: client_name.to_string(),
        client_phone,
        is_overtime: state.config.schedule.is_overtime(&data.time),
        is_manual: true,
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    let id = record.id.clone();

    state.registry.claim_booking(record).await?;
    tracing::info!(id = %id, "Alta manual registrada");

    Ok(HttpResponse::Created().json(json!({
        "message": "Agregado correctamente",
        "id": id
    })))
}

/// Corrige nombre y teléfono de una reserva
///
/// Solo contacto: `date`/`time`/id son inmutables. Mover una reserva de hora
/// es eliminarla y crearla de nuevo.
///
/// # Errores
/// - `400 Bad Request`: Nombre vacío
/// - `401 Unauthorized`: Sesión inválida o expirada
/// - `404 Not Found`: No existe una reserva con ese id
/// - `500 Internal Server Error`: Error de base de datos
#[put("/admin/appointments/{id}")]
async fn edit_appointment(
    state: web::Data<AppState>,
    path: web::Path<String>,
    data: web::Json<EditRequest>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    require_session(&state, &req)?;
    let id = path.into_inner();

    let client_name = data.client_name.trim();
    if client_name.is_empty() {
        return Err(AppError::validation_field("name", "El nombre es requerido"));
    }

    state
        .registry
        .update_booking_contact(&id, client_name, data.client_phone.trim())
        .await?;

    Ok(HttpResponse::Ok().json(json!({
        "message": "Datos actualizados",
        "id": id
    })))
}

/// Elimina un documento del registro
///
/// # Errores
/// - `401 Unauthorized`: Sesión inválida o expirada
/// - `404 Not Found`: No existe un documento con ese id
/// - `500 Internal Server Error`: Error de base de datos
#[delete("/admin/appointments/{id}")]
async fn delete_appointment(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    require_session(&state, &req)?;
    let id = path.into_inner();

    state.registry.delete_record(&id).await?;
    tracing::info!(id = %id, "Documento eliminado");

    Ok(HttpResponse::Ok().json(json!({
        "message": "Eliminado",
        "id": id
    })))
}

/// Cierra o abre la agenda de un día
///
/// Si el marcador `{fecha}-BLOCK` existe lo elimina; si no, lo crea. Tolera
/// carreras entre administradores: perder la carrera en cualquier dirección
/// deja igual el estado definitivo, que es lo que se responde. Cerrar un día
/// nunca borra sus reservas existentes.
///
/// # Respuesta
/// ```json
/// { "blocked": true, "message": "Agenda cerrada para 2025-12-24" }
/// ```
///
/// # Errores
/// - `400 Bad Request`: Fecha con formato inválido
/// - `401 Unauthorized`: Sesión inválida o expirada
/// - `500 Internal Server Error`: Error de base de datos
#[post("/admin/days/{date}/toggle-block")]
async fn toggle_day_block(
    state: web::Data<AppState>,
    path: web::Path<String>,
    req: HttpRequest,
) -> AppResult<impl Responder> {
    require_session(&state, &req)?;
    let date = validate_date(&path.into_inner())?;
    let date_str = date.format("%Y-%m-%d").to_string();

    if state.registry.remove_day_block(&date_str).await? {
        tracing::info!(date = %date_str, "Agenda reabierta");
        return Ok(HttpResponse::Ok().json(json!({
            "blocked": false,
            "message": format!("Agenda abierta para {}", date_str)
        })));
    }

    let record = DayBlockRecord {
        id: block_id(&date_str),
        date: date_str.clone(),
        created_at: chrono::Utc::now().to_rfc3339(),
    };
    state.registry.put_day_block(record).await?;
    tracing::info!(date = %date_str, "Agenda cerrada");

    Ok(HttpResponse::Ok().json(json!({
        "blocked": true,
        "message": format!("Agenda cerrada para {}", date_str)
    })))
}

/// Configura las rutas del panel de administración
///
/// - `POST /admin/login` - Iniciar sesión
/// - `POST /admin/logout` - Cerrar sesión
/// - `GET /admin/session` - Consultar sesión vigente
/// - `GET /admin/appointments?date=` - Listar documentos de una fecha
/// - `POST /admin/appointments` - Alta manual
/// - `PUT /admin/appointments/{id}` - Corregir contacto
/// - `DELETE /admin/appointments/{id}` - Eliminar
/// - `POST /admin/days/{date}/toggle-block` - Cerrar/abrir un día
pub fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(login);
    cfg.service(logout);
    cfg.service(current_session);
    cfg.service(list_appointments);
    cfg.service(manual_add);
    cfg.service(edit_appointment);
    cfg.service(delete_appointment);
    cfg.service(toggle_day_block);
}
