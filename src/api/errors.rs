//! # Manejo de errores con thiserror
//!
//! Taxonomía única de errores de la aplicación y su traducción a respuestas
//! HTTP. Cada variante mapea a un estado concreto; el cuerpo siempre lleva
//! `{error, message}` y, para errores de validación de campo, el `field`
//! ofensor para mostrarlo junto al input.

use actix_web::{HttpResponse, ResponseError};
use std::error::Error;
use thiserror::Error;

/// Tipos de error de la aplicación.
#[derive(Error, Debug)]
pub enum AppError {
    /// Error de base de datos con contexto de operación.
    ///
    /// Mantiene la cadena de errores original de mongodb para debugging;
    /// hacia afuera solo sale un mensaje genérico.
    #[error("Error de base de datos en operación '{operation}': {source}")]
    Database {
        operation: String,
        #[source]
        source: mongodb::error::Error,
    },

    /// Error de validación con campo específico (`name` / `phone`).
    #[error("Error de validación en campo '{field}': {message}")]
    ValidationField { field: String, message: String },

    /// Error de validación general.
    #[error("Error de validación: {0}")]
    Validation(String),

    /// La hora ya estaba tomada al intentar reclamarla.
    ///
    /// Indica al cliente que su vista estaba desactualizada y debe refrescar
    /// la grilla de horas.
    #[error("¡Esta hora ya fue tomada!")]
    SlotTaken,

    /// La agenda del día está cerrada para auto-reservas.
    #[error("La agenda de ese día está cerrada")]
    DayBlocked,

    /// Error de autorización.
    #[error("No autorizado: {0}")]
    Unauthorized(String),

    /// Recurso no encontrado.
    #[error("No encontrado: {0}")]
    NotFound(String),

    /// Error interno.
    #[error("Error interno: {0}")]
    Internal(String),
}

impl AppError {
    /// Crea un error de base de datos con contexto de operación.
    pub fn database(operation: &str, source: mongodb::error::Error) -> Self {
        Self::Database {
            operation: operation.to_string(),
            source,
        }
    }

    /// Crea un error de validación con campo específico.
    pub fn validation_field(field: &str, message: &str) -> Self {
        Self::ValidationField {
            field: field.to_string(),
            message: message.to_string(),
        }
    }
}

impl ResponseError for AppError {
    fn error_response(&self) -> HttpResponse {
        match self {
            Self::Database { operation, source } => {
                tracing::error!(
                    operation = %operation,
                    error = %source,
                    error_chain = ?source.source(),
                    "Database error occurred"
                );
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Error de base de datos".to_string(),
                    message: "Error interno del servidor".to_string(),
                    field: None,
                })
            }
            Self::ValidationField { field, message } => {
                tracing::warn!(field = %field, message = %message, "Validation error");
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Error de validación".to_string(),
                    message: message.clone(),
                    field: Some(field.clone()),
                })
            }
            Self::Validation(message) => {
                tracing::warn!(message = %message, "Validation error");
                HttpResponse::BadRequest().json(ErrorResponse {
                    error: "Error de validación".to_string(),
                    message: message.clone(),
                    field: None,
                })
            }
            Self::SlotTaken => {
                tracing::info!("Slot claim conflict");
                HttpResponse::Conflict().json(ErrorResponse {
                    error: "Hora tomada".to_string(),
                    message: self.to_string(),
                    field: None,
                })
            }
            Self::DayBlocked => {
                tracing::info!("Claim rejected, day is blocked");
                HttpResponse::Conflict().json(ErrorResponse {
                    error: "Agenda cerrada".to_string(),
                    message: self.to_string(),
                    field: None,
                })
            }
            Self::Unauthorized(reason) => {
                tracing::warn!(reason = %reason, "Unauthorized access attempt");
                HttpResponse::Unauthorized().json(ErrorResponse {
                    error: "No autorizado".to_string(),
                    message: reason.clone(),
                    field: None,
                })
            }
            Self::NotFound(message) => {
                tracing::info!(message = %message, "Resource not found");
                HttpResponse::NotFound().json(ErrorResponse {
                    error: "No encontrado".to_string(),
                    message: message.clone(),
                    field: None,
                })
            }
            Self::Internal(message) => {
                tracing::error!(message = %message, "Internal error");
                HttpResponse::InternalServerError().json(ErrorResponse {
                    error: "Error interno".to_string(),
                    message: "Error interno del servidor".to_string(),
                    field: None,
                })
            }
        }
    }
}

/// Cuerpo JSON de toda respuesta de error.
#[derive(serde::Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

pub type AppResult<T> = Result<T, AppError>;

impl From<mongodb::error::Error> for AppError {
    fn from(error: mongodb::error::Error) -> Self {
        Self::Database {
            operation: "database_operation".to_string(),
            source: error,
        }
    }
}
