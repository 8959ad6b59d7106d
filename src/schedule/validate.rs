//! Validación de datos del cliente para el flujo de auto-reserva.
//!
//! Toda entrada inválida se rechaza antes de tocar el almacenamiento, con el
//! campo ofensor (`name` / `phone`) en el error para mostrarlo junto al input.

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::api::{AppError, AppResult};

use super::ScheduleConfig;

/// Letras (con tildes y eñe) y espacios; el mismo alfabeto que acepta el
/// formulario del cliente.
static NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-ZáéíóúÁÉÍÓÚñÑ\s]+$").expect("regex de nombre inválida"));

/// Valida el nombre del cliente y retorna su forma recortada.
///
/// # Errores
/// - `ValidationField{field: "name"}`: menos de 3 letras, más de 20, o
///   caracteres fuera del alfabeto permitido
pub fn validate_client_name(raw: &str) -> AppResult<String> {
    let name = raw.trim();
    let letters = name.chars().count();

    if letters < 3 {
        return Err(AppError::validation_field("name", "Mínimo 3 letras"));
    }
    if letters > 20 {
        return Err(AppError::validation_field("name", "Máximo 20 letras"));
    }
    if !NAME_RE.is_match(name) {
        return Err(AppError::validation_field("name", "Solo letras y espacios"));
    }

    Ok(name.to_string())
}

/// Normaliza el teléfono del cliente: descarta todo lo que no sea dígito y
/// exige entre 8 y 9 dígitos restantes.
///
/// Los separadores ("+56 9 8765-4321") no son motivo de rechazo, se limpian.
///
/// # Errores
/// - `ValidationField{field: "phone"}`: menos de 8 o más de 9 dígitos
pub fn normalize_client_phone(raw: &str) -> AppResult<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.len() < 8 {
        return Err(AppError::validation_field("phone", "Mínimo 8 números"));
    }
    if digits.len() > 9 {
        return Err(AppError::validation_field("phone", "Máximo 9 números"));
    }

    Ok(digits)
}

/// Valida y parsea una fecha en formato `YYYY-MM-DD`.
pub fn validate_date(date_str: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d")
        .map_err(|_| AppError::Validation("Formato de fecha inválido, use YYYY-MM-DD".to_string()))
}

/// Verifica que `time` pertenezca a la grilla horaria configurada.
pub fn validate_slot(schedule: &ScheduleConfig, time: &str) -> AppResult<()> {
    if schedule.is_valid_slot(time) {
        Ok(())
    } else {
        Err(AppError::Validation(format!("Hora fuera de la agenda: {}", time)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_boundaries() {
        assert!(validate_client_name("An").is_err());
        assert_eq!(validate_client_name("Ana").unwrap(), "Ana");
        assert_eq!(validate_client_name("  Ana  ").unwrap(), "Ana");
        // diacríticos permitidos
        assert_eq!(validate_client_name("Ñoño Muñoz").unwrap(), "Ñoño Muñoz");
        assert!(validate_client_name("Ana123").is_err());
        assert!(validate_client_name("NombreDemasiadoLargoParaElFormulario").is_err());
    }

    #[test]
    fn test_name_error_carries_field() {
        match validate_client_name("An") {
            Err(AppError::ValidationField { field, .. }) => assert_eq!(field, "name"),
            other => panic!("se esperaba error de campo name, hubo {:?}", other),
        }
    }

    #[test]
    fn test_phone_boundaries() {
        assert!(normalize_client_phone("1234567").is_err());
        assert_eq!(normalize_client_phone("12345678").unwrap(), "12345678");
        assert_eq!(normalize_client_phone("987654321").unwrap(), "987654321");
        assert!(normalize_client_phone("1234567890").is_err());
    }

    #[test]
    fn test_phone_strips_non_digits() {
        // los separadores se limpian, no se rechazan
        assert_eq!(normalize_client_phone("98-765-4321").unwrap(), "987654321");
        assert_eq!(normalize_client_phone("9 8765 4321").unwrap(), "987654321");
        match normalize_client_phone("12-34") {
            Err(AppError::ValidationField { field, .. }) => assert_eq!(field, "phone"),
            other => panic!("se esperaba error de campo phone, hubo {:?}", other),
        }
    }

    #[test]
    fn test_date_and_slot() {
        assert!(validate_date("2025-12-23").is_ok());
        assert!(validate_date("23-12-2025").is_err());

        let cfg = ScheduleConfig::default();
        assert!(validate_slot(&cfg, "08:00").is_ok());
        assert!(validate_slot(&cfg, "07:00").is_err());
    }
}
