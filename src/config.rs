//! Configuración del servicio vía variables de entorno (`.env` soportado).
//!
//! Los valores de negocio (grilla horaria, sobrecupo, precios, teléfono del
//! barbero) son configurables y los defaults corresponden al local actual.

use std::env;

use chrono::NaiveDateTime;
use chrono_tz::Tz;

use crate::schedule::{slot_hour, ScheduleConfig};

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub bind_address: String,
    pub mongodb_uri: String,
    pub mongodb_database: String,
    pub admin_email: String,
    pub admin_password: String,
    pub session_ttl_hours: i64,
    pub shop_timezone: Tz,
    pub barber_name: String,
    pub barber_phone: String,
    pub schedule: ScheduleConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let defaults = ScheduleConfig::default();
        let schedule = ScheduleConfig {
            slots: env_slot_list("SLOT_HOURS", defaults.slots),
            overtime: env_slot_list("OVERTIME_SLOTS", defaults.overtime),
            base_price: env_i64("BASE_PRICE", defaults.base_price),
            overtime_fee: env_i64("OVERTIME_FEE", defaults.overtime_fee),
        };

        Self {
            bind_address: env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            mongodb_uri: env::var("MONGODB_URI")
                .unwrap_or_else(|_| "mongodb://localhost:27017".to_string()),
            mongodb_database: env::var("MONGODB_DATABASE")
                .unwrap_or_else(|_| "barberbook".to_string()),
            admin_email: env::var("ADMIN_EMAIL")
                .unwrap_or_else(|_| "admin@bigboss.local".to_string()),
            admin_password: env::var("ADMIN_PASSWORD").unwrap_or_else(|_| "changeme".to_string()),
            session_ttl_hours: env_i64("ADMIN_SESSION_HOURS", 12),
            shop_timezone: env_timezone("SHOP_TIMEZONE"),
            barber_name: env::var("BARBER_NAME").unwrap_or_else(|_| "Daniel".to_string()),
            barber_phone: env::var("BARBER_PHONE").unwrap_or_else(|_| "56988280660".to_string()),
            schedule,
        }
    }

    /// Fecha y hora actuales en el reloj del local.
    ///
    /// Todo cálculo de "hoy" parte de aquí: derivar la fecha desde un
    /// instante UTC corre el día cerca de medianoche y archiva la reserva
    /// bajo la fecha equivocada.
    pub fn local_now(&self) -> NaiveDateTime {
        chrono::Utc::now()
            .with_timezone(&self.shop_timezone)
            .naive_local()
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_timezone(key: &str) -> Tz {
    match env::var(key) {
        Ok(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!(valor = %raw, "Zona horaria inválida, usando America/Santiago");
            chrono_tz::America::Santiago
        }),
        Err(_) => chrono_tz::America::Santiago,
    }
}

fn env_slot_list(key: &str, default: Vec<String>) -> Vec<String> {
    match env::var(key) {
        Ok(raw) => parse_slot_list(&raw).unwrap_or_else(|| {
            tracing::warn!(variable = %key, valor = %raw, "Lista de horarios inválida, usando default");
            default
        }),
        Err(_) => default,
    }
}

/// Lista de horas separadas por coma; si alguna entrada no es `HH:MM`
/// se descarta la lista completa.
fn parse_slot_list(raw: &str) -> Option<Vec<String>> {
    let slots: Vec<String> = raw
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();

    if slots.is_empty() || !slots.iter().all(|s| slot_hour(s).is_some()) {
        return None;
    }

    Some(slots)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_slot_list_valid() {
        let slots = parse_slot_list("08:00, 09:00,10:00").unwrap();
        assert_eq!(slots, vec!["08:00", "09:00", "10:00"]);
    }

    #[test]
    fn test_parse_slot_list_rejects_bad_entry() {
        assert!(parse_slot_list("08:00,veinticinco").is_none());
        assert!(parse_slot_list("25:00").is_none());
        assert!(parse_slot_list("").is_none());
    }
}
