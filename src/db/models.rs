//! Modelos de documento del registro de citas.
//!
//! Cada documento es plano, con nombres camelCase en el wire y el id
//! determinístico en `_id`: `"{fecha}-{hora}"` para reservas y
//! `"{fecha}-BLOCK"` para cierres de día. Que el id viva en `_id` es lo que
//! convierte el insert en un "reclamar si no existe" atómico.

use serde::{Deserialize, Serialize};

/// Un documento del registro: una hora ocupada o un marcador de día cerrado.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AppointmentRecord {
    Booking(BookingRecord),
    DayBlocked(DayBlockRecord),
}

/// Reserva de una hora concreta.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRecord {
    #[serde(rename = "_id")]
    pub id: String,
    /// Fecha local del local, `YYYY-MM-DD`. Nunca derivada de un instante UTC.
    pub date: String,
    /// Hora de la grilla, `HH:MM`.
    pub time: String,
    pub client_name: String,
    pub client_phone: String,
    /// Fijado al momento de crear la reserva, no se recalcula.
    #[serde(default)]
    pub is_overtime: bool,
    /// `true` si la creó el panel de administración (cliente presencial).
    #[serde(default)]
    pub is_manual: bool,
    /// RFC 3339, solo informativo.
    pub created_at: String,
}

/// Marcador de agenda cerrada para una fecha.
///
/// Mientras existe no borra las reservas de ese día, solo impide nuevas
/// auto-reservas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayBlockRecord {
    #[serde(rename = "_id")]
    pub id: String,
    pub date: String,
    pub created_at: String,
}

impl AppointmentRecord {
    pub fn id(&self) -> &str {
        match self {
            Self::Booking(b) => &b.id,
            Self::DayBlocked(d) => &d.id,
        }
    }

    pub fn date(&self) -> &str {
        match self {
            Self::Booking(b) => &b.date,
            Self::DayBlocked(d) => &d.date,
        }
    }
}

/// Id determinístico de una reserva: `"{fecha}-{hora}"`.
pub fn booking_id(date: &str, time: &str) -> String {
    format!("{}-{}", date, time)
}

/// Id determinístico del cierre de un día: `"{fecha}-BLOCK"`.
pub fn block_id(date: &str) -> String {
    format!("{}-BLOCK", date)
}

/// Fecha (`YYYY-MM-DD`) embebida en un id determinístico.
///
/// Permite saber qué día cambió al borrar o editar por id, sin leer el
/// documento primero.
pub fn date_of_id(id: &str) -> &str {
    id.get(..10).unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deterministic_ids() {
        assert_eq!(booking_id("2025-12-23", "20:00"), "2025-12-23-20:00");
        assert_eq!(block_id("2025-12-24"), "2025-12-24-BLOCK");
        assert_eq!(date_of_id("2025-12-23-20:00"), "2025-12-23");
        assert_eq!(date_of_id("2025-12-24-BLOCK"), "2025-12-24");
        assert_eq!(date_of_id("corto"), "corto");
    }

    #[test]
    fn test_wire_shape() {
        let record = AppointmentRecord::Booking(BookingRecord {
            id: "2025-12-23-20:00".to_string(),
            date: "2025-12-23".to_string(),
            time: "20:00".to_string(),
            client_name: "Ana".to_string(),
            client_phone: "987654321".to_string(),
            is_overtime: true,
            is_manual: false,
            created_at: "2025-12-01T12:00:00Z".to_string(),
        });

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["type"], "booking");
        assert_eq!(json["_id"], "2025-12-23-20:00");
        assert_eq!(json["clientName"], "Ana");
        assert_eq!(json["isOvertime"], true);
    }

    #[test]
    fn test_legacy_documents_default_flags() {
        // documentos antiguos sin isOvertime/isManual
        let json = serde_json::json!({
            "type": "booking",
            "_id": "2025-01-10-10:00",
            "date": "2025-01-10",
            "time": "10:00",
            "clientName": "Pedro",
            "clientPhone": "12345678",
            "createdAt": "2025-01-01T00:00:00Z"
        });
        let record: AppointmentRecord = serde_json::from_value(json).unwrap();
        match record {
            AppointmentRecord::Booking(b) => {
                assert!(!b.is_overtime);
                assert!(!b.is_manual);
            }
            _ => panic!("se esperaba una reserva"),
        }
    }

    #[test]
    fn test_block_roundtrip() {
        let json = serde_json::json!({
            "type": "day_blocked",
            "_id": "2025-12-24-BLOCK",
            "date": "2025-12-24",
            "createdAt": "2025-12-01T00:00:00Z"
        });
        let record: AppointmentRecord = serde_json::from_value(json).unwrap();
        assert_eq!(record.id(), "2025-12-24-BLOCK");
        assert_eq!(record.date(), "2025-12-24");
    }
}
