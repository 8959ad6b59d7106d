//! Grilla horaria del local: horas atendibles, sobrecupo y precios.

use chrono::Timelike;

/// Configuración de negocio de la agenda.
///
/// Los defaults corresponden al local actual: 14 horas entre 08:00 y 21:00,
/// con sobrecupo (recargo) en las dos primeras y dos últimas horas del día.
#[derive(Clone, Debug)]
pub struct ScheduleConfig {
    /// Horas atendibles del día, formato `HH:MM`.
    pub slots: Vec<String>,
    /// Subconjunto de `slots` que cobra recargo.
    pub overtime: Vec<String>,
    /// Precio base del corte (CLP).
    pub base_price: i64,
    /// Recargo por sobrecupo (CLP).
    pub overtime_fee: i64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            slots: [
                "08:00", "09:00", "10:00", "11:00", "12:00", "13:00", "14:00", "15:00", "16:00",
                "17:00", "18:00", "19:00", "20:00", "21:00",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            overtime: ["08:00", "09:00", "20:00", "21:00"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            base_price: 10000,
            overtime_fee: 3000,
        }
    }
}

impl ScheduleConfig {
    /// `true` si `time` pertenece a la grilla horaria.
    pub fn is_valid_slot(&self, time: &str) -> bool {
        self.slots.iter().any(|s| s == time)
    }

    /// `true` si `time` es hora de sobrecupo.
    pub fn is_overtime(&self, time: &str) -> bool {
        self.overtime.iter().any(|s| s == time)
    }

    /// Precio total para una hora: base más recargo si es sobrecupo.
    pub fn price_for(&self, time: &str) -> i64 {
        if self.is_overtime(time) {
            self.base_price + self.overtime_fee
        } else {
            self.base_price
        }
    }
}

/// Hora (0-23) de un string `HH:MM`, o `None` si no parsea.
pub fn slot_hour(time: &str) -> Option<u32> {
    chrono::NaiveTime::parse_from_str(time, "%H:%M")
        .ok()
        .map(|t| t.hour())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grid() {
        let cfg = ScheduleConfig::default();
        assert_eq!(cfg.slots.len(), 14);
        assert_eq!(cfg.slots.first().unwrap(), "08:00");
        assert_eq!(cfg.slots.last().unwrap(), "21:00");
        assert!(cfg.overtime.iter().all(|s| cfg.is_valid_slot(s)));
    }

    #[test]
    fn test_price_for_every_slot() {
        let cfg = ScheduleConfig::default();
        for slot in &cfg.slots {
            let expected = if cfg.is_overtime(slot) {
                cfg.base_price + cfg.overtime_fee
            } else {
                cfg.base_price
            };
            assert_eq!(cfg.price_for(slot), expected, "precio incorrecto para {}", slot);
        }
        assert_eq!(cfg.price_for("20:00"), 13000);
        assert_eq!(cfg.price_for("12:00"), 10000);
    }

    #[test]
    fn test_slot_hour() {
        assert_eq!(slot_hour("08:00"), Some(8));
        assert_eq!(slot_hour("21:00"), Some(21));
        assert_eq!(slot_hour("25:00"), None);
        assert_eq!(slot_hour("ocho"), None);
    }
}
