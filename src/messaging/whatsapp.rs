//! Mensaje de confirmación por WhatsApp.
//!
//! Tras un reclamo exitoso el servicio arma el texto prellenado (nombre,
//! fecha larga en español, hora, recargo si corresponde, total en CLP) y el
//! deep-link `wa.me` hacia el teléfono del barbero. El envío lo gatilla el
//! cliente; que nunca lo mande no afecta la reserva ya escrita.

use chrono::NaiveDate;
use url::Url;

use crate::config::AppConfig;
use crate::db::models::BookingRecord;
use crate::schedule::ScheduleConfig;

/// Texto y enlace listos para entregar al cliente.
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatsAppHandoff {
    pub text: String,
    pub link: String,
}

/// Arma el traspaso de confirmación para una reserva recién escrita.
///
/// `date` es la fecha ya parseada de la reserva; se usa para el formato largo
/// en español ("martes 23 de diciembre").
pub fn confirmation_handoff(
    config: &AppConfig,
    record: &BookingRecord,
    date: NaiveDate,
) -> WhatsAppHandoff {
    let text = confirmation_text(
        &config.barber_name,
        &config.schedule,
        record,
        date,
    );
    let link = deep_link(&config.barber_phone, &text);
    WhatsAppHandoff { text, link }
}

fn confirmation_text(
    barber_name: &str,
    schedule: &ScheduleConfig,
    record: &BookingRecord,
    date: NaiveDate,
) -> String {
    let fecha_bonita = date
        .format_localized("%A %-d de %B", chrono::Locale::es_CL)
        .to_string();
    let total = schedule.price_for(&record.time);
    let extra = if record.is_overtime {
        format!(" *(Sobrecupo +${})*", format_clp(schedule.overtime_fee))
    } else {
        String::new()
    };

    format!(
        "Hola {}! Soy *{}*. Agendé para el *{}* a las *{}*{}. Total: ${}. Mi número es {}.",
        barber_name,
        record.client_name,
        fecha_bonita,
        record.time,
        extra,
        format_clp(total),
        record.client_phone,
    )
}

fn deep_link(barber_phone: &str, text: &str) -> String {
    // wa.me no acepta URL malformada; el teléfono configurado es solo dígitos
    let mut url = Url::parse(&format!("https://wa.me/{}", barber_phone))
        .unwrap_or_else(|_| Url::parse("https://wa.me/").expect("URL base wa.me inválida"));
    url.query_pairs_mut().append_pair("text", text);
    url.to_string()
}

/// Miles con punto, como `toLocaleString('es-CL')`: 13000 -> "13.000".
fn format_clp(amount: i64) -> String {
    let digits = amount.abs().to_string();
    let mut out = String::new();
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(c);
    }
    if amount < 0 {
        format!("-{}", out)
    } else {
        out
    }
}
