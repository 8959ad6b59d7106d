//! Sesiones del panel de administración.
//!
//! Almacén en proceso: el servicio corre en una sola instancia, así que no
//! hay nada que compartir entre nodos. Un reinicio invalida las sesiones y el
//! panel lo observa como un 401 en su siguiente request.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::api::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct Session {
    pub token: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    ttl: Duration,
}

impl SessionStore {
    pub fn new(ttl_hours: i64) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Acuña una sesión nueva para un login exitoso.
    pub fn create(&self, email: &str) -> Session {
        let now = Utc::now();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            email: email.to_string(),
            created_at: now,
            expires_at: now + self.ttl,
        };

        let mut sessions = self.sessions.lock().expect("lock de sesiones envenenado");
        sessions.insert(session.token.clone(), session.clone());
        session
    }

    /// Valida un token y retorna su sesión; de paso poda las expiradas.
    ///
    /// # Errores
    /// - `Unauthorized`: token desconocido o expirado
    pub fn validate(&self, token: &str) -> AppResult<Session> {
        let now = Utc::now();
        let mut sessions = self.sessions.lock().expect("lock de sesiones envenenado");
        sessions.retain(|_, s| s.expires_at > now);

        sessions
            .get(token)
            .cloned()
            .ok_or_else(|| AppError::Unauthorized("Sesión inválida o expirada".to_string()))
    }

    /// Cierra una sesión. Retorna `false` si el token ya no existía.
    pub fn logout(&self, token: &str) -> bool {
        let mut sessions = self.sessions.lock().expect("lock de sesiones envenenado");
        sessions.remove(token).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_and_validate() {
        let store = SessionStore::new(12);
        let session = store.create("admin@bigboss.local");

        let found = store.validate(&session.token).unwrap();
        assert_eq!(found.email, "admin@bigboss.local");
        assert!(found.expires_at > found.created_at);

        assert!(store.validate("token-inexistente").is_err());
    }

    #[test]
    fn test_expired_sessions_are_pruned() {
        let store = SessionStore::new(0); // expira de inmediato
        let session = store.create("admin@bigboss.local");
        assert!(store.validate(&session.token).is_err());
    }

    #[test]
    fn test_logout() {
        let store = SessionStore::new(12);
        let session = store.create("admin@bigboss.local");
        assert!(store.logout(&session.token));
        assert!(!store.logout(&session.token));
        assert!(store.validate(&session.token).is_err());
    }
}
