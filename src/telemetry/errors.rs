use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::FieldErrors;
use crate::telemetry::logger::{EventLog, LogLevel};
use crate::telemetry::notification::Notifier;

/// Failure taxonomy used across the console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    Validation,
    Network,
    Business,
    Authentication,
    Authorization,
    Unknown,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Validation => "VALIDATION",
            ErrorCategory::Network => "NETWORK",
            ErrorCategory::Business => "BUSINESS",
            ErrorCategory::Authentication => "AUTHENTICATION",
            ErrorCategory::Authorization => "AUTHORIZATION",
            ErrorCategory::Unknown => "UNKNOWN",
        }
    }
}

/// A classified failure: what went wrong, where, plus a message for the
/// user and another for engineers. Immutable once created.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosticRecord {
    pub category: ErrorCategory,
    pub component: String,
    pub action: String,
    pub user_message: String,
    pub technical_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    pub timestamp: DateTime<Utc>,
}

/// Telemetry context owned by the composition root.
///
/// Bundles the bounded event log with the notification sink and carries the
/// error classification policy. Passed by reference to consumers; there is
/// deliberately no global instance.
pub struct Telemetry {
    log: EventLog,
    notifier: Box<dyn Notifier>,
}

impl Telemetry {
    pub fn new(notifier: Box<dyn Notifier>) -> Self {
        Self {
            log: EventLog::new(),
            notifier,
        }
    }

    pub fn with_min_level(min_level: LogLevel, notifier: Box<dyn Notifier>) -> Self {
        Self {
            log: EventLog::with_min_level(min_level),
            notifier,
        }
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    /// Map a failed backend call into a diagnostic record.
    ///
    /// `status` 0 means the request got no response at all. Exactly one log
    /// entry is appended and one message is pushed to the notifier. Never
    /// fails; unrecognized statuses land in the Unknown category.
    pub fn classify_http(
        &self,
        status: u16,
        raw_body: Option<&serde_json::Value>,
        component: &str,
        action: &str,
    ) -> DiagnosticRecord {
        let category = Self::categorize(status);
        let body_message = raw_body
            .and_then(|body| body.get("message"))
            .and_then(|message| message.as_str());
        let field_map = raw_body
            .and_then(|body| body.get("fields"))
            .and_then(|fields| fields.as_object());

        let (user_message, technical_message, level) = match status {
            400 => {
                let user_message = match field_map {
                    Some(fields) if !fields.is_empty() => fields
                        .iter()
                        .map(|(field, message)| {
                            format!("{field}: {}", message.as_str().unwrap_or("inválido"))
                        })
                        .collect::<Vec<_>>()
                        .join("; "),
                    _ => "Dados inválidos. Verifique os campos do formulário.".to_string(),
                };
                let detail = field_map
                    .map(|fields| serde_json::Value::Object(fields.clone()).to_string())
                    .or_else(|| raw_body.map(|body| body.to_string()))
                    .unwrap_or_else(|| "no body".to_string());
                (
                    user_message,
                    format!("validation rejected by backend: {detail}"),
                    LogLevel::Warn,
                )
            }
            401 => (
                "Sessão expirada. Faça login novamente.".to_string(),
                "JWT token missing, invalid or expired".to_string(),
                LogLevel::Error,
            ),
            403 => (
                "Você não tem permissão para esta ação.".to_string(),
                format!("access denied for {action}"),
                LogLevel::Error,
            ),
            404 => (
                "Registro não encontrado.".to_string(),
                format!("resource not found during {action}"),
                LogLevel::Warn,
            ),
            422 => {
                let user_message = body_message
                    .unwrap_or("Não foi possível processar a operação.")
                    .to_string();
                (
                    user_message.clone(),
                    format!("business rule violated: {user_message}"),
                    LogLevel::Warn,
                )
            }
            500.. => (
                "Erro no servidor. Tente novamente mais tarde.".to_string(),
                format!("internal backend failure (HTTP {status})"),
                LogLevel::Critical,
            ),
            0 => (
                "Sem conexão com o servidor. Verifique sua internet.".to_string(),
                "network failure reaching the backend".to_string(),
                LogLevel::Error,
            ),
            other => (
                "Erro inesperado. Tente novamente.".to_string(),
                format!(
                    "HTTP {other}: {}",
                    body_message.unwrap_or("no message in body")
                ),
                LogLevel::Error,
            ),
        };

        let diagnostic = DiagnosticRecord {
            category,
            component: component.to_string(),
            action: action.to_string(),
            user_message,
            technical_message,
            status_code: Some(status),
            details: raw_body.cloned(),
            timestamp: Utc::now(),
        };

        self.append(level, &diagnostic);
        self.notifier.error(&diagnostic.user_message);

        diagnostic
    }

    /// Record a local form-validation failure.
    ///
    /// Validation is resolved within form state, so this logs at Info and
    /// does not notify; the form itself highlights the fields.
    pub fn report_validation(
        &self,
        errors: &FieldErrors,
        component: &str,
        action: &str,
    ) -> DiagnosticRecord {
        let diagnostic = DiagnosticRecord {
            category: ErrorCategory::Validation,
            component: component.to_string(),
            action: action.to_string(),
            user_message: "Corrija os campos destacados antes de continuar.".to_string(),
            technical_message: format!(
                "form validation failed: {}",
                serde_json::to_string(errors).unwrap_or_default()
            ),
            status_code: None,
            details: serde_json::to_value(errors).ok(),
            timestamp: Utc::now(),
        };

        self.log.info(
            component,
            action,
            &diagnostic.technical_message,
            diagnostic.details.clone(),
        );

        diagnostic
    }

    /// Record an unexpected runtime fault.
    ///
    /// The full error chain is captured in the log only; the user sees a
    /// generic message without internal details.
    pub fn report_application(
        &self,
        error: &anyhow::Error,
        component: &str,
        action: &str,
    ) -> DiagnosticRecord {
        let diagnostic = DiagnosticRecord {
            category: ErrorCategory::Unknown,
            component: component.to_string(),
            action: action.to_string(),
            user_message: "Erro na aplicação. Recarregue a página.".to_string(),
            technical_message: error.to_string(),
            status_code: None,
            details: Some(serde_json::json!({ "chain": format!("{error:#}") })),
            timestamp: Utc::now(),
        };

        self.log.critical(
            component,
            action,
            &diagnostic.technical_message,
            Some(format!("{error:#}")),
            None,
        );
        self.notifier.error(&diagnostic.user_message);

        diagnostic
    }

    /// Render a diagnostic report: recent severe entries plus a full export
    pub fn diagnostic_report(&self, component: Option<&str>) -> String {
        let logs = self.log.diagnostics(component, None, None);
        let severe: Vec<_> = logs
            .iter()
            .filter(|entry| entry.level >= LogLevel::Warn)
            .collect();

        let recent = severe
            .iter()
            .rev()
            .take(10)
            .rev()
            .map(|entry| {
                format!(
                    "[{}] {}::{}\n{}: {}\n{}",
                    entry.timestamp.to_rfc3339(),
                    entry.component,
                    entry.action,
                    entry.level,
                    entry.message,
                    entry
                        .error
                        .as_deref()
                        .map(|error| format!("erro: {error}\n"))
                        .unwrap_or_default(),
                )
            })
            .collect::<Vec<_>>()
            .join("---\n");

        format!(
            "=== RELATÓRIO DE DIAGNÓSTICO ===\n\
             Gerado em: {}\n\
             Componente: {}\n\n\
             Total de logs: {}\n\
             Total de erros: {}\n\n\
             === ERROS RECENTES ===\n{}\n\n\
             === LOGS COMPLETOS ===\n{}",
            Utc::now().to_rfc3339(),
            component.unwrap_or("TODOS"),
            logs.len(),
            severe.len(),
            recent,
            self.log.export_json(),
        )
    }

    /// Append the log entry for a classified HTTP failure at its severity
    fn append(&self, level: LogLevel, diagnostic: &DiagnosticRecord) {
        let component = diagnostic.component.as_str();
        let action = diagnostic.action.as_str();
        let message = diagnostic.technical_message.as_str();
        let data = diagnostic.details.clone();
        let error = diagnostic.details.as_ref().map(|body| body.to_string());

        match level {
            LogLevel::Debug => self.log.debug(component, action, message, data),
            LogLevel::Info => self.log.info(component, action, message, data),
            LogLevel::Warn => self.log.warn(component, action, message, data),
            LogLevel::Error => self.log.error(component, action, message, error, data),
            LogLevel::Critical => self.log.critical(component, action, message, error, data),
        }
    }

    fn categorize(status: u16) -> ErrorCategory {
        match status {
            400 => ErrorCategory::Validation,
            401 => ErrorCategory::Authentication,
            403 => ErrorCategory::Authorization,
            422 => ErrorCategory::Business,
            0 => ErrorCategory::Network,
            _ => ErrorCategory::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::notification::MemoryNotifier;
    use std::rc::Rc;

    struct SharedNotifier(Rc<MemoryNotifier>);

    impl Notifier for SharedNotifier {
        fn success(&self, message: &str) {
            self.0.success(message);
        }
        fn error(&self, message: &str) {
            self.0.error(message);
        }
        fn info(&self, message: &str) {
            self.0.info(message);
        }
    }

    fn telemetry() -> (Telemetry, Rc<MemoryNotifier>) {
        let sink = Rc::new(MemoryNotifier::new());
        let telemetry = Telemetry::new(Box::new(SharedNotifier(Rc::clone(&sink))));
        (telemetry, sink)
    }

    #[test]
    fn test_404_maps_to_not_found() {
        let (telemetry, sink) = telemetry();
        let diagnostic = telemetry.classify_http(404, None, "CustomerList", "load");

        assert_eq!(diagnostic.category, ErrorCategory::Unknown);
        assert_eq!(diagnostic.user_message, "Registro não encontrado.");
        assert_eq!(diagnostic.status_code, Some(404));

        let entries = telemetry.log().entries();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].level, LogLevel::Warn);
        assert_eq!(sink.errors(), vec!["Registro não encontrado.".to_string()]);
    }

    #[test]
    fn test_400_renders_field_map() {
        let (telemetry, sink) = telemetry();
        let body = serde_json::json!({
            "fields": { "cpf": "CPF inválido", "email": "Email inválido" }
        });
        let diagnostic = telemetry.classify_http(400, Some(&body), "CustomerForm", "create");

        assert_eq!(diagnostic.category, ErrorCategory::Validation);
        assert!(diagnostic.user_message.contains("cpf: CPF inválido"));
        assert!(diagnostic.user_message.contains("email: Email inválido"));
        assert_eq!(telemetry.log().entries()[0].level, LogLevel::Warn);
        assert_eq!(sink.errors().len(), 1);
    }

    #[test]
    fn test_400_without_fields_is_generic() {
        let (telemetry, _) = telemetry();
        let diagnostic = telemetry.classify_http(400, None, "CustomerForm", "create");
        assert_eq!(
            diagnostic.user_message,
            "Dados inválidos. Verifique os campos do formulário."
        );
    }

    #[test]
    fn test_auth_statuses() {
        let (telemetry, _) = telemetry();

        let unauthorized = telemetry.classify_http(401, None, "Login", "submit");
        assert_eq!(unauthorized.category, ErrorCategory::Authentication);
        assert_eq!(
            unauthorized.user_message,
            "Sessão expirada. Faça login novamente."
        );

        let forbidden = telemetry.classify_http(403, None, "CustomerForm", "delete");
        assert_eq!(forbidden.category, ErrorCategory::Authorization);

        let levels: Vec<_> = telemetry
            .log()
            .entries()
            .iter()
            .map(|entry| entry.level)
            .collect();
        assert_eq!(levels, vec![LogLevel::Error, LogLevel::Error]);
    }

    #[test]
    fn test_422_prefers_server_message() {
        let (telemetry, _) = telemetry();
        let body = serde_json::json!({ "message": "CPF ou e-mail já cadastrado" });
        let diagnostic = telemetry.classify_http(422, Some(&body), "CustomerForm", "create");

        assert_eq!(diagnostic.category, ErrorCategory::Business);
        assert_eq!(diagnostic.user_message, "CPF ou e-mail já cadastrado");

        let fallback = telemetry.classify_http(422, None, "CustomerForm", "create");
        assert_eq!(
            fallback.user_message,
            "Não foi possível processar a operação."
        );
    }

    #[test]
    fn test_server_error_is_critical() {
        let (telemetry, _) = telemetry();
        let diagnostic = telemetry.classify_http(500, None, "CustomerList", "load");
        assert_eq!(diagnostic.category, ErrorCategory::Unknown);
        assert_eq!(telemetry.log().entries()[0].level, LogLevel::Critical);

        let bad_gateway = telemetry.classify_http(502, None, "CustomerList", "load");
        assert_eq!(
            bad_gateway.user_message,
            "Erro no servidor. Tente novamente mais tarde."
        );
    }

    #[test]
    fn test_status_zero_is_network() {
        let (telemetry, sink) = telemetry();
        let diagnostic = telemetry.classify_http(0, None, "CustomerList", "load");
        assert_eq!(diagnostic.category, ErrorCategory::Network);
        assert_eq!(telemetry.log().entries()[0].level, LogLevel::Error);
        assert_eq!(
            sink.errors(),
            vec!["Sem conexão com o servidor. Verifique sua internet.".to_string()]
        );
    }

    #[test]
    fn test_unrecognized_status_is_unknown() {
        let (telemetry, _) = telemetry();
        let diagnostic = telemetry.classify_http(418, None, "CustomerList", "load");
        assert_eq!(diagnostic.category, ErrorCategory::Unknown);
        assert_eq!(diagnostic.user_message, "Erro inesperado. Tente novamente.");
        assert!(diagnostic.technical_message.contains("HTTP 418"));
    }

    #[test]
    fn test_validation_report_logs_info_without_notifying() {
        let (telemetry, sink) = telemetry();
        let mut errors = FieldErrors::new();
        errors.insert("cpf".to_string(), "CPF inválido".to_string());

        let diagnostic = telemetry.report_validation(&errors, "CustomerForm", "create");
        assert_eq!(diagnostic.category, ErrorCategory::Validation);
        assert_eq!(telemetry.log().entries()[0].level, LogLevel::Info);
        assert!(sink.messages().is_empty());
    }

    #[test]
    fn test_application_fault_is_critical_and_generic() {
        let (telemetry, sink) = telemetry();
        let error = anyhow::anyhow!("parse failure in callback payload");
        let diagnostic = telemetry.report_application(&error, "OAuthCallback", "complete");

        assert_eq!(diagnostic.category, ErrorCategory::Unknown);
        assert_eq!(diagnostic.user_message, "Erro na aplicação. Recarregue a página.");
        // Internals stay in the log, never in the notification.
        assert!(sink.errors()[0].contains("Recarregue"));
        assert!(!sink.errors()[0].contains("parse failure"));
        assert_eq!(telemetry.log().entries()[0].level, LogLevel::Critical);
    }

    #[test]
    fn test_diagnostic_report_sections() {
        let (telemetry, _) = telemetry();
        telemetry.log().debug("C", "a", "quiet", None);
        telemetry.classify_http(404, None, "CustomerList", "load");
        telemetry.classify_http(500, None, "CustomerList", "load");

        let report = telemetry.diagnostic_report(None);
        assert!(report.contains("RELATÓRIO DE DIAGNÓSTICO"));
        assert!(report.contains("Total de logs: 3"));
        assert!(report.contains("Total de erros: 2"));
        assert!(report.contains("ERROS RECENTES"));
        assert!(report.contains("LOGS COMPLETOS"));

        let filtered = telemetry.diagnostic_report(Some("OutroComponente"));
        assert!(filtered.contains("Total de logs: 0"));
    }
}
