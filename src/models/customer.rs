use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::models::validation::{Validatable, ValidationContext, Validators};

/// Lifecycle status of a customer record
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum CustomerStatus {
    Ativo,
    Inativo,
}

impl fmt::Display for CustomerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomerStatus::Ativo => write!(f, "ATIVO"),
            CustomerStatus::Inativo => write!(f, "INATIVO"),
        }
    }
}

impl FromStr for CustomerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "ATIVO" => Ok(CustomerStatus::Ativo),
            "INATIVO" => Ok(CustomerStatus::Inativo),
            other => Err(format!("status desconhecido: {other} (use ATIVO ou INATIVO)")),
        }
    }
}

/// A customer record as returned by the backend
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub nome: String,
    pub cpf: String,
    pub email: String,
    pub telefone: String,
    pub status: CustomerStatus,

    /// Creation timestamp, absent on older records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<NaiveDateTime>,
}

/// Payload for creating or updating a customer.
///
/// `cpf` and `telefone` carry the masked display form, which is what the
/// backend expects from the console.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CustomerDraft {
    pub nome: String,
    pub cpf: String,
    pub email: String,
    pub telefone: String,
    pub status: CustomerStatus,
}

impl Validatable for CustomerDraft {
    fn validate_with_context(&self, ctx: &mut ValidationContext) {
        ctx.check("nome", Validators::not_empty(&self.nome, "nome"));
        ctx.check(
            "nome",
            Validators::string_length(&self.nome, "nome", Some(3), Some(100)),
        );

        ctx.check("cpf", Validators::not_empty(&self.cpf, "cpf"));
        ctx.check("cpf", ctx.cpf().validate(&self.cpf, "cpf"));

        ctx.check("email", Validators::not_empty(&self.email, "email"));
        ctx.check("email", Validators::email(&self.email, "email"));

        ctx.check("telefone", Validators::not_empty(&self.telefone, "telefone"));
        ctx.check("telefone", Validators::phone_br(&self.telefone, "telefone"));
    }
}

/// Sort direction for customer listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortDirection::Asc => "asc",
            SortDirection::Desc => "desc",
        }
    }
}

impl FromStr for SortDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortDirection::Asc),
            "desc" => Ok(SortDirection::Desc),
            other => Err(format!("direção desconhecida: {other} (use asc ou desc)")),
        }
    }
}

/// Query parameters accepted by the customer listing endpoint
#[derive(Debug, Clone)]
pub struct CustomerListQuery {
    /// Zero-based page index
    pub page: u32,
    pub size: u32,
    pub sort_by: String,
    pub sort_dir: SortDirection,
    pub nome: Option<String>,
    pub email: Option<String>,
    pub status: Option<CustomerStatus>,
}

impl Default for CustomerListQuery {
    fn default() -> Self {
        Self {
            page: 0,
            size: 10,
            sort_by: "nome".to_string(),
            sort_dir: SortDirection::Asc,
            nome: None,
            email: None,
            status: None,
        }
    }
}

impl CustomerListQuery {
    /// Serialize into wire query parameters, omitting unset filters
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.to_string()),
            ("size", self.size.to_string()),
            ("sortBy", self.sort_by.clone()),
            ("sortDir", self.sort_dir.as_str().to_string()),
        ];

        if let Some(nome) = &self.nome {
            params.push(("nome", nome.clone()));
        }
        if let Some(email) = &self.email {
            params.push(("email", email.clone()));
        }
        if let Some(status) = &self.status {
            params.push(("status", status.to_string()));
        }

        params
    }
}

/// One page of the customer listing
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerPage {
    pub customers: Vec<Customer>,
    pub total_elements: u64,
    pub total_pages: u32,
    pub page_size: u32,
    /// Zero-based index of this page
    pub current_page: u32,
}

impl CustomerPage {
    /// One-based index of the first record shown on this page
    pub fn first_shown(&self) -> u64 {
        if self.total_elements == 0 {
            0
        } else {
            u64::from(self.current_page) * u64::from(self.page_size) + 1
        }
    }

    /// One-based index of the last record shown on this page
    pub fn last_shown(&self) -> u64 {
        (u64::from(self.current_page) + 1)
            .saturating_mul(u64::from(self.page_size))
            .min(self.total_elements)
    }
}

/// Aggregate counters from the statistics endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerStats {
    pub total_customers: u64,
    pub active_customers: u64,
    pub inactive_customers: u64,
    /// Customers created in the last 30 days
    pub recent_customers: u64,
}

/// Receipt returned by the delete endpoint.
///
/// The backend soft-deletes active customers (deactivation) and only hard
/// deletes inactive ones; `action` tells which path was taken.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeletionReceipt {
    pub customer_id: i64,
    pub customer_name: String,
    pub action: String,
    pub message: String,
    pub should_remove_from_list: bool,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::validation::CpfValidator;

    fn valid_draft() -> CustomerDraft {
        CustomerDraft {
            nome: "Maria da Silva".to_string(),
            cpf: "111.444.777-35".to_string(),
            email: "maria@pulse.com".to_string(),
            telefone: "(11) 98888-7777".to_string(),
            status: CustomerStatus::Ativo,
        }
    }

    #[test]
    fn test_draft_valid() {
        assert!(valid_draft().validate(CpfValidator::strict()).is_ok());
    }

    #[test]
    fn test_draft_field_errors_name_each_field() {
        let draft = CustomerDraft {
            nome: String::new(),
            cpf: "123".to_string(),
            email: "not-an-email".to_string(),
            telefone: "11988887777".to_string(),
            status: CustomerStatus::Ativo,
        };

        let errors = draft.validate(CpfValidator::strict()).unwrap_err();
        assert_eq!(
            errors.keys().collect::<Vec<_>>(),
            vec!["cpf", "email", "nome", "telefone"]
        );
        assert_eq!(errors["cpf"], "CPF inválido");
        assert_eq!(errors["telefone"], "Telefone inválido");
    }

    #[test]
    fn test_status_round_trip() {
        assert_eq!("ativo".parse::<CustomerStatus>(), Ok(CustomerStatus::Ativo));
        assert_eq!(
            "INATIVO".parse::<CustomerStatus>(),
            Ok(CustomerStatus::Inativo)
        );
        assert!("pendente".parse::<CustomerStatus>().is_err());

        let json = serde_json::to_string(&CustomerStatus::Ativo).unwrap();
        assert_eq!(json, "\"ATIVO\"");
    }

    #[test]
    fn test_list_query_omits_unset_filters() {
        let query = CustomerListQuery::default();
        let params = query.to_params();
        assert_eq!(
            params,
            vec![
                ("page", "0".to_string()),
                ("size", "10".to_string()),
                ("sortBy", "nome".to_string()),
                ("sortDir", "asc".to_string()),
            ]
        );

        let query = CustomerListQuery {
            status: Some(CustomerStatus::Inativo),
            nome: Some("silva".to_string()),
            ..CustomerListQuery::default()
        };
        let params = query.to_params();
        assert!(params.contains(&("status", "INATIVO".to_string())));
        assert!(params.contains(&("nome", "silva".to_string())));
    }

    #[test]
    fn test_customer_wire_shape() {
        let body = r#"{
            "id": 7,
            "nome": "Ana Souza",
            "cpf": "111.444.777-35",
            "email": "ana@pulse.com",
            "telefone": "(11) 98888-7777",
            "status": "INATIVO",
            "createdAt": "2026-07-01T09:30:00"
        }"#;

        let customer: Customer = serde_json::from_str(body).unwrap();
        assert_eq!(customer.id, 7);
        assert_eq!(customer.status, CustomerStatus::Inativo);
        assert!(customer.created_at.is_some());
    }

    #[test]
    fn test_page_bounds() {
        let page = CustomerPage {
            customers: Vec::new(),
            total_elements: 23,
            total_pages: 3,
            page_size: 10,
            current_page: 2,
        };
        assert_eq!(page.first_shown(), 21);
        assert_eq!(page.last_shown(), 23);

        let empty = CustomerPage {
            customers: Vec::new(),
            total_elements: 0,
            total_pages: 0,
            page_size: 10,
            current_page: 0,
        };
        assert_eq!(empty.first_shown(), 0);
        assert_eq!(empty.last_shown(), 0);
    }
}
