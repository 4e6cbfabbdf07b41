use async_trait::async_trait;

use crate::api::{ApiClient, ApiError};
use crate::models::{
    Customer, CustomerDraft, CustomerListQuery, CustomerPage, CustomerStats, DeletionReceipt,
};

/// Gateway to the customer collection.
///
/// The console and its tests talk to this trait; the HTTP implementation is
/// the production one, in-memory implementations stand in where no backend
/// is available.
#[async_trait]
pub trait CustomerGateway: Send + Sync {
    /// One page of customers, filtered and sorted server-side
    async fn list(&self, query: &CustomerListQuery) -> Result<CustomerPage, ApiError>;

    async fn find_by_id(&self, id: i64) -> Result<Customer, ApiError>;

    async fn create(&self, draft: &CustomerDraft) -> Result<Customer, ApiError>;

    async fn update(&self, id: i64, draft: &CustomerDraft) -> Result<Customer, ApiError>;

    /// Deactivates active customers, permanently removes inactive ones
    async fn delete(&self, id: i64) -> Result<DeletionReceipt, ApiError>;

    async fn stats(&self) -> Result<CustomerStats, ApiError>;
}

/// Production gateway backed by the REST backend
pub struct HttpCustomerGateway {
    client: ApiClient,
}

impl HttpCustomerGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl CustomerGateway for HttpCustomerGateway {
    async fn list(&self, query: &CustomerListQuery) -> Result<CustomerPage, ApiError> {
        self.client.get_json("/customers", &query.to_params()).await
    }

    async fn find_by_id(&self, id: i64) -> Result<Customer, ApiError> {
        self.client.get_json(&format!("/customers/{id}"), &[]).await
    }

    async fn create(&self, draft: &CustomerDraft) -> Result<Customer, ApiError> {
        self.client.post_json("/customers", draft).await
    }

    async fn update(&self, id: i64, draft: &CustomerDraft) -> Result<Customer, ApiError> {
        self.client
            .put_json(&format!("/customers/{id}"), draft)
            .await
    }

    async fn delete(&self, id: i64) -> Result<DeletionReceipt, ApiError> {
        self.client.delete_json(&format!("/customers/{id}")).await
    }

    async fn stats(&self) -> Result<CustomerStats, ApiError> {
        self.client.get_json("/customers/stats", &[]).await
    }
}
