use async_trait::async_trait;

use crate::{
    Error,
    dealer::{Dealer, DealerFilter},
};

#[async_trait]
pub trait DealerRepository: Send + Sync + 'static {
    async fn create(&self, dealer: &Dealer) -> Result<Dealer, Error>;

    async fn find_by_id(&self, dealer_id: &str) -> Result<Option<Dealer>, Error>;

    async fn list(&self) -> Result<Vec<Dealer>, Error>;

    /// Dealers matching every set field of the filter, oldest first.
    async fn find(&self, filter: &DealerFilter) -> Result<Vec<Dealer>, Error>;

    /// Writes code and owner for an existing dealer.
    async fn update(&self, dealer: &Dealer) -> Result<Dealer, Error>;

    /// Deletes the given dealers, returning how many rows were removed.
    async fn delete_many(&self, dealer_ids: &[String]) -> Result<u64, Error>;
}
