use async_trait::async_trait;

use crate::{
    Error,
    opportunity::{Opportunity, OpportunityMatch, OpportunitySearch},
};

#[async_trait]
pub trait OpportunityRepository: Send + Sync + 'static {
    async fn create(&self, opportunity: &Opportunity) -> Result<Opportunity, Error>;

    async fn find_by_id(&self, opportunity_id: &str) -> Result<Option<Opportunity>, Error>;

    /// Substring match on names, exact match on id and stage, inclusive ranges
    /// on probability and creation date. Newest first.
    async fn search(&self, search: &OpportunitySearch) -> Result<Vec<Opportunity>, Error>;

    /// Overwrites every mutable column of an existing opportunity.
    async fn update(&self, opportunity: &Opportunity) -> Result<Opportunity, Error>;

    /// Deletes all opportunities matching every set criterion and returns them.
    async fn delete_matching(&self, criteria: &OpportunityMatch)
    -> Result<Vec<Opportunity>, Error>;
}
