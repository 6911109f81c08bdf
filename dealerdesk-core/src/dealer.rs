use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dealer {
    pub dealer_id: String,
    pub dealer_code: String,
    pub opportunity_owner: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewDealer {
    #[serde(default)]
    pub dealer_code: Option<String>,
    #[serde(default)]
    pub opportunity_owner: Option<String>,
}

/// Exact-match filter over dealer columns. Unset fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DealerFilter {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dealer_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dealer_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opportunity_owner: Option<String>,
}

impl DealerFilter {
    pub fn is_empty(&self) -> bool {
        self.dealer_id.is_none() && self.dealer_code.is_none() && self.opportunity_owner.is_none()
    }

    pub fn matches(&self, dealer: &Dealer) -> bool {
        self.dealer_id.as_ref().is_none_or(|id| *id == dealer.dealer_id)
            && self
                .dealer_code
                .as_ref()
                .is_none_or(|code| *code == dealer.dealer_code)
            && self
                .opportunity_owner
                .as_ref()
                .is_none_or(|owner| *owner == dealer.opportunity_owner)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DealerUpdate {
    #[serde(default)]
    pub dealer_id: Option<String>,
    #[serde(default)]
    pub dealer_code: Option<String>,
    #[serde(default)]
    pub opportunity_owner: Option<String>,
}
