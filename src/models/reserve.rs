use serde::{Deserialize, Serialize};

// One deposit into a reserve slot. `date` is a YYYY-MM-DD day string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReserveDeposit {
    pub date: String,
    pub amount: f64,
}

/// A savings goal owned by one user. Slot ids are client-generated;
/// `user_id` is stamped server-side on every write.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveSlot {
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    pub name: String,
    pub target_amount: f64,
    #[serde(default)]
    pub current_amount: f64,
    #[serde(default)]
    pub history: Vec<ReserveDeposit>,
}
