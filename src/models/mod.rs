mod market;
mod reserve;
mod user;

pub use market::{
    MarketHistoryDocument, MarketOverview, RefreshCounters, RefreshSummary, SeriesPoint,
    SeriesSnapshot,
};
pub use reserve::{ReserveDeposit, ReserveSlot};
pub use user::{AuthRequest, User};
