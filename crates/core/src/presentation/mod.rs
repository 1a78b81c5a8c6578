pub mod messages;
pub mod view_model;

pub use messages::user_message;
pub use view_model::{LoadStatus, PortfolioViewModel, ViewPhase, ViewState};
