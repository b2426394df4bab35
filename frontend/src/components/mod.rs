// Reusable components live here.

pub mod admin_nav;
pub mod confirm_dialog;
pub mod filter_bar;
pub mod loading_spinner;
pub mod pagination;
pub mod stats_card;
pub mod toast;
