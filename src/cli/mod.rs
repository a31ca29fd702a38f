pub mod convert;
pub mod history;
pub mod rates;
pub mod ui;
