pub mod charts;
pub mod controller;
pub mod domain;
pub mod export;
pub mod filter;
pub mod format;
pub mod inputter;
pub mod model;
pub mod provider;
pub mod rows;
pub mod sort;
pub mod ui;
