pub mod access_modal;
pub mod calendar_grid;
pub mod chart;
pub mod gauge;
pub mod nav;
pub mod notification_list;
pub mod protected;
