pub mod dashboard_state;
