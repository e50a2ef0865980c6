//! Client-side navigation targets returned alongside responses and errors.

pub const SIGN_IN_ROUTE: &str = "/";
pub const DASHBOARD_ROUTE: &str = "/dashboard";
pub const REGISTER_ROUTE: &str = "/register";
pub const PAYMENT_ROUTE: &str = "/payment";
pub const CONFIRMATION_ROUTE: &str = "/confirmation";
