pub mod detector;
pub mod enforcer;
