pub mod aggregator;
pub mod audit_ops;
