//! Domain records served by the back-office API
//!
//! Field names follow the backend's camelCase JSON.

pub mod records;

pub use records::{
    Client, ClientType, Contract, ContractStatus, ContractType, Property, PropertyStatus,
    PropertyType, Transaction, TransactionStatus, TransactionType,
};
