//! Order Transform Library
//!
//! Turns raw sales order CSV lines into typed records ready for bulk loading
//! into an analytics table.
//!
//! The core is [`LineTransformer`]: one line in, either a typed
//! [`OrderRecord`] or a skip. Around it sit:
//! - An ingestion driver that streams daily order drops through the transform
//! - Parquet and NDJSON sinks laid out like the destination table
//! - A synthetic order generator for the upstream sales channels
//!
//! ```
//! use order_transform::transform;
//!
//! let record = transform("A100,42,7,France,2023-05-01,3,19.99,SHIPPED").unwrap();
//! assert_eq!(record.client_id, 42);
//! assert!(transform("order_id,client_id,x,y,z,a,b,c").is_none());
//! ```

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod generator;
pub mod models;
pub mod processor;
pub mod schema;
pub mod transform;

// Re-export commonly used types
pub use config::{OrdersConfig, TransformOptions};
pub use error::{OrdersError, Result};
pub use models::{OrderRecord, SkipReason};
pub use transform::{LineTransformer, transform};
