mod dispatch_service;

pub use dispatch_service::{DispatchService, ProviderRoute};
