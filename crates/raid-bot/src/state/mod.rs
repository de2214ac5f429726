//! Application state
//!
//! Shared by every handler: the dispatcher (which carries the service context)
//! and the loaded configuration.

use std::sync::Arc;

use raid_common::AppConfig;
use raid_service::{Dispatcher, ServiceContext};

#[derive(Clone)]
pub struct AppState {
    dispatcher: Dispatcher,
    config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(ctx: Arc<ServiceContext>, config: Arc<AppConfig>) -> Self {
        Self {
            dispatcher: Dispatcher::new(ctx),
            config,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    pub fn service_context(&self) -> &ServiceContext {
        self.dispatcher.context()
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &"ServiceContext")
            .field("config", &"AppConfig")
            .finish()
    }
}
