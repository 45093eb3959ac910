//! `PlatformRegistry` (spec §4.7, component table): fans registration
//! calls out to one or more concrete `PlatformAdapter`s. Itself
//! implements `PlatformAdapter` so `ConversationEngine::register_intents`
//! doesn't need to know whether it's talking to one adapter or several.

use async_trait::async_trait;

use dialog_engine_core::{
    ErrorHandler, IntentHandler, IntentRegistration, LaunchHandler, PlatformAdapter,
    RegistrationError,
};

#[derive(Default)]
pub struct PlatformRegistry {
    adapters: Vec<Box<dyn PlatformAdapter>>,
}

impl PlatformRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, adapter: Box<dyn PlatformAdapter>) {
        self.adapters.push(adapter);
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

#[async_trait]
impl PlatformAdapter for PlatformRegistry {
    async fn reg_intent(
        &mut self,
        name: &str,
        registration: IntentRegistration,
        handler: IntentHandler,
    ) -> Result<(), RegistrationError> {
        for adapter in &mut self.adapters {
            adapter.reg_intent(name, registration.clone(), handler.clone()).await?;
        }
        Ok(())
    }

    async fn reg_custom_slot(&mut self, type_name: &str, values: Vec<String>) -> Result<(), RegistrationError> {
        for adapter in &mut self.adapters {
            adapter.reg_custom_slot(type_name, values.clone()).await?;
        }
        Ok(())
    }

    fn on_launch(&mut self, handler: LaunchHandler) {
        for adapter in &mut self.adapters {
            adapter.on_launch(handler.clone());
        }
    }

    fn on_error(&mut self, handler: ErrorHandler) {
        for adapter in &mut self.adapters {
            adapter.on_error(handler.clone());
        }
    }
}
