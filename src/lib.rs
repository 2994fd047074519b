pub mod common;
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod perception;

pub use crate::common::{Point, Pose};
pub use crate::config::MclConfig;
pub use crate::error::{LocalizationError, Result};
pub use crate::perception::field::Field;
pub use crate::perception::localization::{Mcl, MclFilter, PoseSource};
pub use crate::perception::sensors::{DistanceSensor, RangeFinder};

use crate::lifecycle::LifecycleNode;
use tracing::info;

/// Registry that brings localizer components up and down together
pub struct LocalizationCore {
    components: Vec<Box<dyn LifecycleNode>>,
}

impl LocalizationCore {
    /// Create an empty core
    pub fn new() -> Self {
        LocalizationCore {
            components: Vec::new(),
        }
    }

    /// Register a component with the core
    pub fn register<T: LifecycleNode + 'static>(&mut self, component: T) {
        self.components.push(Box::new(component));
    }

    /// Configure and activate all registered components, in registration order
    pub fn init(&mut self) -> Result<()> {
        for component in &mut self.components {
            info!("Configuring {}", component.name());
            component.on_configure()?;
            info!("Activating {}", component.name());
            component.on_activate()?;
        }
        Ok(())
    }

    /// Deactivate and clean up all registered components, in reverse order
    pub fn shutdown(&mut self) -> Result<()> {
        for component in self.components.iter_mut().rev() {
            info!("Deactivating {}", component.name());
            component.on_deactivate()?;
            component.on_cleanup()?;
        }
        Ok(())
    }

    /// Find the first registered component of type `T`
    pub fn component_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.components
            .iter_mut()
            .find_map(|component| component.as_any_mut().downcast_mut::<T>())
    }
}

impl Default for LocalizationCore {
    fn default() -> Self {
        Self::new()
    }
}
