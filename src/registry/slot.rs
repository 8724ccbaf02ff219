//! A single lazily constructed service entry.
//!
//! The cached instance is read without blocking once present. Until then,
//! callers queue on the entry's own guard, re-check, and at most one of them
//! runs the factory. A failed construction leaves the entry empty so the next
//! caller starts over.

use std::sync::Arc;

use once_cell::sync::OnceCell;

use super::ServiceName;
use crate::errors::{AppError, AppResult};

/// Zero-argument constructor for a service.
pub type Factory<T> = Box<dyn Fn() -> AppResult<Arc<T>> + Send + Sync>;

pub struct Slot<T: ?Sized> {
    name: ServiceName,
    cell: OnceCell<Arc<T>>,
    factory: Factory<T>,
}

impl<T: ?Sized> Slot<T> {
    pub fn new(name: ServiceName, factory: Factory<T>) -> Self {
        Self {
            name,
            cell: OnceCell::new(),
            factory,
        }
    }

    /// Return the cached instance, building it on first use.
    pub fn get(&self) -> AppResult<Arc<T>> {
        if let Some(instance) = self.cell.get() {
            return Ok(Arc::clone(instance));
        }

        // Blocks while another caller is constructing; re-checks afterwards.
        self.cell.get_or_try_init(|| self.construct()).map(Arc::clone)
    }

    pub fn name(&self) -> ServiceName {
        self.name
    }

    pub fn is_initialized(&self) -> bool {
        self.cell.get().is_some()
    }

    fn construct(&self) -> AppResult<Arc<T>> {
        tracing::debug!(service = %self.name, "constructing service");
        (self.factory)().map_err(|e| {
            tracing::warn!(service = %self.name, error = %e, "service construction failed");
            e
        })
    }
}

/// Factory for a slot nobody registered a constructor for.
pub fn unregistered<T: ?Sized + 'static>(name: ServiceName) -> Factory<T> {
    Box::new(move || {
        Err(AppError::construction(format!(
            "no factory registered for {} service",
            name
        )))
    })
}
