//! src/registry.rs
use crate::docno::DocnoMapping;

#[doc(hidden)]
pub use inventory;

/// A docno mapping scheme that workers can instantiate by name.
pub struct DocnoMappingRegistration {
    pub name: &'static str,
    pub factory: fn() -> Box<dyn DocnoMapping>,
}

inventory::collect!(DocnoMappingRegistration);

// Get an unloaded mapping by scheme name
pub fn get_docno_mapping(name: &str) -> Option<Box<dyn DocnoMapping>> {
    inventory::iter::<DocnoMappingRegistration>()
        .find(|reg| reg.name == name)
        .map(|reg| (reg.factory)())
}

pub fn list_docno_mappings() -> Vec<&'static str> {
    let mut names: Vec<_> = inventory::iter::<DocnoMappingRegistration>()
        .map(|reg| reg.name)
        .collect();
    names.sort_unstable();
    names
}

#[macro_export]
macro_rules! register_docno_mapping {
    ($mapping_type:ty, $name:expr) => {
        $crate::registry::inventory::submit! {
            $crate::registry::DocnoMappingRegistration {
                name: $name,
                factory: || -> Box<dyn $crate::docno::DocnoMapping> {
                    Box::new(<$mapping_type>::default())
                },
            }
        }
    };
}
