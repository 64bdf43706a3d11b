pub(crate) mod component_bindings;
pub(crate) mod cycles;
pub(crate) mod linked_interface;
pub(crate) mod missing_providers;
pub(crate) mod resolved_components;
