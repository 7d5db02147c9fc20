//! Equipment catalog domain module.
//!
//! Equipment types describe a class of physical equipment (not a specific unit).
//! Their status gates every stock operation.

pub mod equipment;

pub use equipment::{
    DESCRIPTION_MAX_CHARS, EquipmentStatus, EquipmentType, NAME_MAX_CHARS, NewEquipmentType,
};
