// Backend Wire Adapters
//
// Conversions between the generic value model and the
// backend's tagged attribute format.

pub mod attribute;
