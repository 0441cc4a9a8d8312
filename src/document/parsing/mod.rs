//! Document part parsing utilities
//!
//! This module contains the XML readers used on the parts of a package:
//! the body scanner, paragraph markers, heading styles and relationships.

pub(crate) mod body;
pub(crate) mod heading;
pub(crate) mod paragraph;
pub(crate) mod relationships;
