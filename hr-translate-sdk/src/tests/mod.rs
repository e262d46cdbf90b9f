//! Unit tests for the HR Translate SDK
//!
//! This module contains tests for the translators and their supporting components.
