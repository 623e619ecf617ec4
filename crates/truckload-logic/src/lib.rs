//! Pure load-planning logic for Truckload.
//!
//! This crate contains the allocation logic that is independent of any
//! database, UI, or runtime. Functions take plain records and return plans,
//! making them unit-testable and usable from the depot, the headless
//! harness, and any future front end.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`allocator`] | Greedy transporter loading over a shared device pool |
//! | [`config`] | Allocation settings (driver policy) |
//! | [`manifest`] | Plain-text loading lists for dispatchers |
//! | [`priority`] | Weight-to-benefit packing order |
//! | [`records`] | Device, driver and transporter records with typed ids |
//! | [`units`] | Kilogram/gram conversion and whole-unit fitting |
//! | [`validation`] | Eager input checks run before any allocation |

pub mod allocator;
pub mod config;
pub mod manifest;
pub mod priority;
pub mod records;
pub mod units;
pub mod validation;
