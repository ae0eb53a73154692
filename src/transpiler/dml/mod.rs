//! DML (Data Manipulation Language) SQL generation.
//!
//! This module contains functions for generating SELECT, INSERT, UPDATE and
//! DELETE statements, plus the WITH prefix they share.

pub mod cte;
pub mod delete;
pub mod insert;
pub mod select;
pub mod update;
